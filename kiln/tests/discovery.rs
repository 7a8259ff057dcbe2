//! Controllers found through `register_controller!`.

#![cfg(feature = "inventory")]

use kiln::{DiscoveringControllerLoader, Event, Framework, MetadataStore, PipelineDispatcher};
use serde_json::json;
use std::sync::Arc;

mod common;
use common::{BasicController, SingletonController, init_tracing};

kiln::register_controller!(BasicController, SingletonController);

#[tokio::test]
async fn discovered_controllers_compile_and_dispatch() {
    init_tracing();
    let metadata = Arc::new(MetadataStore::new());
    let framework = Framework::builder()
        .with_metadata(Arc::clone(&metadata))
        .with_controller_loader(
            DiscoveringControllerLoader::new(Arc::clone(&metadata))
                .with_pattern("^Singleton")
                .unwrap(),
        )
        .build();

    let documents = framework.create_pipeline_definitions().await.unwrap();
    assert_eq!(documents.len(), 1);

    let dispatcher = PipelineDispatcher::new(documents, framework.factory()).unwrap();
    let event = Event::new("singleton", json!({ "data": "x" }));
    let outcomes = dispatcher.dispatch(&event).await.unwrap();
    assert_eq!(outcomes[0].response_stack[0]["callNumber"], json!(1));
    assert!(dispatcher.dispatch(&Event::new("basic", json!(null))).await.unwrap().is_empty());
}
