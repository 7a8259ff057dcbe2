//! End-to-end scenarios: compile, dispatch, inspect responses.

use kiln::{
    ActivationError, DispatchError, Event, ExplicitControllerLoader, Framework, InvokeError,
    MetadataStore, PipelineDispatcher,
};
use serde_json::{Value, json};
use std::sync::Arc;

mod common;
use common::{BasicController, SingletonController, StackedController, init_tracing};

async fn dispatcher_for(metadata: MetadataStore) -> PipelineDispatcher {
    init_tracing();
    let framework = Framework::builder().with_metadata(Arc::new(metadata)).build();
    let documents = framework.create_pipeline_definitions().await.unwrap();
    PipelineDispatcher::new(documents, framework.factory()).unwrap()
}

fn handler_response(outcomes: &[kiln::DispatchOutcome]) -> &Value {
    assert_eq!(outcomes.len(), 1, "exactly one pipeline should match");
    &outcomes[0].response_stack[0]
}

#[tokio::test]
async fn per_call_controller_gets_fresh_instances() {
    let metadata = MetadataStore::new();
    metadata.register::<BasicController>();
    let dispatcher = dispatcher_for(metadata).await;
    let event = Event::new("basic", json!({ "data": "x" }));

    let first = dispatcher.dispatch(&event).await.unwrap();
    let second = dispatcher.dispatch(&event).await.unwrap();

    assert_eq!(
        handler_response(&first),
        &json!({ "callNumber": 1, "data": { "data": "x" } })
    );
    assert_eq!(handler_response(&second)["callNumber"], json!(1));
}

#[tokio::test]
async fn singleton_controller_shares_its_instance() {
    let metadata = MetadataStore::new();
    metadata.register::<SingletonController>();
    let dispatcher = dispatcher_for(metadata).await;
    let event = Event::new("singleton", json!({ "data": "x" }));

    let first = dispatcher.dispatch(&event).await.unwrap();
    let second = dispatcher.dispatch(&event).await.unwrap();

    assert_eq!(handler_response(&first)["callNumber"], json!(1));
    assert_eq!(handler_response(&second)["callNumber"], json!(2));
}

#[tokio::test]
async fn middleware_brackets_the_handler() {
    let metadata = MetadataStore::new();
    metadata.register::<StackedController>();
    let dispatcher = dispatcher_for(metadata).await;
    let payload = json!({ "data": "x" });

    let outcomes = dispatcher
        .dispatch(&Event::new("stacked", payload.clone()))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(
        outcomes[0].response_stack,
        vec![json!("1"), json!("2"), payload, json!("3"), json!("4")]
    );
}

#[tokio::test]
async fn events_only_reach_matching_routes() {
    let metadata = MetadataStore::new();
    metadata.register::<BasicController>();
    metadata.register::<SingletonController>();
    let dispatcher = dispatcher_for(metadata).await;

    assert_eq!(dispatcher.len(), 2);
    assert!(dispatcher.dispatch(&Event::new("unknown", Value::Null)).await.unwrap().is_empty());
    assert_eq!(dispatcher.dispatch(&Event::new("basic", Value::Null)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_middleware_method_propagates() {
    let metadata = MetadataStore::new();
    let controller = metadata.register::<BasicController>();
    metadata.annotate(controller, |a| {
        a.before(kiln::ComponentType::of::<common::ConfigValueMiddleware>(), "missing");
    });
    let dispatcher = dispatcher_for(metadata).await;

    let err = dispatcher
        .dispatch(&Event::new("basic", Value::Null))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Activation(ActivationError::Invoke(InvokeError::UnknownMethod { .. }))
    ));
}

#[tokio::test]
async fn explicit_loader_limits_candidates() {
    init_tracing();
    let metadata = Arc::new(MetadataStore::new());
    metadata.register::<BasicController>();
    let singleton = metadata.register::<SingletonController>();

    let framework = Framework::builder()
        .with_metadata(metadata)
        .with_controller_loader(ExplicitControllerLoader::new([singleton]))
        .build();
    let documents = framework.create_pipeline_definitions().await.unwrap();

    assert_eq!(documents.len(), 1);
    assert_eq!(
        documents[0].handler().unwrap().activation.target(),
        Some(singleton)
    );
}
