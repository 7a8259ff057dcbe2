//! # kiln - Pipeline Compiler for Annotated Controllers
//!
//! `kiln` compiles controllers carrying route, middleware and parameter
//! metadata into ordered pipeline documents. Each document holds a middleware
//! stack (controller before, route before, handler, route after, controller
//! after) and a filter stack, ready for a dispatch engine.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kiln::prelude::*;
//! use kiln::{extractors::EventData, filters::IfEventIs};
//!
//! #[derive(Default)]
//! struct EchoController;
//!
//! #[kiln::component(injectable)]
//! impl EchoController {
//!     pub async fn echo(&self, payload: Value) -> Value {
//!         payload
//!     }
//! }
//!
//! impl Annotated for EchoController {
//!     fn annotate(a: &mut Annotator<'_>) {
//!         a.controller(ControllerDefinition::new()).method("echo", |m| {
//!             m.route(RouteDefinition::new(FilterType::of::<IfEventIs>()).configuration(
//!                 Configuration::new().with("eventType", "echo"),
//!             ))
//!             .param(ExtractorDefinition::new(0, ExtractorType::of::<EventData>()));
//!         });
//!     }
//! }
//!
//! let metadata = Arc::new(MetadataStore::new());
//! metadata.register::<EchoController>();
//!
//! let framework = Framework::builder().with_metadata(metadata).build();
//! let documents = framework.create_pipeline_definitions().await?;
//! let dispatcher = PipelineDispatcher::new(documents, framework.factory())?;
//! let outcomes = dispatcher.dispatch(&Event::new("echo", json!("hi"))).await?;
//! ```

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use kiln_core::{
    // Errors
    ActivationError,
    // Metadata model
    AFTER_PRIORITY,
    // Annotation
    Annotated,
    Annotator,
    ArgumentError,
    // Components
    Arguments,
    BEFORE_PRIORITY,
    // Container
    BindingKey,
    BoxError,
    BoxFuture,
    CONTEXT_NAME,
    Component,
    ComponentType,
    // Configuration
    Configurable,
    Configuration,
    Container,
    // Dispatch context
    ContextMap,
    ControllerDefinition,
    // Loading
    ControllerLoader,
    Deadline,
    DynExtractor,
    DynFilter,
    // Events
    Event,
    Extractor,
    ExtractorDefinition,
    ExtractorRecipe,
    ExtractorType,
    FactoryError,
    Filter,
    FilterRecipe,
    FilterType,
    FromArgument,
    Injectable,
    IntoOutput,
    InvokeError,
    Json,
    MetadataKind,
    MetadataStore,
    MethodAnnotator,
    MethodSignature,
    MiddlewareDefinition,
    MissingTypeError,
    OneOrMany,
    Properties,
    Recipe,
    ResolutionError,
    Resolver,
    RouteDefinition,
    Scope,
    TypeRef,
    injectable_default,
};

pub use kiln_std::{
    ActivationUnit, CompilerOptions, DispatchError, DispatchOutcome, ExplicitControllerLoader,
    Framework, FrameworkBuilder, FrameworkError, MiddlewareDocument, PipelineCompiler,
    PipelineDispatcher, PipelineDocument, RecipeFactory, RegisteredControllerLoader, TimeoutError,
};

#[cfg(feature = "inventory")]
pub use kiln_std::{ControllerRegistration, DiscoveringControllerLoader, register_controller};

/// Built-in filters.
pub mod filters {
    #![allow(clippy::wildcard_imports)]
    pub use kiln_std::filters::*;
}

/// Built-in extractors.
pub mod extractors {
    #![allow(clippy::wildcard_imports)]
    pub use kiln_std::extractors::*;
}

/// Built-in middleware.
pub mod middleware {
    #![allow(clippy::wildcard_imports)]
    pub use kiln_std::middleware::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use kiln_std::testing::*;
}

/// Prelude module - common imports for Kiln.
///
/// # Usage
///
/// ```rust,ignore
/// use kiln::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Annotation
        Annotated,
        Annotator,
        // Components
        Arguments,
        BoxError,
        Component,
        ComponentType,
        Configurable,
        Configuration,
        ContextMap,
        ControllerDefinition,
        Event,
        Extractor,
        ExtractorDefinition,
        ExtractorType,
        Filter,
        FilterType,
        // Assembly
        Framework,
        Injectable,
        MetadataStore,
        MiddlewareDefinition,
        PipelineDispatcher,
        PipelineDocument,
        Properties,
        RouteDefinition,
    };
    pub use serde_json::{Value, json};
}

#[doc(hidden)]
pub mod __private {
    pub use futures::future::BoxFuture;
    pub use serde_json::Value;
}

#[cfg(feature = "macros")]
pub use kiln_macros::component;
