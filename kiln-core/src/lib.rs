//! # kiln-core
//!
//! Core model and traits for the Kiln pipeline compiler.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! components, filters and extractors that don't need `kiln-std`.
//!
//! # Building Blocks
//!
//! - **Metadata model**: [`ControllerDefinition`], [`RouteDefinition`],
//!   [`MiddlewareDefinition`] and [`ExtractorDefinition`], attached to types
//!   through the [`MetadataStore`].
//! - **Type tokens**: [`TypeRef`] identifies a concrete type by `TypeId` and
//!   constructs it through the [`Container`].
//! - **Capabilities**: [`Component`] (controllers and middleware),
//!   [`Filter`] and [`Extractor`], each [`Configurable`].
//! - **Recipes**: a type plus a [`Configuration`] merged onto the instance's
//!   [`Properties`].
//! - **Run context**: [`ContextMap`], shared by the steps of one pipeline run.
//!
//! # Error Types
//!
//! - [`MissingTypeError`] - A recipe has no target type
//! - [`ResolutionError`] - The container cannot produce an instance
//! - [`InvokeError`] - A method invocation failed
//! - [`FactoryError`] / [`ActivationError`] - Transparent unions of the above

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod component;
mod config;
mod container;
mod context;
mod definition;
mod error;
mod event;
mod extractor;
mod filter;
mod loader;
mod metadata;
mod output;
mod types;

#[cfg(test)]
mod testing;

// Re-exports
pub use component::{Arguments, Component, FromArgument, MethodSignature};
pub use config::{CONTEXT_NAME, Configurable, Configuration, Properties};
pub use container::{BindingKey, Container, Resolver, Scope};
pub use context::{ContextMap, Deadline};
pub use definition::{
    AFTER_PRIORITY, BEFORE_PRIORITY, ControllerDefinition, ExtractorDefinition, ExtractorRecipe,
    FilterRecipe, MiddlewareDefinition, OneOrMany, Recipe, RouteDefinition,
};
pub use error::{
    ActivationError, ArgumentError, BoxError, FactoryError, InvokeError, MissingTypeError,
    ResolutionError,
};
pub use event::Event;
pub use extractor::{DynExtractor, Extractor};
pub use filter::{DynFilter, Filter};
pub use futures::future::BoxFuture;
pub use loader::ControllerLoader;
pub use metadata::{Annotated, Annotator, MetadataKind, MetadataStore, MethodAnnotator};
pub use output::{IntoOutput, Json};
pub use types::{ComponentType, ExtractorType, FilterType, Injectable, TypeRef};
