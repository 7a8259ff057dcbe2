//! # kiln-std
//!
//! Standard implementations for the Kiln pipeline compiler.
//!
//! This crate provides:
//! - **Recipe factory**: [`RecipeFactory`], configured instances from the container
//! - **Activation**: [`ActivationUnit`], per-call or shared method invocation
//! - **Compiler**: [`PipelineCompiler`] producing [`PipelineDocument`]s
//! - **Assembly**: [`Framework`] and the controller loaders
//! - **Dispatch**: [`PipelineDispatcher`], a reference engine for compiled documents
//! - **Built-ins**: filters, extractors, logging and timeout middleware
//!
//! # Features
//!
//! - `timeout`: cancel a step still running when its run's deadline passes
//! - `inventory`: discover controllers submitted with [`register_controller!`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use kiln_core;

#[cfg(feature = "inventory")]
pub use inventory;

// Modules
pub mod activation;
pub mod compiler;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod extractors;
pub mod factory;
pub mod filters;
pub mod framework;
pub mod loaders;
pub mod middleware;
pub mod options;
pub mod testing;

pub use activation::ActivationUnit;
pub use compiler::PipelineCompiler;
pub use dispatch::{DispatchOutcome, PipelineDispatcher};
pub use document::{MiddlewareDocument, PipelineDocument};
pub use error::{DispatchError, FrameworkError, TimeoutError};
pub use factory::RecipeFactory;
pub use framework::{Framework, FrameworkBuilder};
pub use loaders::{ExplicitControllerLoader, RegisteredControllerLoader};
#[cfg(feature = "inventory")]
pub use loaders::{ControllerRegistration, DiscoveringControllerLoader};
pub use options::CompilerOptions;
