//! Error types for the standard implementation.

use kiln_core::{ActivationError, BoxError, FactoryError, MissingTypeError, ResolutionError};
use std::time::Duration;
use thiserror::Error;

/// A pipeline run outlived the deadline set in its context.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("pipeline run exceeded its {}ms budget", budget.as_millis())]
pub struct TimeoutError {
    /// The budget that was exceeded.
    pub budget: Duration,
}

/// Errors raised by [`PipelineDispatcher`](crate::dispatch::PipelineDispatcher).
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A filter or extractor recipe had no target type.
    #[error(transparent)]
    MissingType(#[from] MissingTypeError),

    /// A filter or extractor could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A filter failed while evaluating an event.
    #[error("filter failed")]
    Filter(#[source] BoxError),

    /// An extractor failed while deriving an argument.
    #[error("extractor for argument {index} failed")]
    Extraction {
        /// Zero-based parameter index.
        index: usize,
        /// The extractor failure.
        #[source]
        source: BoxError,
    },

    /// A middleware or route handler activation failed.
    #[error(transparent)]
    Activation(#[from] ActivationError),

    /// The run's deadline passed.
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
}

impl From<FactoryError> for DispatchError {
    fn from(err: FactoryError) -> Self {
        match err {
            FactoryError::MissingType(err) => DispatchError::MissingType(err),
            FactoryError::Resolution(err) => DispatchError::Resolution(err),
        }
    }
}

/// Errors raised by [`Framework`](crate::framework::Framework).
#[derive(Error, Debug)]
pub enum FrameworkError {
    /// The controller loader failed; nothing was compiled.
    #[error("failed to load controllers")]
    Load(#[source] BoxError),
}
