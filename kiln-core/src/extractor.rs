//! # Extractors
//!
//! An extractor derives one invocation argument from an event. Pipeline
//! documents map parameter indexes to extractor recipes; the dispatch engine
//! runs them and feeds the values to activation units positionally.

use crate::{config::Configurable, error::BoxError, event::Event};
use serde_json::Value;
use std::{future::Future, pin::Pin};

/// A strategy deriving one argument from an event.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Extractor`",
    label = "missing `Extractor` implementation",
    note = "Extractors must implement `extract` and `Configurable`."
)]
pub trait Extractor: Configurable {
    /// Extract a value from the event.
    fn extract(&self, event: &Event) -> impl Future<Output = Result<Value, BoxError>> + Send;
}

/// Dynamic object-safe version of [`Extractor`].
pub trait DynExtractor: Configurable {
    /// Extract a value from the event (dynamic dispatch version).
    fn extract_dyn<'a>(
        &'a self,
        event: &'a Event,
    ) -> Pin<Box<dyn Future<Output = Result<Value, BoxError>> + Send + 'a>>;
}

impl<T: Extractor> DynExtractor for T {
    fn extract_dyn<'a>(
        &'a self,
        event: &'a Event,
    ) -> Pin<Box<dyn Future<Output = Result<Value, BoxError>> + Send + 'a>> {
        Box::pin(self.extract(event))
    }
}
