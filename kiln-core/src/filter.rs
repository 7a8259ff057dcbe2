//! # Filters
//!
//! A filter decides whether an event is routed to a compiled pipeline. The
//! filter stack of a pipeline document lists filter recipes in evaluation
//! order; the dispatch engine instantiates and configures them.
//!
//! # Static vs Dynamic Dispatch
//!
//! [`Filter`] uses native `async fn` for static dispatch. Filter recipes hold
//! the object-safe [`DynFilter`], implemented for every `Filter`.

use crate::{config::Configurable, error::BoxError, event::Event};
use std::{future::Future, pin::Pin};

/// A routing predicate over events.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Filter`",
    label = "missing `Filter` implementation",
    note = "Filters must implement `matches` and `Configurable`."
)]
pub trait Filter: Configurable {
    /// Whether this filter accepts the event.
    fn matches(&self, event: &Event) -> impl Future<Output = Result<bool, BoxError>> + Send;
}

/// Dynamic object-safe version of [`Filter`].
pub trait DynFilter: Configurable {
    /// Whether this filter accepts the event (dynamic dispatch version).
    fn matches_dyn<'a>(
        &'a self,
        event: &'a Event,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BoxError>> + Send + 'a>>;
}

impl<T: Filter> DynFilter for T {
    fn matches_dyn<'a>(
        &'a self,
        event: &'a Event,
    ) -> Pin<Box<dyn Future<Output = Result<bool, BoxError>> + Send + 'a>> {
        Box::pin(self.matches(event))
    }
}
