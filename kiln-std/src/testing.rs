//! Testing utilities for Kiln.
//!
//! Small components and filters for exercising compiled pipelines without
//! writing fixtures by hand.
//!
//! - [`Counter`]: a component counting its own activations
//! - [`Failing`]: a component whose method always fails
//! - [`NeverMatch`]: a filter rejecting every event

use kiln_core::{
    Arguments, BoxError, BoxFuture, Component, Configurable, Event, Filter, InvokeError,
    MethodSignature, Properties,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts how many times `count` was invoked on this instance.
///
/// `count` returns the number of calls so far, including this one, which
/// makes instance reuse observable.
#[derive(Debug, Default)]
pub struct Counter {
    calls: AtomicUsize,
    properties: Properties,
}

impl Counter {
    /// Calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Configurable for Counter {
    fn properties(&self) -> Option<&Properties> {
        Some(&self.properties)
    }
}

impl Component for Counter {
    fn invoke<'a>(
        &'a self,
        method: &'a str,
        _args: Arguments,
    ) -> BoxFuture<'a, Result<Value, InvokeError>> {
        Box::pin(async move {
            match method {
                "count" => Ok(Value::from(self.calls.fetch_add(1, Ordering::SeqCst) + 1)),
                _ => Err(InvokeError::UnknownMethod {
                    component: "Counter",
                    method: method.to_owned(),
                }),
            }
        })
    }

    fn signatures() -> &'static [MethodSignature] {
        &[MethodSignature {
            name: "count",
            params: &[],
        }]
    }
}

/// A component whose `fail` method returns the error `"boom"`.
#[derive(Debug, Default)]
pub struct Failing;

impl Configurable for Failing {}

impl Component for Failing {
    fn invoke<'a>(
        &'a self,
        _method: &'a str,
        _args: Arguments,
    ) -> BoxFuture<'a, Result<Value, InvokeError>> {
        Box::pin(async { Err(InvokeError::Handler("boom".into())) })
    }
}

/// Rejects every event.
#[derive(Debug, Default)]
pub struct NeverMatch;

impl Configurable for NeverMatch {}

impl Filter for NeverMatch {
    async fn matches(&self, _event: &Event) -> Result<bool, BoxError> {
        Ok(false)
    }
}

kiln_core::injectable_default!(Counter, Failing, NeverMatch);
