//! Built-in extractors.

use kiln_core::{BoxError, Configurable, Event, Extractor, Properties};
use serde_json::Value;

/// Extracts the event payload.
#[derive(Debug, Default)]
pub struct EventData;

/// Extracts the event type as a string.
#[derive(Debug, Default)]
pub struct EventType;

/// Extracts the routing data attached to the event.
#[derive(Debug, Default)]
pub struct RouteData;

/// Extracts the whole event envelope.
#[derive(Debug, Default)]
pub struct FullEvent;

/// Marks a parameter as receiving the run's [`ContextMap`](kiln_core::ContextMap).
///
/// The slot itself stays `null`; a `ContextMap` parameter takes the context
/// carried by the arguments rather than decoding the slot.
#[derive(Debug, Default)]
pub struct DispatchContext;

/// Extracts the configured `value` property, ignoring the event.
#[derive(Debug, Default)]
pub struct Constant {
    properties: Properties,
}

kiln_core::injectable_default!(
    EventData,
    EventType,
    RouteData,
    FullEvent,
    DispatchContext,
    Constant
);

impl Configurable for EventData {}
impl Configurable for EventType {}
impl Configurable for RouteData {}
impl Configurable for FullEvent {}
impl Configurable for DispatchContext {}

impl Configurable for Constant {
    fn properties(&self) -> Option<&Properties> {
        Some(&self.properties)
    }
}

impl Extractor for EventData {
    async fn extract(&self, event: &Event) -> Result<Value, BoxError> {
        Ok(event.data.clone())
    }
}

impl Extractor for EventType {
    async fn extract(&self, event: &Event) -> Result<Value, BoxError> {
        Ok(Value::String(event.event_type.clone()))
    }
}

impl Extractor for RouteData {
    async fn extract(&self, event: &Event) -> Result<Value, BoxError> {
        Ok(event.route_data.clone())
    }
}

impl Extractor for FullEvent {
    async fn extract(&self, event: &Event) -> Result<Value, BoxError> {
        Ok(serde_json::to_value(event)?)
    }
}

impl Extractor for DispatchContext {
    async fn extract(&self, _event: &Event) -> Result<Value, BoxError> {
        Ok(Value::Null)
    }
}

impl Extractor for Constant {
    async fn extract(&self, _event: &Event) -> Result<Value, BoxError> {
        Ok(self.properties.get_value("value").unwrap_or(Value::Null))
    }
}
