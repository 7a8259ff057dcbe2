//! The event envelope routed through compiled pipelines.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound event as seen by filters and extractors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Discriminator used by most filters.
    pub event_type: String,
    /// Event payload.
    #[serde(default)]
    pub data: Value,
    /// Transport-specific routing data.
    #[serde(default)]
    pub route_data: Value,
}

impl Event {
    /// Create an event with the given type and payload.
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            route_data: Value::Null,
        }
    }

    /// Attach routing data.
    pub fn with_route_data(mut self, route_data: Value) -> Self {
        self.route_data = route_data;
        self
    }
}
