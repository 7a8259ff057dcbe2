//! Built-in filters.

use kiln_core::{BoxError, Configurable, Event, Filter, Properties};

/// Matches events whose type equals the `eventType` property.
///
/// An unconfigured filter matches nothing.
#[derive(Debug, Default)]
pub struct IfEventIs {
    properties: Properties,
}

kiln_core::injectable_default!(IfEventIs, AnyEvent);

impl IfEventIs {
    /// Property naming the accepted event type.
    pub const EVENT_TYPE: &'static str = "eventType";
}

impl Configurable for IfEventIs {
    fn properties(&self) -> Option<&Properties> {
        Some(&self.properties)
    }
}

impl Filter for IfEventIs {
    async fn matches(&self, event: &Event) -> Result<bool, BoxError> {
        Ok(self
            .properties
            .get::<String>(Self::EVENT_TYPE)
            .is_some_and(|expected| expected == event.event_type))
    }
}

/// Matches every event.
#[derive(Debug, Default)]
pub struct AnyEvent;

impl Configurable for AnyEvent {}

impl Filter for AnyEvent {
    async fn matches(&self, _event: &Event) -> Result<bool, BoxError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::Configuration;
    use serde_json::json;

    #[tokio::test]
    async fn if_event_is_compares_event_type() {
        let filter = IfEventIs::default();
        let event = Event::new("basic", json!({}));
        assert!(!filter.matches(&event).await.unwrap());

        filter
            .properties
            .merge(&Configuration::new().with(IfEventIs::EVENT_TYPE, "basic"));
        assert!(filter.matches(&event).await.unwrap());
        assert!(!filter.matches(&Event::new("other", json!({}))).await.unwrap());
    }
}
