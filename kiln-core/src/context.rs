//! # Dispatch context
//!
//! A [`ContextMap`] is created once per pipeline run and handed to every
//! step of that run. Steps use it to leave values for the steps after them
//! and to set a deadline for the rest of the run.
//!
//! The map is a cheap handle: clones share the same state.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// A point in time by which a pipeline run must finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    /// When the run expires.
    pub at: Instant,
    /// The budget the deadline was derived from.
    pub budget: Duration,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    /// Time left before expiry; zero once expired.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }
}

#[derive(Debug, Default)]
struct ContextState {
    values: Map<String, Value>,
    deadline: Option<Deadline>,
}

/// Mutable state shared by the steps of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ContextMap {
    state: Arc<RwLock<ContextState>>,
}

impl ContextMap {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value and decode it.
    ///
    /// Returns `None` when the key is absent or does not decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let state = self.state.read();
        state.values.get(key).and_then(|value| T::deserialize(value).ok())
    }

    /// Read a raw value.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.state.read().values.get(key).cloned()
    }

    /// Store a value, returning the previous one.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.state.write().values.insert(key.into(), value.into())
    }

    /// Remove a value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.state.write().values.remove(key)
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.state.read().values.contains_key(key)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.state.read().values.len()
    }

    /// Whether no values are stored.
    pub fn is_empty(&self) -> bool {
        self.state.read().values.is_empty()
    }

    /// Copy of the stored values.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.state.read().values.clone()
    }

    /// Limit the rest of the run to `budget` from now.
    ///
    /// An earlier deadline already in place is kept. Returns the deadline in
    /// effect.
    pub fn set_deadline(&self, budget: Duration) -> Deadline {
        let candidate = Deadline::after(budget);
        let mut state = self.state.write();
        match state.deadline {
            Some(existing) if existing.at <= candidate.at => existing,
            _ => {
                state.deadline = Some(candidate);
                candidate
            }
        }
    }

    /// The deadline in effect, if any.
    pub fn deadline(&self) -> Option<Deadline> {
        self.state.read().deadline
    }

    /// Whether both handles share the same state.
    pub fn same_as(&self, other: &ContextMap) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_values() {
        let context = ContextMap::new();
        let handle = context.clone();
        handle.insert("user", json!({ "id": 1 }));

        assert!(context.same_as(&handle));
        assert_eq!(context.get_value("user"), Some(json!({ "id": 1 })));
        assert_eq!(context.get::<String>("user"), None);
        assert_eq!(context.remove("user"), Some(json!({ "id": 1 })));
        assert!(handle.is_empty());
    }

    #[test]
    fn earliest_deadline_wins() {
        let context = ContextMap::new();
        assert!(context.deadline().is_none());

        let short = context.set_deadline(Duration::from_millis(50));
        let kept = context.set_deadline(Duration::from_secs(60));
        assert_eq!(kept, short);
        assert_eq!(context.deadline().map(|d| d.budget), Some(Duration::from_millis(50)));
    }

    #[test]
    fn zero_budget_is_expired() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }
}
