//! Configuration objects and mergeable instance properties.
//!
//! A [`Configuration`] is the static, declarative half of a recipe: a JSON
//! object attached to a definition. [`Properties`] is the live half: the
//! state an instance exposes so configuration can be merged onto it.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Reserved configuration key naming the context an entry belongs to.
pub const CONTEXT_NAME: &str = "contextName";

/// An ordered JSON object attached to a definition or recipe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Map<String, Value>);

impl Configuration {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Get a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the configuration has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The `contextName` entry, when it is a string.
    pub fn context_name(&self) -> Option<&str> {
        self.0.get(CONTEXT_NAME).and_then(Value::as_str)
    }

    /// Set `contextName` only when it is absent.
    pub fn with_default_context_name(mut self, name: impl Into<String>) -> Self {
        if !self.0.contains_key(CONTEXT_NAME) {
            self.0.insert(CONTEXT_NAME.to_owned(), Value::String(name.into()));
        }
        self
    }

    /// Build a configuration from a JSON value, which must be an object.
    ///
    /// `null` yields an empty configuration.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::Null => Ok(Self::new()),
            other => serde_json::from_value(other),
        }
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Configuration {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Mergeable state owned by a live instance.
///
/// Merging is shallow and the incoming configuration wins on conflicts.
/// Applying the same configuration repeatedly leaves the same result.
#[derive(Debug, Default)]
pub struct Properties {
    values: RwLock<Map<String, Value>>,
}

impl Properties {
    /// Create empty properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create properties pre-populated with defaults.
    pub fn with_defaults(defaults: Configuration) -> Self {
        Self {
            values: RwLock::new(defaults.into_inner()),
        }
    }

    /// Shallow-merge a configuration; configuration wins on conflicts.
    pub fn merge(&self, configuration: &Configuration) {
        if configuration.is_empty() {
            return;
        }
        let mut values = self.values.write();
        for (key, value) in configuration.iter() {
            values.insert(key.clone(), value.clone());
        }
    }

    /// Read a property and decode it.
    ///
    /// Returns `None` when the key is absent or does not decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let values = self.values.read();
        values
            .get(key)
            .and_then(|value| T::deserialize(value).ok())
    }

    /// Read a raw property value.
    pub fn get_value(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }

    /// Set a single property.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.write().insert(key.into(), value.into());
    }

    /// Copy of the current properties.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.values.read().clone()
    }
}

/// An instance that can receive configuration.
///
/// Types that expose no [`Properties`] ignore configuration.
pub trait Configurable: Send + Sync + 'static {
    /// The mergeable state of this instance.
    fn properties(&self) -> Option<&Properties> {
        None
    }
}
