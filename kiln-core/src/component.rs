//! # Components
//!
//! A component is any type whose methods can be activated by name: the
//! controllers carrying route handlers and the middleware wrapped around them.
//!
//! Components are object-safe. The method table is usually generated by the
//! `#[component]` attribute macro, which also records the declared parameter
//! names used to derive extractor context names.
//!
//! ```rust,ignore
//! #[derive(Default)]
//! struct Greeter;
//!
//! #[kiln::component(injectable)]
//! impl Greeter {
//!     pub fn greet(&self, name: String) -> String {
//!         format!("hello {name}")
//!     }
//! }
//! ```

use crate::{
    config::Configurable,
    context::ContextMap,
    error::{ArgumentError, InvokeError},
};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Static description of one invocable method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodSignature {
    /// Method name as used in definitions.
    pub name: &'static str,
    /// Declared parameter names, in order.
    pub params: &'static [&'static str],
}

impl MethodSignature {
    /// Declared name of the parameter at `index`, when known and non-empty.
    pub fn param_name(&self, index: usize) -> Option<&'static str> {
        self.params.get(index).copied().filter(|name| !name.is_empty())
    }
}

/// A type whose methods can be invoked by name with positional arguments.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Component`",
    label = "missing `Component` implementation",
    note = "add `#[kiln::component]` to an `impl` block of `{Self}` or implement `Component` manually"
)]
pub trait Component: Configurable {
    /// Invoke `method` with the given arguments.
    fn invoke<'a>(
        &'a self,
        method: &'a str,
        args: Arguments,
    ) -> BoxFuture<'a, Result<Value, InvokeError>>;

    /// Methods exposed by this component, in declaration order.
    fn signatures() -> &'static [MethodSignature]
    where
        Self: Sized,
    {
        &[]
    }
}

/// Positional runtime arguments for an invocation.
///
/// A slot is `None` when nothing was extracted for that parameter. The
/// arguments also carry the [`ContextMap`] of the pipeline run they belong to.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    slots: Vec<Option<Value>>,
    context: ContextMap,
}

impl Arguments {
    /// Create empty arguments with a fresh context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slot.
    pub fn push(&mut self, value: Option<Value>) {
        self.slots.push(value);
    }

    /// Builder-style append of a present value.
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.slots.push(Some(value.into()));
        self
    }

    /// Builder-style context replacement.
    pub fn with_context(mut self, context: ContextMap) -> Self {
        self.context = context;
        self
    }

    /// The value at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// The context of the run these arguments belong to.
    pub fn context(&self) -> &ContextMap {
        &self.context
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Decode the argument at `index` into the declared parameter type.
    ///
    /// Missing slots decode from `null`, so `Option<T>` parameters receive `None`.
    pub fn decode<T: DeserializeOwned>(&self, index: usize, method: &str) -> Result<T, ArgumentError> {
        let value = self.get(index).cloned().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|source| ArgumentError {
            index,
            method: method.to_owned(),
            source,
        })
    }
}

impl PartialEq for Arguments {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        values.into_iter().map(Some).collect()
    }
}

impl FromIterator<Option<Value>> for Arguments {
    fn from_iter<I: IntoIterator<Item = Option<Value>>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
            context: ContextMap::new(),
        }
    }
}

/// A method parameter type that can be produced from [`Arguments`].
///
/// Every deserialisable type decodes from its slot. [`ContextMap`] ignores
/// the slot and receives the run's context instead.
pub trait FromArgument: Sized {
    /// Produce the parameter at `index` of `method`.
    fn from_argument(args: &Arguments, index: usize, method: &str) -> Result<Self, ArgumentError>;
}

impl<T: DeserializeOwned> FromArgument for T {
    fn from_argument(args: &Arguments, index: usize, method: &str) -> Result<Self, ArgumentError> {
        args.decode(index, method)
    }
}

impl FromArgument for ContextMap {
    fn from_argument(args: &Arguments, _index: usize, _method: &str) -> Result<Self, ArgumentError> {
        Ok(args.context().clone())
    }
}
