//! Error types for Kiln.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`MissingTypeError`] - A recipe was used without a target type
//! - [`ResolutionError`] - The container could not produce an instance
//! - [`ArgumentError`] - A positional argument could not be decoded
//! - [`InvokeError`] - Invoking a component method failed
//! - [`FactoryError`] - Creating a configured instance failed
//! - [`ActivationError`] - Running an activation unit failed
//!
//! Failures coming from collaborators (the container, handler bodies) are
//! carried transparently: their `Display` and `source()` are never rewritten.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A recipe referenced no target type and cannot be crafted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("a recipe has no specified type and cannot be crafted")]
pub struct MissingTypeError;

/// Errors raised by the dependency-injection container.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// No binding exists for the requested key.
    #[error("no binding registered for `{type_name}`")]
    Unbound {
        /// Name of the requested type.
        type_name: &'static str,
    },

    /// Resolving the requested key re-entered itself.
    #[error("circular dependency detected: {}", path.join(" -> "))]
    Circular {
        /// The resolution path, ending with the repeated type.
        path: Vec<&'static str>,
    },

    /// A binding produced a value of an unexpected type.
    #[error("binding for `{type_name}` produced a value of another type")]
    TypeMismatch {
        /// Name of the requested type.
        type_name: &'static str,
    },

    /// The type's constructor reported a failure.
    #[error("failed to construct `{type_name}`")]
    Construction {
        /// Name of the type being constructed.
        type_name: &'static str,
        /// The constructor failure.
        #[source]
        source: BoxError,
    },
}

/// A positional argument could not be decoded into the declared parameter type.
#[derive(Error, Debug)]
#[error("argument {index} of `{method}` could not be decoded")]
pub struct ArgumentError {
    /// Zero-based parameter index.
    pub index: usize,
    /// Method being invoked.
    pub method: String,
    /// The decoding failure.
    #[source]
    pub source: serde_json::Error,
}

/// Errors raised while invoking a method on a component.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The component exposes no method with this name.
    #[error("`{component}` has no method named `{method}`")]
    UnknownMethod {
        /// Name of the component type.
        component: &'static str,
        /// The requested method.
        method: String,
    },

    /// An argument did not match the declared parameter type.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The method body itself failed.
    #[error(transparent)]
    Handler(BoxError),
}

/// Errors raised by the recipe factory.
#[derive(Error, Debug)]
pub enum FactoryError {
    /// The recipe had no target type.
    #[error(transparent)]
    MissingType(#[from] MissingTypeError),

    /// The container could not produce the instance.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Errors raised when an activation unit runs.
#[derive(Error, Debug)]
pub enum ActivationError {
    /// The activation target had no type.
    #[error(transparent)]
    MissingType(#[from] MissingTypeError),

    /// The container could not produce the instance.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The invoked method failed.
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

impl ActivationError {
    /// Returns the error raised by the method body, if that is what failed.
    pub fn handler_error(&self) -> Option<&BoxError> {
        match self {
            ActivationError::Invoke(InvokeError::Handler(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<FactoryError> for ActivationError {
    fn from(err: FactoryError) -> Self {
        match err {
            FactoryError::MissingType(err) => ActivationError::MissingType(err),
            FactoryError::Resolution(err) => ActivationError::Resolution(err),
        }
    }
}

impl From<BoxError> for InvokeError {
    fn from(err: BoxError) -> Self {
        InvokeError::Handler(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_error_lists_path() {
        let err = ResolutionError::Circular {
            path: vec!["A", "B", "A"],
        };
        assert_eq!(err.to_string(), "circular dependency detected: A -> B -> A");
    }

    #[test]
    fn factory_error_converts_without_wrapping() {
        let err: ActivationError = FactoryError::from(MissingTypeError).into();
        assert!(matches!(err, ActivationError::MissingType(MissingTypeError)));
        assert_eq!(
            err.to_string(),
            "a recipe has no specified type and cannot be crafted"
        );
    }

    #[test]
    fn handler_error_is_transparent() {
        let inner: BoxError = "boom".into();
        let err = ActivationError::from(InvokeError::Handler(inner));
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.handler_error().map(|e| e.to_string()), Some("boom".into()));
    }
}
