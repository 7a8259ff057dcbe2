//! Activation units.
//!
//! An [`ActivationUnit`] is the callable half of a middleware document: it
//! knows which component method to run and how to obtain the instance.

use crate::factory::RecipeFactory;
use kiln_core::{
    ActivationError, Arguments, Component, ComponentType, Configuration, FactoryError,
};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::{fmt, sync::Arc};

/// A `(type, method, configuration, lifecycle)` tuple ready to be invoked.
///
/// A shared unit constructs its instance at most once, on first use, and
/// keeps it for its own lifetime. The cache belongs to the unit: two units
/// for the same type only share an instance when the container does.
pub struct ActivationUnit {
    target: Option<ComponentType>,
    method: String,
    configuration: Configuration,
    shared: bool,
    factory: Arc<RecipeFactory>,
    instance: OnceCell<Arc<dyn Component>>,
}

impl ActivationUnit {
    /// Build a unit. Nothing is resolved until the first activation.
    pub fn build(
        target: impl Into<Option<ComponentType>>,
        configuration: Configuration,
        method: impl Into<String>,
        shared: bool,
        factory: Arc<RecipeFactory>,
    ) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
            configuration,
            shared,
            factory,
            instance: OnceCell::new(),
        }
    }

    /// The component type, if any.
    pub fn target(&self) -> Option<ComponentType> {
        self.target
    }

    /// The method invoked on the instance.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Configuration applied on every activation.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Whether the instance is cached across activations.
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    /// The cached instance, once a shared unit has been activated.
    pub fn cached(&self) -> Option<&Arc<dyn Component>> {
        self.instance.get()
    }

    /// Obtain the instance this activation runs against.
    pub fn instance(&self) -> Result<Arc<dyn Component>, FactoryError> {
        if !self.shared {
            return self
                .factory
                .create_instance(self.target.as_ref(), &self.configuration, false);
        }

        let mut created = false;
        let instance = self.instance.get_or_try_init(|| {
            created = true;
            self.factory
                .create_instance(self.target.as_ref(), &self.configuration, true)
        })?;
        if !created {
            self.factory.configure(instance.as_ref(), &self.configuration);
        }
        Ok(Arc::clone(instance))
    }

    /// Invoke the method with positional arguments.
    ///
    /// The method's result is returned unchanged, failures included.
    pub async fn activate(&self, args: Arguments) -> Result<Value, ActivationError> {
        let instance = self.instance()?;
        let output = instance.invoke(&self.method, args).await?;
        Ok(output)
    }
}

impl PartialEq for ActivationUnit {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.method == other.method
            && self.shared == other.shared
            && self.configuration == other.configuration
    }
}

impl fmt::Debug for ActivationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationUnit")
            .field("target", &self.target)
            .field("method", &self.method)
            .field("shared", &self.shared)
            .field("configuration", &self.configuration)
            .field("cached", &self.instance.get().is_some())
            .finish()
    }
}
