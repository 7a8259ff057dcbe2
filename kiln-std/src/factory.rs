//! Recipe factory.
//!
//! Turns a type token, a configuration and a lifecycle flag into a live,
//! configured instance. Bindings are registered on first use; the first
//! registration fixes the lifecycle of a type for the container's lifetime.

use kiln_core::{
    BindingKey, Configurable, Configuration, Container, FactoryError, MissingTypeError, Recipe,
    Scope, TypeRef,
};
use std::sync::Arc;

/// Creates configured instances through a [`Container`].
#[derive(Debug, Default)]
pub struct RecipeFactory {
    container: Arc<Container>,
}

impl RecipeFactory {
    /// Create a factory over `container`.
    pub fn new(container: Arc<Container>) -> Self {
        Self { container }
    }

    /// The underlying container.
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// Resolve an instance of `ty` and merge `configuration` onto it.
    ///
    /// With `shared`, repeated resolutions return the same instance and the
    /// configuration is re-applied every time.
    ///
    /// # Errors
    ///
    /// [`FactoryError::MissingType`] when `ty` is `None`, and
    /// [`FactoryError::Resolution`] when the container cannot build it.
    pub fn create_instance<K>(
        &self,
        ty: Option<&TypeRef<K>>,
        configuration: &Configuration,
        shared: bool,
    ) -> Result<Arc<K>, FactoryError>
    where
        K: ?Sized + Configurable,
    {
        let ty = ty.ok_or(MissingTypeError)?;
        self.ensure_bound(ty, Scope::from_shared(shared));
        let instance = self.container.resolve(ty)?;
        self.configure(instance.as_ref(), configuration);
        Ok(instance)
    }

    /// [`create_instance`](Self::create_instance) for a recipe.
    pub fn create<K>(&self, recipe: &Recipe<K>, shared: bool) -> Result<Arc<K>, FactoryError>
    where
        K: ?Sized + Configurable,
    {
        self.create_instance(recipe.ty.as_ref(), &recipe.configuration, shared)
    }

    /// Shallow-merge `configuration` onto `instance`; configuration wins.
    pub fn configure<K>(&self, instance: &K, configuration: &Configuration)
    where
        K: ?Sized + Configurable,
    {
        match instance.properties() {
            Some(properties) => properties.merge(configuration),
            None if !configuration.is_empty() => {
                tracing::trace!(
                    keys = configuration.len(),
                    "instance exposes no properties; configuration ignored"
                );
            }
            None => {}
        }
    }

    fn ensure_bound<K>(&self, ty: &TypeRef<K>, scope: Scope)
    where
        K: ?Sized + Send + Sync + 'static,
    {
        match self.container.scope_of(&BindingKey::of(ty)) {
            None => {
                if self.container.bind(ty, scope) {
                    tracing::debug!(type_name = ty.name(), ?scope, "bound type");
                }
            }
            Some(existing) if existing != scope => {
                tracing::warn!(
                    type_name = ty.name(),
                    requested = ?scope,
                    bound = ?existing,
                    "type is already bound with another lifecycle; keeping the first binding"
                );
            }
            Some(_) => {}
        }
    }
}
