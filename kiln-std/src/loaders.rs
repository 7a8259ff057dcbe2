//! Controller loaders.
//!
//! - [`ExplicitControllerLoader`]: a fixed list
//! - [`RegisteredControllerLoader`]: every controller in a metadata store
//! - `DiscoveringControllerLoader` (`inventory` feature): controllers
//!   submitted anywhere in the program with [`register_controller!`](crate::register_controller)

use async_trait::async_trait;
use kiln_core::{BoxError, ComponentType, ControllerLoader, MetadataKind, MetadataStore};
use std::sync::Arc;

/// Supplies a fixed list of candidates.
#[derive(Debug, Clone, Default)]
pub struct ExplicitControllerLoader {
    controllers: Vec<ComponentType>,
}

impl ExplicitControllerLoader {
    /// Create a loader over `controllers`.
    pub fn new(controllers: impl IntoIterator<Item = ComponentType>) -> Self {
        Self {
            controllers: controllers.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ControllerLoader for ExplicitControllerLoader {
    async fn load_controllers(&self) -> Result<Vec<ComponentType>, BoxError> {
        Ok(self.controllers.clone())
    }
}

/// Supplies every registered target carrying a controller definition,
/// in registration order.
#[derive(Debug, Clone)]
pub struct RegisteredControllerLoader {
    metadata: Arc<MetadataStore>,
}

impl RegisteredControllerLoader {
    /// Create a loader over `metadata`.
    pub fn new(metadata: Arc<MetadataStore>) -> Self {
        Self { metadata }
    }
}

#[async_trait]
impl ControllerLoader for RegisteredControllerLoader {
    async fn load_controllers(&self) -> Result<Vec<ComponentType>, BoxError> {
        Ok(self
            .metadata
            .targets()
            .into_iter()
            .filter(|target| {
                self.metadata
                    .has_metadata(MetadataKind::Controller, target, None)
            })
            .collect())
    }
}

/// A controller type submitted for discovery.
///
/// Created by [`register_controller!`](crate::register_controller).
#[cfg(feature = "inventory")]
pub struct ControllerRegistration {
    register: fn(&MetadataStore) -> ComponentType,
}

#[cfg(feature = "inventory")]
impl ControllerRegistration {
    #[doc(hidden)]
    pub const fn new(register: fn(&MetadataStore) -> ComponentType) -> Self {
        Self { register }
    }

    /// Register the type's annotations in `metadata` and return its token.
    pub fn register(&self, metadata: &MetadataStore) -> ComponentType {
        (self.register)(metadata)
    }
}

#[cfg(feature = "inventory")]
inventory::collect!(ControllerRegistration);

/// Submit controller types for discovery by `DiscoveringControllerLoader`.
///
/// ```rust,ignore
/// kiln::register_controller!(OrdersController, InvoicesController);
/// ```
#[cfg(feature = "inventory")]
#[macro_export]
macro_rules! register_controller {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::inventory::submit! {
                $crate::loaders::ControllerRegistration::new(|metadata| metadata.register::<$ty>())
            }
        )+
    };
}

/// Supplies every controller submitted with
/// [`register_controller!`](crate::register_controller) whose short type
/// name matches a pattern.
///
/// Discovered types are registered in the metadata store first, so their
/// annotations are applied exactly once. Results are ordered by type name.
/// Without a custom pattern, names ending in `Controller` match.
#[cfg(feature = "inventory")]
#[derive(Debug, Clone)]
pub struct DiscoveringControllerLoader {
    metadata: Arc<MetadataStore>,
    pattern: Option<regex::Regex>,
}

#[cfg(feature = "inventory")]
impl DiscoveringControllerLoader {
    /// Suffix matched when no pattern is set.
    pub const DEFAULT_SUFFIX: &'static str = "Controller";

    /// Create a loader registering into `metadata`.
    pub fn new(metadata: Arc<MetadataStore>) -> Self {
        Self {
            metadata,
            pattern: None,
        }
    }

    /// Only keep types whose short name matches `pattern`.
    ///
    /// # Errors
    ///
    /// Fails when `pattern` is not a valid regular expression.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.pattern = Some(regex::Regex::new(pattern)?);
        Ok(self)
    }

    fn matches(&self, ty: &ComponentType) -> bool {
        let name = ty.short_name();
        match &self.pattern {
            Some(pattern) => pattern.is_match(name),
            None => name.ends_with(Self::DEFAULT_SUFFIX),
        }
    }
}

#[cfg(feature = "inventory")]
#[async_trait]
impl ControllerLoader for DiscoveringControllerLoader {
    async fn load_controllers(&self) -> Result<Vec<ComponentType>, BoxError> {
        let mut discovered: Vec<ComponentType> = inventory::iter::<ControllerRegistration>()
            .into_iter()
            .map(|registration| registration.register(&self.metadata))
            .filter(|ty| self.matches(ty))
            .filter(|ty| self.metadata.has_metadata(MetadataKind::Controller, ty, None))
            .collect();
        discovered.sort_by_key(|ty| ty.name());
        discovered.dedup();
        tracing::debug!(discovered = discovered.len(), "discovered controllers");
        Ok(discovered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{middleware::LoggingMiddleware, testing::Counter};
    use kiln_core::ControllerDefinition;

    #[tokio::test]
    async fn registered_loader_lists_controllers_only() {
        let metadata = Arc::new(MetadataStore::new());
        metadata.register::<LoggingMiddleware>();
        let counter = ComponentType::of::<Counter>();
        metadata.annotate(counter, |a| {
            a.controller(ControllerDefinition::new());
        });

        let loader = RegisteredControllerLoader::new(metadata);
        assert_eq!(loader.load_controllers().await.unwrap(), vec![counter]);
    }
}

#[cfg(all(test, feature = "inventory"))]
mod discovery_tests {
    use super::*;
    use kiln_core::{
        Annotated, Annotator, Arguments, BoxFuture, Component, Configurable, ControllerDefinition,
        InvokeError, RouteDefinition,
    };
    use serde_json::Value;

    macro_rules! routed {
        ($($ty:ident),+) => {
            $(
                #[derive(Default)]
                struct $ty;

                kiln_core::injectable_default!($ty);

                impl Configurable for $ty {}

                impl Component for $ty {
                    fn invoke<'a>(
                        &'a self,
                        _method: &'a str,
                        _args: Arguments,
                    ) -> BoxFuture<'a, Result<Value, InvokeError>> {
                        Box::pin(async { Ok(Value::Null) })
                    }
                }

                impl Annotated for $ty {
                    fn annotate(a: &mut Annotator<'_>) {
                        a.controller(ControllerDefinition::new()).method("handle", |m| {
                            m.route(RouteDefinition::unfiltered());
                        });
                    }
                }
            )+
        };
    }

    routed!(OrdersController, InvoicesController, AuditHandler);

    crate::register_controller!(OrdersController, InvoicesController, AuditHandler);

    #[tokio::test]
    async fn default_pattern_keeps_controller_suffix() {
        let metadata = Arc::new(MetadataStore::new());
        let loader = DiscoveringControllerLoader::new(Arc::clone(&metadata));

        let names: Vec<_> = loader
            .load_controllers()
            .await
            .unwrap()
            .iter()
            .map(ComponentType::short_name)
            .collect();
        assert_eq!(names, vec!["InvoicesController", "OrdersController"]);
    }

    #[tokio::test]
    async fn custom_pattern_selects_other_names() {
        let metadata = Arc::new(MetadataStore::new());
        let loader = DiscoveringControllerLoader::new(Arc::clone(&metadata))
            .with_pattern("Handler$")
            .unwrap();

        let found = loader.load_controllers().await.unwrap();
        assert_eq!(found, vec![ComponentType::of::<AuditHandler>()]);
    }

    #[tokio::test]
    async fn repeated_discovery_registers_once() {
        let metadata = Arc::new(MetadataStore::new());
        let loader = DiscoveringControllerLoader::new(Arc::clone(&metadata));
        loader.load_controllers().await.unwrap();
        loader.load_controllers().await.unwrap();

        let orders = ComponentType::of::<OrdersController>();
        assert!(metadata.is_registered(&orders));
        assert_eq!(metadata.controllers(&orders).len(), 1);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let loader = DiscoveringControllerLoader::new(Arc::new(MetadataStore::new()));
        assert!(loader.with_pattern("(").is_err());
    }
}
