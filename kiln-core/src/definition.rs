//! The metadata model.
//!
//! Plain records produced by annotating components. They carry no behavior;
//! the pipeline compiler reads them to assemble pipeline documents.

use crate::{
    config::Configuration,
    extractor::DynExtractor,
    filter::DynFilter,
    types::{ComponentType, ExtractorType, FilterType, TypeRef},
};
use std::{borrow::Cow, fmt};

/// Priority used by [`MiddlewareDefinition::before`].
pub const BEFORE_PRIORITY: i32 = -1;
/// Priority used by [`MiddlewareDefinition::after`].
pub const AFTER_PRIORITY: i32 = 1;

/// Marks a component as a controller. A type may carry several.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerDefinition {
    /// Whether the route handlers share one controller instance.
    pub singleton: bool,
    /// Controller-wide filter placed first in every filter stack.
    pub filter: Option<FilterType>,
    /// Configuration for the controller-wide filter.
    pub configuration: Configuration,
}

impl ControllerDefinition {
    /// A per-call controller without a filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lifecycle.
    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    /// Set the controller-wide filter.
    pub fn filter(mut self, filter: FilterType) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Set the filter configuration.
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }
}

/// A routing rule attached to a method. A method may carry several.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteDefinition {
    /// The routing filter.
    pub filter: Option<FilterType>,
    /// Filter configuration; `contextName` defaults to the method name.
    pub configuration: Configuration,
}

impl RouteDefinition {
    /// A route guarded by `filter`.
    pub fn new(filter: FilterType) -> Self {
        Self {
            filter: Some(filter),
            configuration: Configuration::new(),
        }
    }

    /// A route without a filter type.
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// Set the filter configuration.
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }
}

/// Middleware attached to a whole controller or to one method.
///
/// `priority <= 0` runs before the route handler, `priority > 0` after it.
#[derive(Debug, Clone, PartialEq)]
pub struct MiddlewareDefinition {
    /// Component backing the middleware.
    pub middleware_type: ComponentType,
    /// Method invoked on the middleware instance.
    pub method: Cow<'static, str>,
    /// Whether activations share one middleware instance.
    pub singleton: bool,
    /// Phase selector.
    pub priority: i32,
    /// Configuration merged onto the middleware instance.
    pub config: Configuration,
}

impl MiddlewareDefinition {
    /// Middleware with priority `0` (before phase).
    pub fn new(middleware_type: ComponentType, method: impl Into<Cow<'static, str>>) -> Self {
        Self {
            middleware_type,
            method: method.into(),
            singleton: false,
            priority: 0,
            config: Configuration::new(),
        }
    }

    /// Middleware running before the route handler.
    pub fn before(middleware_type: ComponentType, method: impl Into<Cow<'static, str>>) -> Self {
        Self::new(middleware_type, method).priority(BEFORE_PRIORITY)
    }

    /// Middleware running after the route handler.
    pub fn after(middleware_type: ComponentType, method: impl Into<Cow<'static, str>>) -> Self {
        Self::new(middleware_type, method).priority(AFTER_PRIORITY)
    }

    /// Set the lifecycle.
    pub fn singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    /// Set the priority.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: Configuration) -> Self {
        self.config = config;
        self
    }

    /// Whether this middleware belongs to the before phase.
    pub fn is_before(&self) -> bool {
        self.priority <= 0
    }
}

/// Binds one parameter of a method to an extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorDefinition {
    /// Zero-based parameter index.
    pub index: usize,
    /// The extractor; absent means nothing to extract.
    pub extractor_type: Option<ExtractorType>,
    /// Extractor configuration; `contextName` defaults to the parameter name.
    pub configuration: Configuration,
}

impl ExtractorDefinition {
    /// Bind parameter `index` to `extractor_type`.
    pub fn new(index: usize, extractor_type: ExtractorType) -> Self {
        Self {
            index,
            extractor_type: Some(extractor_type),
            configuration: Configuration::new(),
        }
    }

    /// A parameter marker without an extractor.
    pub fn untyped(index: usize) -> Self {
        Self {
            index,
            extractor_type: None,
            configuration: Configuration::new(),
        }
    }

    /// Set the configuration.
    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }
}

/// A type plus the configuration to merge onto its instance.
pub struct Recipe<K: ?Sized> {
    /// Target type; a recipe without one cannot be crafted.
    pub ty: Option<TypeRef<K>>,
    /// Configuration merged onto the instance.
    pub configuration: Configuration,
}

/// Recipe for a filter.
pub type FilterRecipe = Recipe<dyn DynFilter>;
/// Recipe for an extractor.
pub type ExtractorRecipe = Recipe<dyn DynExtractor>;

impl<K: ?Sized> Recipe<K> {
    /// Create a recipe.
    pub fn new(ty: Option<TypeRef<K>>, configuration: Configuration) -> Self {
        Self { ty, configuration }
    }
}

impl<K: ?Sized> Clone for Recipe<K> {
    fn clone(&self) -> Self {
        Self {
            ty: self.ty,
            configuration: self.configuration.clone(),
        }
    }
}

impl<K: ?Sized> PartialEq for Recipe<K> {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.configuration == other.configuration
    }
}

impl<K: ?Sized> fmt::Debug for Recipe<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recipe")
            .field("ty", &self.ty)
            .field("configuration", &self.configuration)
            .finish()
    }
}

/// A single entry or an ordered composition of entries.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    /// One entry.
    One(T),
    /// Several entries, in declaration order.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item).iter(),
            OneOrMany::Many(items) => items.iter(),
        }
    }

    /// Append an entry, turning `One` into `Many`.
    pub fn push(&mut self, item: T) {
        match self {
            OneOrMany::Many(items) => items.push(item),
            OneOrMany::One(_) => {
                let OneOrMany::One(first) = std::mem::replace(self, OneOrMany::Many(Vec::new())) else {
                    unreachable!("checked above");
                };
                *self = OneOrMany::Many(vec![first, item]);
            }
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(items) => items.len(),
        }
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middleware_phase_follows_priority_sign() {
        assert!(MiddlewareDefinition::new(widget(), "m").is_before());
        assert!(MiddlewareDefinition::new(widget(), "m").priority(-20).is_before());
        assert!(!MiddlewareDefinition::new(widget(), "m").priority(3).is_before());
        assert_eq!(MiddlewareDefinition::after(widget(), "m").priority, AFTER_PRIORITY);
    }

    #[test]
    fn one_or_many_grows_in_order() {
        let mut slot = OneOrMany::One(1);
        slot.push(2);
        slot.push(3);
        assert_eq!(slot, OneOrMany::Many(vec![1, 2, 3]));
        assert_eq!(slot.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    fn widget() -> ComponentType {
        crate::testing::Widget::component_type()
    }
}
