//! Type tokens.
//!
//! A [`TypeRef`] identifies a concrete type by [`TypeId`] and knows how to
//! construct it through the container, already viewed as the trait object
//! `K` the caller needs. Identity never depends on the type's name, so two
//! distinct types sharing a name never alias.

use crate::{
    component::{Component, MethodSignature},
    container::Resolver,
    error::ResolutionError,
    extractor::{DynExtractor, Extractor},
    filter::{DynFilter, Filter},
};
use std::{
    any::{TypeId, type_name},
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// How the container constructs a type.
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Build an instance, resolving dependencies through `resolver`.
    fn inject(resolver: &mut Resolver<'_>) -> Result<Self, ResolutionError>;
}

/// Implement [`Injectable`] for types constructed with [`Default`].
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct EventData;
///
/// kiln::injectable_default!(EventData);
/// ```
#[macro_export]
macro_rules! injectable_default {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Injectable for $ty {
                fn inject(
                    _resolver: &mut $crate::Resolver<'_>,
                ) -> ::core::result::Result<Self, $crate::ResolutionError> {
                    ::core::result::Result::Ok(<$ty as ::core::default::Default>::default())
                }
            }
        )+
    };
}

type Construct<K> = fn(&mut Resolver<'_>) -> Result<Arc<K>, ResolutionError>;

/// A per-type token viewed as the trait object `K`.
pub struct TypeRef<K: ?Sized> {
    id: TypeId,
    name: &'static str,
    construct: Construct<K>,
    signatures: fn() -> &'static [MethodSignature],
}

/// Token for controllers and middleware.
pub type ComponentType = TypeRef<dyn Component>;
/// Token for filters.
pub type FilterType = TypeRef<dyn DynFilter>;
/// Token for extractors.
pub type ExtractorType = TypeRef<dyn DynExtractor>;

impl<K: ?Sized> TypeRef<K> {
    /// The identity of the concrete type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The full type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The last path segment of the type name, without generic arguments.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Methods declared by the type, in declaration order.
    pub fn methods(&self) -> &'static [MethodSignature] {
        (self.signatures)()
    }

    /// The signature of one method, when declared.
    pub fn signature(&self, method: &str) -> Option<&'static MethodSignature> {
        self.methods().iter().find(|sig| sig.name == method)
    }

    /// Construct an instance through `resolver`.
    pub fn construct(&self, resolver: &mut Resolver<'_>) -> Result<Arc<K>, ResolutionError> {
        (self.construct)(resolver)
    }
}

impl TypeRef<dyn Component> {
    /// Token for a component type.
    pub fn of<T: Component + Injectable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            construct: construct_component::<T>,
            signatures: <T as Component>::signatures,
        }
    }
}

impl TypeRef<dyn DynFilter> {
    /// Token for a filter type.
    pub fn of<T: Filter + Injectable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            construct: construct_filter::<T>,
            signatures: no_signatures,
        }
    }
}

impl TypeRef<dyn DynExtractor> {
    /// Token for an extractor type.
    pub fn of<T: Extractor + Injectable>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            construct: construct_extractor::<T>,
            signatures: no_signatures,
        }
    }
}

fn construct_component<T: Component + Injectable>(
    resolver: &mut Resolver<'_>,
) -> Result<Arc<dyn Component>, ResolutionError> {
    Ok(Arc::new(T::inject(resolver)?))
}

fn construct_filter<T: Filter + Injectable>(
    resolver: &mut Resolver<'_>,
) -> Result<Arc<dyn DynFilter>, ResolutionError> {
    Ok(Arc::new(T::inject(resolver)?))
}

fn construct_extractor<T: Extractor + Injectable>(
    resolver: &mut Resolver<'_>,
) -> Result<Arc<dyn DynExtractor>, ResolutionError> {
    Ok(Arc::new(T::inject(resolver)?))
}

fn no_signatures() -> &'static [MethodSignature] {
    &[]
}

impl<K: ?Sized> Clone for TypeRef<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: ?Sized> Copy for TypeRef<K> {}

impl<K: ?Sized> PartialEq for TypeRef<K> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<K: ?Sized> Eq for TypeRef<K> {}

impl<K: ?Sized> Hash for TypeRef<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<K: ?Sized> fmt::Debug for TypeRef<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.name).finish()
    }
}

impl<K: ?Sized> fmt::Display for TypeRef<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Configurable, error::InvokeError, component::Arguments};
    use futures::future::BoxFuture;
    use serde_json::Value;

    mod first {
        #[derive(Default)]
        pub struct Twin;
    }

    mod second {
        #[derive(Default)]
        pub struct Twin;
    }

    macro_rules! noop_component {
        ($ty:ty) => {
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
        };
    }

    noop_component!(first::Twin);
    noop_component!(second::Twin);
    crate::injectable_default!(first::Twin, second::Twin);

    #[test]
    fn same_short_name_distinct_identity() {
        let a = ComponentType::of::<first::Twin>();
        let b = ComponentType::of::<second::Twin>();
        assert_eq!(a.short_name(), "Twin");
        assert_eq!(b.short_name(), "Twin");
        assert_ne!(a, b);
        assert_eq!(a, ComponentType::of::<first::Twin>());
    }

    #[test]
    fn short_name_strips_generics() {
        struct Wrapper<T>(T);
        let name = type_name::<Wrapper<String>>();
        let token = TypeRef::<dyn Component> {
            id: TypeId::of::<Wrapper<String>>(),
            name,
            construct: construct_component::<first::Twin>,
            signatures: no_signatures,
        };
        assert_eq!(token.short_name(), "Wrapper");
    }
}
