//! Dependency-injection container.
//!
//! The container keeps one binding per key. A key is the pair of the
//! concrete type's identity and the view it is resolved as, so the same type
//! bound as a component and as a filter yields two independent bindings.
//!
//! Binding is first-registration-wins: binding an already bound key is a
//! no-op and reports `false`, so concurrent or repeated registration never
//! creates two live bindings.

use crate::{
    error::ResolutionError,
    types::{Injectable, TypeRef},
};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::Arc,
};

type Erased = Arc<dyn Any + Send + Sync>;
type Provider = Arc<dyn Fn(&mut Resolver<'_>) -> Result<Erased, ResolutionError> + Send + Sync>;

/// Lifecycle of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A new instance per resolution.
    Transient,
    /// One instance per container.
    Shared,
}

impl Scope {
    /// `Shared` when `shared` is true, `Transient` otherwise.
    pub fn from_shared(shared: bool) -> Self {
        if shared { Scope::Shared } else { Scope::Transient }
    }
}

/// Identity of a binding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingKey {
    type_id: TypeId,
    view: TypeId,
    name: &'static str,
}

impl BindingKey {
    /// Key for a type token resolved as `Arc<K>`.
    pub fn of<K: ?Sized + 'static>(ty: &TypeRef<K>) -> Self {
        Self {
            type_id: ty.id(),
            view: TypeId::of::<Arc<K>>(),
            name: ty.name(),
        }
    }

    /// Key for a concrete type resolved as `Arc<T>`.
    pub fn concrete<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            view: TypeId::of::<Arc<T>>(),
            name: type_name::<T>(),
        }
    }

    /// Name of the bound type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BindingKey").field(&self.name).finish()
    }
}

struct Binding {
    scope: Scope,
    provider: Provider,
    shared: OnceCell<Erased>,
}

/// The binding table.
#[derive(Default)]
pub struct Container {
    bindings: RwLock<HashMap<BindingKey, Arc<Binding>>>,
}

impl Container {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a binding exists for `key`.
    pub fn is_bound(&self, key: &BindingKey) -> bool {
        self.bindings.read().contains_key(key)
    }

    /// The scope of the binding for `key`, if bound.
    pub fn scope_of(&self, key: &BindingKey) -> Option<Scope> {
        self.bindings.read().get(key).map(|binding| binding.scope)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    /// Whether the container has no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    /// Bind a type token. Returns `false` when the key was already bound.
    pub fn bind<K>(&self, ty: &TypeRef<K>, scope: Scope) -> bool
    where
        K: ?Sized + Send + Sync + 'static,
    {
        let token = *ty;
        self.insert(
            BindingKey::of(ty),
            scope,
            Arc::new(move |resolver: &mut Resolver<'_>| {
                token
                    .construct(resolver)
                    .map(|instance| Arc::new(instance) as Erased)
            }),
        )
    }

    /// Bind a concrete injectable dependency. Returns `false` when already bound.
    pub fn bind_injectable<T: Injectable>(&self, scope: Scope) -> bool {
        self.insert(
            BindingKey::concrete::<T>(),
            scope,
            Arc::new(|resolver: &mut Resolver<'_>| {
                T::inject(resolver).map(|value| Arc::new(Arc::new(value)) as Erased)
            }),
        )
    }

    /// Bind a constant value. Returns `false` when already bound.
    pub fn bind_value<T: Send + Sync + 'static>(&self, value: T) -> bool {
        let key = BindingKey::concrete::<T>();
        let mut bindings = self.bindings.write();
        if bindings.contains_key(&key) {
            return false;
        }
        let erased: Erased = Arc::new(Arc::new(value));
        let binding = Binding {
            scope: Scope::Shared,
            provider: Arc::new(move |_: &mut Resolver<'_>| {
                Err(ResolutionError::Unbound { type_name: key.name })
            }),
            shared: OnceCell::with_value(erased),
        };
        bindings.insert(key, Arc::new(binding));
        true
    }

    /// Resolve a type token that has been bound.
    pub fn resolve<K>(&self, ty: &TypeRef<K>) -> Result<Arc<K>, ResolutionError>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        Resolver::new(self).resolve(ty)
    }

    /// Resolve a bound concrete dependency.
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolutionError> {
        Resolver::new(self).get()
    }

    fn insert(&self, key: BindingKey, scope: Scope, provider: Provider) -> bool {
        let mut bindings = self.bindings.write();
        if bindings.contains_key(&key) {
            return false;
        }
        bindings.insert(
            key,
            Arc::new(Binding {
                scope,
                provider,
                shared: OnceCell::new(),
            }),
        );
        true
    }

    fn binding(&self, key: &BindingKey) -> Option<Arc<Binding>> {
        self.bindings.read().get(key).cloned()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.bindings.read();
        f.debug_map()
            .entries(bindings.iter().map(|(key, binding)| (key.name, binding.scope)))
            .finish()
    }
}

/// A single resolution in progress.
///
/// Tracks the resolution path so that cycles surface as
/// [`ResolutionError::Circular`] instead of recursing.
pub struct Resolver<'c> {
    container: &'c Container,
    path: Vec<BindingKey>,
}

impl<'c> Resolver<'c> {
    /// Start a resolution against `container`.
    pub fn new(container: &'c Container) -> Self {
        Self {
            container,
            path: Vec::new(),
        }
    }

    /// The container being resolved against.
    pub fn container(&self) -> &'c Container {
        self.container
    }

    /// Resolve a bound type token.
    pub fn resolve<K>(&mut self, ty: &TypeRef<K>) -> Result<Arc<K>, ResolutionError>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        let key = BindingKey::of(ty);
        let erased = self.resolve_key(key)?;
        erased
            .downcast_ref::<Arc<K>>()
            .cloned()
            .ok_or(ResolutionError::TypeMismatch { type_name: key.name })
    }

    /// Resolve a bound concrete dependency.
    pub fn get<T: Send + Sync + 'static>(&mut self) -> Result<Arc<T>, ResolutionError> {
        let key = BindingKey::concrete::<T>();
        let erased = self.resolve_key(key)?;
        erased
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(ResolutionError::TypeMismatch { type_name: key.name })
    }

    fn resolve_key(&mut self, key: BindingKey) -> Result<Erased, ResolutionError> {
        if self.path.contains(&key) {
            let mut path: Vec<_> = self.path.iter().map(BindingKey::name).collect();
            path.push(key.name);
            return Err(ResolutionError::Circular { path });
        }

        let binding = self
            .container
            .binding(&key)
            .ok_or(ResolutionError::Unbound { type_name: key.name })?;

        self.path.push(key);
        let result = match binding.scope {
            Scope::Transient => (binding.provider)(self),
            Scope::Shared => binding
                .shared
                .get_or_try_init(|| (binding.provider)(self))
                .cloned(),
        };
        self.path.pop();
        result
    }
}
