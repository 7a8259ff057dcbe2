//! # Metadata store
//!
//! Definitions are attached to a target component type, optionally scoped to
//! one of its members (a method name). Every list keeps insertion order:
//! stacking two annotations of the same kind yields both, in the order they
//! were applied.
//!
//! Types declare their own metadata by implementing [`Annotated`]:
//!
//! ```rust,ignore
//! impl Annotated for OrdersController {
//!     fn annotate(a: &mut Annotator<'_>) {
//!         a.controller(ControllerDefinition::new())
//!             .method("created", |m| {
//!                 m.route(RouteDefinition::new(FilterType::of::<IfEventIs>()))
//!                     .param(ExtractorDefinition::new(0, ExtractorType::of::<EventData>()));
//!             });
//!     }
//! }
//!
//! let store = MetadataStore::new();
//! store.register::<OrdersController>();
//! ```

use crate::{
    component::Component,
    definition::{ControllerDefinition, ExtractorDefinition, MiddlewareDefinition, RouteDefinition},
    types::{ComponentType, Injectable},
};
use parking_lot::RwLock;
use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
    fmt,
};

/// The closed set of annotation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKind {
    /// [`ControllerDefinition`], class level only.
    Controller,
    /// [`RouteDefinition`], member level only.
    Route,
    /// [`MiddlewareDefinition`], class or member level.
    Middleware,
    /// [`ExtractorDefinition`], member level only.
    Extractor,
}

#[derive(Debug, Default, Clone)]
struct MemberMetadata {
    routes: Vec<RouteDefinition>,
    middleware: Vec<MiddlewareDefinition>,
    extractors: Vec<ExtractorDefinition>,
}

#[derive(Debug, Clone)]
struct TargetMetadata {
    ty: ComponentType,
    controllers: Vec<ControllerDefinition>,
    middleware: Vec<MiddlewareDefinition>,
    members: Vec<(String, MemberMetadata)>,
}

impl TargetMetadata {
    fn new(ty: ComponentType) -> Self {
        Self {
            ty,
            controllers: Vec::new(),
            middleware: Vec::new(),
            members: Vec::new(),
        }
    }

    fn member(&self, name: &str) -> Option<&MemberMetadata> {
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, metadata)| metadata)
    }

    fn member_mut(&mut self, name: &str) -> &mut MemberMetadata {
        let position = match self.members.iter().position(|(member, _)| member == name) {
            Some(position) => position,
            None => {
                self.members.push((name.to_owned(), MemberMetadata::default()));
                self.members.len() - 1
            }
        };
        &mut self.members[position].1
    }

    /// Append everything recorded in `other`, keeping its order.
    fn absorb(&mut self, other: TargetMetadata) {
        self.controllers.extend(other.controllers);
        self.middleware.extend(other.middleware);
        for (name, metadata) in other.members {
            let member = self.member_mut(&name);
            member.routes.extend(metadata.routes);
            member.middleware.extend(metadata.middleware);
            member.extractors.extend(metadata.extractors);
        }
    }
}

#[derive(Default)]
struct Targets {
    order: Vec<TargetMetadata>,
    index: HashMap<TypeId, usize>,
    registered: HashSet<TypeId>,
}

impl Targets {
    fn get(&self, id: TypeId) -> Option<&TargetMetadata> {
        self.index.get(&id).map(|&i| &self.order[i])
    }

    fn entry(&mut self, ty: ComponentType) -> &mut TargetMetadata {
        let i = match self.index.get(&ty.id()) {
            Some(&i) => i,
            None => {
                self.order.push(TargetMetadata::new(ty));
                let i = self.order.len() - 1;
                self.index.insert(ty.id(), i);
                i
            }
        };
        &mut self.order[i]
    }
}

/// Ordered definitions keyed by target type and optional member.
#[derive(Default)]
pub struct MetadataStore {
    targets: RwLock<Targets>,
}

impl MetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a type's own annotations and return its token.
    ///
    /// A type's own annotations are applied once per store; registering it
    /// again only returns the token.
    pub fn register<T>(&self) -> ComponentType
    where
        T: Annotated + Component + Injectable,
    {
        let ty = ComponentType::of::<T>();
        if self.targets.read().registered.contains(&ty.id()) {
            return ty;
        }

        let scratch = Self::record(ty, T::annotate);
        let mut targets = self.targets.write();
        if targets.registered.insert(ty.id()) {
            targets.entry(ty).absorb(scratch);
        }
        ty
    }

    /// Whether `ty` was registered through [`register`](Self::register).
    pub fn is_registered(&self, ty: &ComponentType) -> bool {
        self.targets.read().registered.contains(&ty.id())
    }

    /// Attach definitions to `ty`.
    ///
    /// Annotating the same target again appends to its existing lists. The
    /// closure runs without holding the store's lock, so it may query the
    /// store.
    pub fn annotate(&self, ty: ComponentType, f: impl FnOnce(&mut Annotator<'_>)) {
        let scratch = Self::record(ty, f);
        self.targets.write().entry(ty).absorb(scratch);
    }

    fn record(ty: ComponentType, f: impl FnOnce(&mut Annotator<'_>)) -> TargetMetadata {
        let mut scratch = TargetMetadata::new(ty);
        f(&mut Annotator {
            target: &mut scratch,
        });
        scratch
    }

    /// Whether any definition of `kind` is attached to `(target, property)`.
    pub fn has_metadata(&self, kind: MetadataKind, target: &ComponentType, property: Option<&str>) -> bool {
        let targets = self.targets.read();
        let Some(metadata) = targets.get(target.id()) else {
            return false;
        };
        match (kind, property) {
            (MetadataKind::Controller, None) => !metadata.controllers.is_empty(),
            (MetadataKind::Middleware, None) => !metadata.middleware.is_empty(),
            (MetadataKind::Route | MetadataKind::Extractor, None) => false,
            (MetadataKind::Controller, Some(_)) => false,
            (kind, Some(member)) => metadata.member(member).is_some_and(|m| match kind {
                MetadataKind::Route => !m.routes.is_empty(),
                MetadataKind::Middleware => !m.middleware.is_empty(),
                MetadataKind::Extractor => !m.extractors.is_empty(),
                MetadataKind::Controller => false,
            }),
        }
    }

    /// Controller definitions of `target`, in application order.
    pub fn controllers(&self, target: &ComponentType) -> Vec<ControllerDefinition> {
        self.read(target, |metadata| metadata.controllers.clone())
    }

    /// Route definitions of `target::member`, in application order.
    pub fn routes(&self, target: &ComponentType, member: &str) -> Vec<RouteDefinition> {
        self.read(target, |metadata| {
            metadata.member(member).map(|m| m.routes.clone()).unwrap_or_default()
        })
    }

    /// Middleware attached to `target` (when `member` is `None`) or to one of its members.
    pub fn middleware(&self, target: &ComponentType, member: Option<&str>) -> Vec<MiddlewareDefinition> {
        self.read(target, |metadata| match member {
            None => metadata.middleware.clone(),
            Some(member) => metadata
                .member(member)
                .map(|m| m.middleware.clone())
                .unwrap_or_default(),
        })
    }

    /// Extractor definitions of `target::member`, in application order.
    pub fn extractors(&self, target: &ComponentType, member: &str) -> Vec<ExtractorDefinition> {
        self.read(target, |metadata| {
            metadata
                .member(member)
                .map(|m| m.extractors.clone())
                .unwrap_or_default()
        })
    }

    /// Annotated members of `target`, in first-annotation order.
    pub fn members(&self, target: &ComponentType) -> Vec<String> {
        self.read(target, |metadata| {
            metadata.members.iter().map(|(name, _)| name.clone()).collect()
        })
    }

    /// Every annotated target, in registration order.
    pub fn targets(&self) -> Vec<ComponentType> {
        self.targets.read().order.iter().map(|metadata| metadata.ty).collect()
    }

    fn read<R: Default>(&self, target: &ComponentType, f: impl FnOnce(&TargetMetadata) -> R) -> R {
        self.targets.read().get(target.id()).map(f).unwrap_or_default()
    }
}

impl fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let targets = self.targets.read();
        f.debug_list()
            .entries(targets.order.iter().map(|metadata| metadata.ty))
            .finish()
    }
}

/// Class-level annotation handle.
pub struct Annotator<'a> {
    target: &'a mut TargetMetadata,
}

impl Annotator<'_> {
    /// The type being annotated.
    pub fn target(&self) -> ComponentType {
        self.target.ty
    }

    /// Mark the type as a controller.
    pub fn controller(&mut self, definition: ControllerDefinition) -> &mut Self {
        self.target.controllers.push(definition);
        self
    }

    /// Attach controller-wide middleware.
    pub fn middleware(&mut self, definition: MiddlewareDefinition) -> &mut Self {
        self.target.middleware.push(definition);
        self
    }

    /// Attach controller-wide middleware running before every route.
    pub fn before(&mut self, middleware_type: ComponentType, method: &'static str) -> &mut Self {
        self.middleware(MiddlewareDefinition::before(middleware_type, method))
    }

    /// Attach controller-wide middleware running after every route.
    pub fn after(&mut self, middleware_type: ComponentType, method: &'static str) -> &mut Self {
        self.middleware(MiddlewareDefinition::after(middleware_type, method))
    }

    /// Annotate one member.
    pub fn method(&mut self, name: &str, f: impl FnOnce(&mut MethodAnnotator<'_>)) -> &mut Self {
        let mut annotator = MethodAnnotator {
            member: self.target.member_mut(name),
        };
        f(&mut annotator);
        self
    }
}

/// Member-level annotation handle.
pub struct MethodAnnotator<'a> {
    member: &'a mut MemberMetadata,
}

impl MethodAnnotator<'_> {
    /// Attach a routing rule.
    pub fn route(&mut self, definition: RouteDefinition) -> &mut Self {
        self.member.routes.push(definition);
        self
    }

    /// Attach route-level middleware.
    pub fn middleware(&mut self, definition: MiddlewareDefinition) -> &mut Self {
        self.member.middleware.push(definition);
        self
    }

    /// Attach route-level middleware running before the handler.
    pub fn before(&mut self, middleware_type: ComponentType, method: &'static str) -> &mut Self {
        self.middleware(MiddlewareDefinition::before(middleware_type, method))
    }

    /// Attach route-level middleware running after the handler.
    pub fn after(&mut self, middleware_type: ComponentType, method: &'static str) -> &mut Self {
        self.middleware(MiddlewareDefinition::after(middleware_type, method))
    }

    /// Bind a parameter to an extractor.
    pub fn param(&mut self, definition: ExtractorDefinition) -> &mut Self {
        self.member.extractors.push(definition);
        self
    }
}

/// A type that declares its own metadata.
pub trait Annotated {
    /// Attach this type's definitions.
    fn annotate(a: &mut Annotator<'_>);
}
