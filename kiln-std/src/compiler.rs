//! # Pipeline compiler
//!
//! Walks the metadata attached to each candidate controller and emits one
//! [`PipelineDocument`] per routable method and controller definition.
//!
//! Middleware order is a stable partition, not a sort: within each phase,
//! declaration order is kept whatever the priorities are.
//!
//! ```text
//! [controller before] [route before] handler [route after] [controller after]
//! ```

use crate::{
    activation::ActivationUnit,
    document::{MiddlewareDocument, PipelineDocument},
    factory::RecipeFactory,
    options::CompilerOptions,
};
use kiln_core::{
    ComponentType, Configuration, ControllerDefinition, ExtractorRecipe, FilterRecipe,
    MetadataKind, MetadataStore, OneOrMany, Recipe,
};
use std::{
    collections::{BTreeMap, btree_map::Entry},
    sync::Arc,
};

/// Compiles annotated controllers into pipeline documents.
///
/// Compilation is a pure transform over the metadata store: running it twice
/// over the same candidates yields structurally equal documents with fresh
/// activation units.
#[derive(Debug)]
pub struct PipelineCompiler {
    metadata: Arc<MetadataStore>,
    factory: Arc<RecipeFactory>,
    options: CompilerOptions,
}

impl PipelineCompiler {
    /// Create a compiler with default options.
    pub fn new(metadata: Arc<MetadataStore>, factory: Arc<RecipeFactory>) -> Self {
        Self::with_options(metadata, factory, CompilerOptions::default())
    }

    /// Create a compiler with explicit options.
    pub fn with_options(
        metadata: Arc<MetadataStore>,
        factory: Arc<RecipeFactory>,
        options: CompilerOptions,
    ) -> Self {
        Self {
            metadata,
            factory,
            options,
        }
    }

    /// The options in use.
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile every candidate carrying a controller definition.
    ///
    /// Candidates without one are skipped, as are members without a route.
    pub fn compile(&self, candidates: &[ComponentType]) -> Vec<PipelineDocument> {
        let mut documents = Vec::new();

        for target in candidates {
            if !self.metadata.has_metadata(MetadataKind::Controller, target, None) {
                tracing::trace!(
                    candidate = target.name(),
                    "skipping candidate without controller definition"
                );
                continue;
            }

            let routes = self.routable_members(target);
            for controller in self.metadata.controllers(target) {
                for route in &routes {
                    let document = self.compile_route(target, route, &controller);
                    tracing::debug!(
                        controller = %target,
                        route = %route,
                        middleware = document.middleware_stack.len(),
                        filters = document.filter_stack.len(),
                        "compiled pipeline"
                    );
                    documents.push(document);
                }
            }
        }

        tracing::info!(documents = documents.len(), "compiled pipeline documents");
        documents
    }

    /// Members of `target` carrying at least one route, in declaration order.
    ///
    /// Declaration order comes from the component's method table; members it
    /// does not list follow in annotation order.
    fn routable_members(&self, target: &ComponentType) -> Vec<String> {
        let methods = target.methods();
        let mut members: Vec<String> = self
            .metadata
            .members(target)
            .into_iter()
            .filter(|member| {
                self.metadata
                    .has_metadata(MetadataKind::Route, target, Some(member.as_str()))
            })
            .collect();
        members.sort_by_key(|member| {
            methods
                .iter()
                .position(|sig| sig.name == member.as_str())
                .unwrap_or(usize::MAX)
        });
        members
    }

    fn compile_route(
        &self,
        target: &ComponentType,
        route: &str,
        controller: &ControllerDefinition,
    ) -> PipelineDocument {
        let (controller_before, controller_after) = self.middleware_documents(target, None);
        let (route_before, route_after) = self.middleware_documents(target, Some(route));

        let handler = MiddlewareDocument {
            activation: ActivationUnit::build(
                *target,
                Configuration::new(),
                route,
                controller.singleton,
                Arc::clone(&self.factory),
            ),
            extractor_recipes: self.extractor_recipes(target, route),
            priority: None,
        };

        let mut middleware_stack = controller_before;
        middleware_stack.extend(route_before);
        middleware_stack.push(handler);
        middleware_stack.extend(route_after);
        middleware_stack.extend(controller_after);

        PipelineDocument {
            middleware_stack,
            filter_stack: self.filter_stack(target, route, controller),
        }
    }

    /// Before and after documents for `target` or one of its members.
    fn middleware_documents(
        &self,
        target: &ComponentType,
        member: Option<&str>,
    ) -> (Vec<MiddlewareDocument>, Vec<MiddlewareDocument>) {
        self.metadata
            .middleware(target, member)
            .into_iter()
            .map(|definition| {
                let is_before = definition.is_before();
                let document = MiddlewareDocument {
                    extractor_recipes: self
                        .extractor_recipes(&definition.middleware_type, &definition.method),
                    activation: ActivationUnit::build(
                        definition.middleware_type,
                        definition.config,
                        definition.method.into_owned(),
                        definition.singleton,
                        Arc::clone(&self.factory),
                    ),
                    priority: Some(definition.priority),
                };
                (is_before, document)
            })
            .fold((Vec::new(), Vec::new()), |(mut before, mut after), (is_before, document)| {
                if is_before {
                    before.push(document);
                } else {
                    after.push(document);
                }
                (before, after)
            })
    }

    fn filter_stack(
        &self,
        target: &ComponentType,
        route: &str,
        controller: &ControllerDefinition,
    ) -> Vec<OneOrMany<FilterRecipe>> {
        let mut stack = Vec::new();

        if let Some(filter) = controller.filter {
            let configuration =
                self.default_context_name(controller.configuration.clone(), || {
                    self.controller_context_name(target).to_owned()
                });
            stack.push(OneOrMany::One(Recipe::new(Some(filter), configuration)));
        }

        for definition in self.metadata.routes(target, route) {
            let configuration =
                self.default_context_name(definition.configuration, || route.to_owned());
            stack.push(OneOrMany::One(Recipe::new(definition.filter, configuration)));
        }

        stack
    }

    /// Extractor recipes for `target::method`, keyed by parameter index.
    ///
    /// Several definitions on one index compose in declaration order.
    fn extractor_recipes(
        &self,
        target: &ComponentType,
        method: &str,
    ) -> BTreeMap<usize, OneOrMany<ExtractorRecipe>> {
        let signature = target.signature(method);
        let mut recipes: BTreeMap<usize, OneOrMany<ExtractorRecipe>> = BTreeMap::new();

        for definition in self.metadata.extractors(target, method) {
            let param_name = signature.and_then(|sig| sig.param_name(definition.index));
            let configuration = match (definition.extractor_type, param_name) {
                (Some(_), Some(name)) => {
                    self.default_context_name(definition.configuration, || name.to_owned())
                }
                _ => definition.configuration,
            };
            let recipe = Recipe::new(definition.extractor_type, configuration);

            match recipes.entry(definition.index) {
                Entry::Vacant(slot) => {
                    slot.insert(OneOrMany::One(recipe));
                }
                Entry::Occupied(mut slot) => slot.get_mut().push(recipe),
            }
        }

        recipes
    }

    fn default_context_name(
        &self,
        configuration: Configuration,
        name: impl FnOnce() -> String,
    ) -> Configuration {
        if self.options.derive_context_names {
            configuration.with_default_context_name(name())
        } else {
            configuration
        }
    }

    /// The controller's short type name without the configured suffix.
    fn controller_context_name<'a>(&self, target: &'a ComponentType) -> &'a str {
        let name = target.short_name();
        match name.strip_suffix(self.options.controller_suffix.as_str()) {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => name,
        }
    }
}
