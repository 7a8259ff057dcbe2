//! Pipeline documents: the compiled, per-route execution plan.

use crate::activation::ActivationUnit;
use kiln_core::{ExtractorRecipe, FilterRecipe, OneOrMany};
use std::collections::BTreeMap;

/// One step of a middleware stack.
#[derive(Debug, PartialEq)]
pub struct MiddlewareDocument {
    /// What to invoke.
    pub activation: ActivationUnit,
    /// Extractor recipes by parameter index. Absent indexes receive nothing.
    pub extractor_recipes: BTreeMap<usize, OneOrMany<ExtractorRecipe>>,
    /// Declared priority. `None` for the route handler itself.
    pub priority: Option<i32>,
}

impl MiddlewareDocument {
    /// Number of argument slots needed to cover every extractor index.
    pub fn arity(&self) -> usize {
        self.extractor_recipes
            .keys()
            .next_back()
            .map_or(0, |index| index + 1)
    }
}

/// The compiled plan for one routable method.
#[derive(Debug, PartialEq)]
pub struct PipelineDocument {
    /// Steps in execution order: controller before, route before, handler,
    /// route after, controller after.
    pub middleware_stack: Vec<MiddlewareDocument>,
    /// Filters in evaluation order.
    pub filter_stack: Vec<OneOrMany<FilterRecipe>>,
}

impl PipelineDocument {
    /// The route handler step.
    pub fn handler(&self) -> Option<&MiddlewareDocument> {
        self.middleware_stack.iter().find(|doc| doc.priority.is_none())
    }
}
