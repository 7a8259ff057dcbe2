//! # Reference dispatch engine
//!
//! Runs compiled [`PipelineDocument`]s against events. Filter and extractor
//! recipes are instantiated once, when the dispatcher is built, each with
//! its own instance so recipes with different configuration never share
//! state.
//!
//! For each event, every document whose filter stack matches runs its
//! middleware stack in order. Every run gets its own [`ContextMap`], shared
//! by all of its steps. Failures are returned as they occur; nothing is
//! retried.
//!
//! A deadline set in the context is checked after every step. With the
//! `timeout` feature, a step still running when the deadline passes is
//! cancelled.

use crate::{
    document::{MiddlewareDocument, PipelineDocument},
    error::{DispatchError, TimeoutError},
    factory::RecipeFactory,
};
use kiln_core::{
    ActivationError, Arguments, ContextMap, DynExtractor, DynFilter, Event, FactoryError,
    OneOrMany, Recipe,
};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, sync::Arc};

/// The values returned by one pipeline, in middleware stack order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// One value per middleware stack entry.
    pub response_stack: Vec<Value>,
    /// The run's context values once the last step finished.
    pub context: Map<String, Value>,
}

struct Step {
    document: MiddlewareDocument,
    extractors: BTreeMap<usize, OneOrMany<Arc<dyn DynExtractor>>>,
}

struct Pipeline {
    filters: Vec<OneOrMany<Arc<dyn DynFilter>>>,
    steps: Vec<Step>,
}

/// Routes events through compiled pipelines.
pub struct PipelineDispatcher {
    pipelines: Vec<Pipeline>,
}

impl PipelineDispatcher {
    /// Instantiate every filter and extractor recipe of `documents`.
    ///
    /// # Errors
    ///
    /// Fails when a recipe has no type or cannot be resolved.
    pub fn new(
        documents: Vec<PipelineDocument>,
        factory: &RecipeFactory,
    ) -> Result<Self, DispatchError> {
        let pipelines = documents
            .into_iter()
            .map(|document| {
                let filters = document
                    .filter_stack
                    .iter()
                    .map(|entry| instantiate(factory, entry))
                    .collect::<Result<Vec<_>, _>>()?;
                let steps = document
                    .middleware_stack
                    .into_iter()
                    .map(|document| {
                        let extractors = document
                            .extractor_recipes
                            .iter()
                            .map(|(index, entry)| Ok((*index, instantiate(factory, entry)?)))
                            .collect::<Result<BTreeMap<_, _>, FactoryError>>()?;
                        Ok(Step {
                            document,
                            extractors,
                        })
                    })
                    .collect::<Result<Vec<_>, FactoryError>>()?;
                Ok(Pipeline { filters, steps })
            })
            .collect::<Result<Vec<_>, FactoryError>>()?;

        tracing::debug!(pipelines = pipelines.len(), "dispatcher ready");
        Ok(Self { pipelines })
    }

    /// Number of pipelines.
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Whether there are no pipelines.
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Run every matching pipeline against `event`.
    pub async fn dispatch(&self, event: &Event) -> Result<Vec<DispatchOutcome>, DispatchError> {
        let mut outcomes = Vec::new();
        for pipeline in &self.pipelines {
            if !pipeline.matches(event).await? {
                continue;
            }
            outcomes.push(pipeline.run(event).await?);
        }
        tracing::trace!(
            event_type = %event.event_type,
            matched = outcomes.len(),
            "dispatched event"
        );
        Ok(outcomes)
    }
}

impl Pipeline {
    /// Every entry must match; a composed entry matches when any member does.
    async fn matches(&self, event: &Event) -> Result<bool, DispatchError> {
        for entry in &self.filters {
            let mut matched = false;
            for filter in entry.iter() {
                if filter.matches_dyn(event).await.map_err(DispatchError::Filter)? {
                    matched = true;
                    break;
                }
            }
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn run(&self, event: &Event) -> Result<DispatchOutcome, DispatchError> {
        let context = ContextMap::new();
        let mut response_stack = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let args = step.arguments(event, &context).await?;
            let output = within_deadline(&context, step.document.activation.activate(args)).await?;
            response_stack.push(output);
            if let Some(deadline) = context.deadline().filter(|deadline| deadline.is_expired()) {
                return Err(TimeoutError {
                    budget: deadline.budget,
                }
                .into());
            }
        }
        Ok(DispatchOutcome {
            response_stack,
            context: context.snapshot(),
        })
    }
}

/// Await one step, bounded by the context's deadline when one is set.
#[cfg(feature = "timeout")]
async fn within_deadline(
    context: &ContextMap,
    step: impl Future<Output = Result<Value, ActivationError>>,
) -> Result<Value, DispatchError> {
    match context.deadline() {
        Some(deadline) => match tokio::time::timeout(deadline.remaining(), step).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(TimeoutError {
                budget: deadline.budget,
            }
            .into()),
        },
        None => Ok(step.await?),
    }
}

#[cfg(not(feature = "timeout"))]
async fn within_deadline(
    _context: &ContextMap,
    step: impl Future<Output = Result<Value, ActivationError>>,
) -> Result<Value, DispatchError> {
    Ok(step.await?)
}

impl Step {
    async fn arguments(&self, event: &Event, context: &ContextMap) -> Result<Arguments, DispatchError> {
        let mut args = Arguments::new().with_context(context.clone());
        for index in 0..self.document.arity() {
            let value = match self.extractors.get(&index) {
                None => None,
                Some(OneOrMany::One(extractor)) => Some(extract(extractor, event, index).await?),
                Some(OneOrMany::Many(extractors)) => {
                    let mut values = Vec::with_capacity(extractors.len());
                    for extractor in extractors {
                        values.push(extract(extractor, event, index).await?);
                    }
                    Some(Value::Array(values))
                }
            };
            args.push(value);
        }
        Ok(args)
    }
}

async fn extract(
    extractor: &Arc<dyn DynExtractor>,
    event: &Event,
    index: usize,
) -> Result<Value, DispatchError> {
    extractor
        .extract_dyn(event)
        .await
        .map_err(|source| DispatchError::Extraction { index, source })
}

fn instantiate<K>(
    factory: &RecipeFactory,
    entry: &OneOrMany<Recipe<K>>,
) -> Result<OneOrMany<Arc<K>>, FactoryError>
where
    K: ?Sized + kiln_core::Configurable,
{
    Ok(match entry {
        OneOrMany::One(recipe) => OneOrMany::One(factory.create(recipe, false)?),
        OneOrMany::Many(recipes) => OneOrMany::Many(
            recipes
                .iter()
                .map(|recipe| factory.create(recipe, false))
                .collect::<Result<_, _>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        activation::ActivationUnit,
        extractors::{Constant, EventData},
        filters::{AnyEvent, IfEventIs},
        testing::{Counter, NeverMatch},
    };
    use kiln_core::{ComponentType, Configuration, ExtractorType, FilterType};
    use serde_json::json;
    use std::time::Duration;

    fn filter<F>(configuration: Configuration) -> OneOrMany<kiln_core::FilterRecipe>
    where
        F: kiln_core::Filter + kiln_core::Injectable,
    {
        OneOrMany::One(Recipe::new(Some(FilterType::of::<F>()), configuration))
    }

    fn counter_step(factory: &Arc<RecipeFactory>) -> MiddlewareDocument {
        MiddlewareDocument {
            activation: ActivationUnit::build(
                ComponentType::of::<Counter>(),
                Configuration::new(),
                "count",
                true,
                Arc::clone(factory),
            ),
            extractor_recipes: BTreeMap::new(),
            priority: None,
        }
    }

    #[tokio::test]
    async fn only_matching_pipelines_run() {
        let factory = Arc::new(RecipeFactory::default());
        let documents = vec![
            PipelineDocument {
                middleware_stack: vec![counter_step(&factory)],
                filter_stack: vec![filter::<IfEventIs>(
                    Configuration::new().with(IfEventIs::EVENT_TYPE, "basic"),
                )],
            },
            PipelineDocument {
                middleware_stack: vec![counter_step(&factory)],
                filter_stack: vec![
                    filter::<AnyEvent>(Configuration::new()),
                    filter::<NeverMatch>(Configuration::new()),
                ],
            },
        ];
        let dispatcher = PipelineDispatcher::new(documents, &factory).unwrap();

        let outcomes = dispatcher.dispatch(&Event::new("basic", Value::Null)).await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].response_stack, vec![json!(1)]);
        assert!(dispatcher.dispatch(&Event::new("other", Value::Null)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn composed_filter_entry_matches_any_member() {
        let factory = Arc::new(RecipeFactory::default());
        let composed = OneOrMany::Many(vec![
            Recipe::new(Some(FilterType::of::<NeverMatch>()), Configuration::new()),
            Recipe::new(
                Some(FilterType::of::<IfEventIs>()),
                Configuration::new().with(IfEventIs::EVENT_TYPE, "basic"),
            ),
        ]);
        let documents = vec![PipelineDocument {
            middleware_stack: vec![counter_step(&factory)],
            filter_stack: vec![composed],
        }];
        let dispatcher = PipelineDispatcher::new(documents, &factory).unwrap();
        assert_eq!(dispatcher.dispatch(&Event::new("basic", Value::Null)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn arguments_follow_extractor_indexes() {
        let factory = Arc::new(RecipeFactory::default());
        let mut step = MiddlewareDocument {
            activation: ActivationUnit::build(
                ComponentType::of::<Echo>(),
                Configuration::new(),
                "args",
                false,
                Arc::clone(&factory),
            ),
            extractor_recipes: BTreeMap::new(),
            priority: None,
        };
        step.extractor_recipes.insert(
            0,
            OneOrMany::One(Recipe::new(Some(ExtractorType::of::<EventData>()), Configuration::new())),
        );
        step.extractor_recipes.insert(
            2,
            OneOrMany::Many(vec![
                Recipe::new(
                    Some(ExtractorType::of::<Constant>()),
                    Configuration::new().with("value", "a"),
                ),
                Recipe::new(
                    Some(ExtractorType::of::<Constant>()),
                    Configuration::new().with("value", "b"),
                ),
            ]),
        );
        let documents = vec![PipelineDocument {
            middleware_stack: vec![step],
            filter_stack: Vec::new(),
        }];
        let dispatcher = PipelineDispatcher::new(documents, &factory).unwrap();

        let outcomes = dispatcher
            .dispatch(&Event::new("basic", json!({ "data": "x" })))
            .await
            .unwrap();
        assert_eq!(
            outcomes[0].response_stack,
            vec![json!([{ "data": "x" }, null, ["a", "b"]])]
        );
    }

    #[test]
    fn untyped_recipe_fails_at_construction() {
        let factory = RecipeFactory::default();
        let documents = vec![PipelineDocument {
            middleware_stack: Vec::new(),
            filter_stack: vec![OneOrMany::One(Recipe::new(None, Configuration::new()))],
        }];
        let err = PipelineDispatcher::new(documents, &factory).err().unwrap();
        assert!(matches!(err, DispatchError::MissingType(_)));
    }

    fn step(method: &str, factory: &Arc<RecipeFactory>) -> MiddlewareDocument {
        MiddlewareDocument {
            activation: ActivationUnit::build(
                ComponentType::of::<Echo>(),
                Configuration::new(),
                method,
                false,
                Arc::clone(factory),
            ),
            extractor_recipes: BTreeMap::new(),
            priority: Some(0),
        }
    }

    #[tokio::test]
    async fn steps_of_one_run_share_a_context() {
        let factory = Arc::new(RecipeFactory::default());
        let documents = vec![PipelineDocument {
            middleware_stack: vec![step("remember", &factory), step("recall", &factory)],
            filter_stack: Vec::new(),
        }];
        let dispatcher = PipelineDispatcher::new(documents, &factory).unwrap();
        let event = Event::new("basic", Value::Null);

        let first = dispatcher.dispatch(&event).await.unwrap();
        assert_eq!(first[0].response_stack, vec![Value::Null, json!(1)]);
        assert_eq!(first[0].context.get("remembered"), Some(&json!(1)));

        let second = dispatcher.dispatch(&event).await.unwrap();
        assert_eq!(second[0].response_stack[1], json!(1));
    }

    #[tokio::test]
    async fn expired_deadline_fails_the_run() {
        let factory = Arc::new(RecipeFactory::default());
        let documents = vec![PipelineDocument {
            middleware_stack: vec![step("expire", &factory), step("recall", &factory)],
            filter_stack: Vec::new(),
        }];
        let dispatcher = PipelineDispatcher::new(documents, &factory).unwrap();

        let err = dispatcher
            .dispatch(&Event::new("basic", Value::Null))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Timeout(TimeoutError { budget }) if budget == Duration::ZERO
        ));
    }

    #[cfg(feature = "timeout")]
    #[tokio::test]
    async fn running_step_is_cancelled_at_the_deadline() {
        let factory = Arc::new(RecipeFactory::default());
        let documents = vec![PipelineDocument {
            middleware_stack: vec![step("short_budget", &factory), step("stall", &factory)],
            filter_stack: Vec::new(),
        }];
        let dispatcher = PipelineDispatcher::new(documents, &factory).unwrap();

        let started = std::time::Instant::now();
        let err = dispatcher
            .dispatch(&Event::new("basic", Value::Null))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    /// Returns its raw arguments as an array, or works on the run context.
    #[derive(Default)]
    struct Echo;

    kiln_core::injectable_default!(Echo);

    impl kiln_core::Configurable for Echo {}

    impl kiln_core::Component for Echo {
        fn invoke<'a>(
            &'a self,
            method: &'a str,
            args: Arguments,
        ) -> kiln_core::BoxFuture<'a, Result<Value, kiln_core::InvokeError>> {
            Box::pin(async move {
                let context = args.context();
                match method {
                    "remember" => {
                        context.insert("remembered", 1);
                        Ok(Value::Null)
                    }
                    "recall" => Ok(context.get_value("remembered").unwrap_or(Value::Null)),
                    "expire" => {
                        context.set_deadline(Duration::ZERO);
                        Ok(Value::Null)
                    }
                    "short_budget" => {
                        context.set_deadline(Duration::from_millis(20));
                        Ok(Value::Null)
                    }
                    "stall" => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        Ok(Value::Null)
                    }
                    _ => Ok(Value::Array(
                        (0..args.len())
                            .map(|i| args.get(i).cloned().unwrap_or(Value::Null))
                            .collect(),
                    )),
                }
            })
        }
    }
}
