#![allow(dead_code)]

use kiln::{
    Annotated, Annotator, Arguments, BoxFuture, Component, Configurable, Configuration,
    ControllerDefinition, ExtractorDefinition, ExtractorType, FilterType, InvokeError,
    MethodSignature, MiddlewareDefinition, Properties, RouteDefinition,
    extractors::EventData,
    filters::IfEventIs,
};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// Tracing
// ============================================================================

/// Install a test subscriber once; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Helpers
// ============================================================================

pub fn event_is(event_type: &str) -> RouteDefinition {
    RouteDefinition::new(FilterType::of::<IfEventIs>())
        .configuration(Configuration::new().with(IfEventIs::EVENT_TYPE, event_type))
}

pub fn event_data(index: usize) -> ExtractorDefinition {
    ExtractorDefinition::new(index, ExtractorType::of::<EventData>())
}

// ============================================================================
// Controllers
// ============================================================================

/// Counts its own handler calls; the count is part of every response.
#[derive(Default)]
pub struct CallCounter {
    calls: AtomicU64,
}

impl CallCounter {
    fn handle(&self, args: &Arguments) -> Result<Value, InvokeError> {
        let data: Value = args.decode(0, "handle")?;
        let call_number = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(json!({ "callNumber": call_number, "data": data }))
    }
}

const HANDLE: &[MethodSignature] = &[MethodSignature {
    name: "handle",
    params: &["data"],
}];

macro_rules! call_counter_controller {
    ($name:ident, $singleton:expr, $event_type:expr) => {
        #[derive(Default)]
        pub struct $name(CallCounter);

        kiln::injectable_default!($name);

        impl Configurable for $name {}

        impl Component for $name {
            fn invoke<'a>(
                &'a self,
                method: &'a str,
                args: Arguments,
            ) -> BoxFuture<'a, Result<Value, InvokeError>> {
                Box::pin(async move {
                    match method {
                        "handle" => self.0.handle(&args),
                        _ => Err(InvokeError::UnknownMethod {
                            component: stringify!($name),
                            method: method.to_owned(),
                        }),
                    }
                })
            }

            fn signatures() -> &'static [MethodSignature] {
                HANDLE
            }
        }

        impl Annotated for $name {
            fn annotate(a: &mut Annotator<'_>) {
                a.controller(ControllerDefinition::new().singleton($singleton))
                    .method("handle", |m| {
                        m.route(event_is($event_type)).param(event_data(0));
                    });
            }
        }
    };
}

call_counter_controller!(BasicController, false, "basic");
call_counter_controller!(SingletonController, true, "singleton");

// ============================================================================
// Middleware
// ============================================================================

/// Returns its `configValue` property from `respond`.
#[derive(Default)]
pub struct ConfigValueMiddleware {
    properties: Properties,
}

kiln::injectable_default!(ConfigValueMiddleware);

impl ConfigValueMiddleware {
    pub fn definition(priority: i32, value: &str) -> MiddlewareDefinition {
        MiddlewareDefinition::new(kiln::ComponentType::of::<Self>(), "respond")
            .priority(priority)
            .config(Configuration::new().with("configValue", value))
    }
}

impl Configurable for ConfigValueMiddleware {
    fn properties(&self) -> Option<&Properties> {
        Some(&self.properties)
    }
}

impl Component for ConfigValueMiddleware {
    fn invoke<'a>(
        &'a self,
        method: &'a str,
        _args: Arguments,
    ) -> BoxFuture<'a, Result<Value, InvokeError>> {
        Box::pin(async move {
            match method {
                "respond" => Ok(self.properties.get_value("configValue").unwrap_or(Value::Null)),
                _ => Err(InvokeError::UnknownMethod {
                    component: "ConfigValueMiddleware",
                    method: method.to_owned(),
                }),
            }
        })
    }
}

/// Controller with middleware on both levels; the handler echoes the payload.
#[derive(Default)]
pub struct StackedController;

kiln::injectable_default!(StackedController);

impl Configurable for StackedController {}

impl Component for StackedController {
    fn invoke<'a>(
        &'a self,
        method: &'a str,
        args: Arguments,
    ) -> BoxFuture<'a, Result<Value, InvokeError>> {
        Box::pin(async move {
            match method {
                "handle" => Ok(args.decode::<Value>(0, method)?),
                _ => Err(InvokeError::UnknownMethod {
                    component: "StackedController",
                    method: method.to_owned(),
                }),
            }
        })
    }

    fn signatures() -> &'static [MethodSignature] {
        HANDLE
    }
}

impl Annotated for StackedController {
    fn annotate(a: &mut Annotator<'_>) {
        a.controller(ControllerDefinition::new())
            .middleware(ConfigValueMiddleware::definition(1, "4"))
            .middleware(ConfigValueMiddleware::definition(0, "1"))
            .method("handle", |m| {
                m.route(event_is("stacked"))
                    .middleware(ConfigValueMiddleware::definition(-1, "2"))
                    .middleware(ConfigValueMiddleware::definition(1, "3"))
                    .param(event_data(0));
            });
    }
}
