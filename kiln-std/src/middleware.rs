//! Built-in middleware.
//!
//! - [`LoggingMiddleware`]: traces events reaching a pipeline
//! - [`TimeoutMiddleware`]: bounds the remaining run of a pipeline

use kiln_core::{
    Annotated, Annotator, Arguments, BoxFuture, Component, Configurable, Configuration,
    ContextMap, ExtractorDefinition, ExtractorType, InvokeError, MethodSignature, Properties,
};
use serde_json::Value;
use std::time::Duration;

use crate::extractors::{DispatchContext, EventType};

/// Traces every event that reaches it.
///
/// The `level` property selects the tracing level (`trace`, `debug`, `info`,
/// `warn` or `error`; default `debug`). The `contextName` property, when
/// set, is attached to the log record.
///
/// Register it so its `log` method receives the event type:
///
/// ```rust,ignore
/// let logging = metadata.register::<LoggingMiddleware>();
/// metadata.annotate(controller, |a| {
///     a.before(logging, LoggingMiddleware::LOG);
/// });
/// ```
#[derive(Debug)]
pub struct LoggingMiddleware {
    properties: Properties,
}

impl LoggingMiddleware {
    /// Name of the logging method.
    pub const LOG: &'static str = "log";

    const SIGNATURES: &'static [MethodSignature] = &[MethodSignature {
        name: Self::LOG,
        params: &["event_type"],
    }];

    fn log(&self, event_type: Option<String>) {
        let level = self
            .properties
            .get::<String>("level")
            .unwrap_or_else(|| "debug".to_owned());
        let context = self
            .properties
            .get::<String>(kiln_core::CONTEXT_NAME)
            .unwrap_or_default();
        let event_type = event_type.unwrap_or_default();

        match level.as_str() {
            "trace" => tracing::trace!(%event_type, %context, "event reached pipeline"),
            "info" => tracing::info!(%event_type, %context, "event reached pipeline"),
            "warn" => tracing::warn!(%event_type, %context, "event reached pipeline"),
            "error" => tracing::error!(%event_type, %context, "event reached pipeline"),
            _ => tracing::debug!(%event_type, %context, "event reached pipeline"),
        }
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self {
            properties: Properties::with_defaults(Configuration::new().with("level", "debug")),
        }
    }
}

kiln_core::injectable_default!(LoggingMiddleware);

impl Configurable for LoggingMiddleware {
    fn properties(&self) -> Option<&Properties> {
        Some(&self.properties)
    }
}

impl Component for LoggingMiddleware {
    fn invoke<'a>(
        &'a self,
        method: &'a str,
        args: Arguments,
    ) -> BoxFuture<'a, Result<Value, InvokeError>> {
        Box::pin(async move {
            match method {
                Self::LOG => {
                    self.log(args.decode(0, method)?);
                    Ok(Value::Null)
                }
                _ => Err(InvokeError::UnknownMethod {
                    component: "LoggingMiddleware",
                    method: method.to_owned(),
                }),
            }
        })
    }

    fn signatures() -> &'static [MethodSignature] {
        Self::SIGNATURES
    }
}

impl Annotated for LoggingMiddleware {
    fn annotate(a: &mut Annotator<'_>) {
        a.method(Self::LOG, |m| {
            m.param(ExtractorDefinition::new(0, ExtractorType::of::<EventType>()));
        });
    }
}

/// Bounds the rest of a pipeline run.
///
/// `start` sets a deadline `timeout` milliseconds from now in the run's
/// context. The dispatcher fails the run with
/// [`TimeoutError`](crate::error::TimeoutError) once the deadline passes;
/// with the `timeout` feature a step still running at that point is
/// cancelled.
///
/// ```rust,ignore
/// let timeout = metadata.register::<TimeoutMiddleware>();
/// metadata.annotate(controller, |a| {
///     a.middleware(
///         MiddlewareDefinition::before(timeout, TimeoutMiddleware::START)
///             .config(Configuration::new().with(TimeoutMiddleware::TIMEOUT, 100)),
///     );
/// });
/// ```
#[derive(Debug, Default)]
pub struct TimeoutMiddleware {
    properties: Properties,
}

impl TimeoutMiddleware {
    /// Name of the method starting the clock.
    pub const START: &'static str = "start";
    /// Property holding the budget in milliseconds.
    pub const TIMEOUT: &'static str = "timeout";
    /// Budget used when none is configured.
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    const SIGNATURES: &'static [MethodSignature] = &[MethodSignature {
        name: Self::START,
        params: &["context"],
    }];

    fn budget(&self) -> Duration {
        Duration::from_millis(
            self.properties
                .get::<u64>(Self::TIMEOUT)
                .unwrap_or(Self::DEFAULT_TIMEOUT_MS),
        )
    }

    fn start(&self, context: &ContextMap) {
        let deadline = context.set_deadline(self.budget());
        tracing::trace!(budget = ?deadline.budget, "deadline set for pipeline run");
    }
}

kiln_core::injectable_default!(TimeoutMiddleware);

impl Configurable for TimeoutMiddleware {
    fn properties(&self) -> Option<&Properties> {
        Some(&self.properties)
    }
}

impl Component for TimeoutMiddleware {
    fn invoke<'a>(
        &'a self,
        method: &'a str,
        args: Arguments,
    ) -> BoxFuture<'a, Result<Value, InvokeError>> {
        Box::pin(async move {
            match method {
                Self::START => {
                    self.start(args.context());
                    Ok(Value::Null)
                }
                _ => Err(InvokeError::UnknownMethod {
                    component: "TimeoutMiddleware",
                    method: method.to_owned(),
                }),
            }
        })
    }

    fn signatures() -> &'static [MethodSignature] {
        Self::SIGNATURES
    }
}

impl Annotated for TimeoutMiddleware {
    fn annotate(a: &mut Annotator<'_>) {
        a.method(Self::START, |m| {
            m.param(ExtractorDefinition::new(0, ExtractorType::of::<DispatchContext>()));
        });
    }
}
