//! Fixtures shared by unit tests.

use crate::{
    component::{Arguments, Component},
    config::{Configurable, Properties},
    error::InvokeError,
    types::ComponentType,
};
use futures::future::BoxFuture;
use serde_json::Value;

/// A component that echoes its first argument and exposes properties.
#[derive(Default)]
pub(crate) struct Widget {
    properties: Properties,
}

crate::injectable_default!(Widget);

impl Widget {
    pub(crate) fn component_type() -> ComponentType {
        ComponentType::of::<Widget>()
    }
}

impl Configurable for Widget {
    fn properties(&self) -> Option<&Properties> {
        Some(&self.properties)
    }
}

impl Component for Widget {
    fn invoke<'a>(
        &'a self,
        method: &'a str,
        args: Arguments,
    ) -> BoxFuture<'a, Result<Value, InvokeError>> {
        Box::pin(async move {
            match method {
                "echo" => Ok(args.get(0).cloned().unwrap_or(Value::Null)),
                _ => Err(InvokeError::UnknownMethod {
                    component: "Widget",
                    method: method.to_owned(),
                }),
            }
        })
    }
}
