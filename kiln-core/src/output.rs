//! Output conversion traits.

use crate::error::BoxError;
use serde::Serialize;
use serde_json::Value;

/// Trait for converting a method's return value into a response value.
///
/// # Default Implementations
///
/// - `()` → `null`
/// - `Value`, strings, numbers, `bool` → as JSON
/// - `Option<T>` → `null` or the inner value
/// - `Result<T, E>` → the inner value, or `E` as a handler error
/// - [`Json<T>`] → any `Serialize` type
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a component method",
    label = "missing `IntoOutput` implementation",
    note = "wrap serialisable values in `kiln::Json` or return a `serde_json::Value`"
)]
pub trait IntoOutput {
    /// Convert into a response value or a handler error.
    fn into_output(self) -> Result<Value, BoxError>;
}

impl IntoOutput for () {
    fn into_output(self) -> Result<Value, BoxError> {
        Ok(Value::Null)
    }
}

impl IntoOutput for Value {
    fn into_output(self) -> Result<Value, BoxError> {
        Ok(self)
    }
}

impl IntoOutput for String {
    fn into_output(self) -> Result<Value, BoxError> {
        Ok(Value::String(self))
    }
}

impl IntoOutput for &'static str {
    fn into_output(self) -> Result<Value, BoxError> {
        Ok(Value::String(self.to_owned()))
    }
}

impl IntoOutput for bool {
    fn into_output(self) -> Result<Value, BoxError> {
        Ok(Value::Bool(self))
    }
}

macro_rules! impl_into_output_number {
    ($($ty:ty),+) => {
        $(
            impl IntoOutput for $ty {
                fn into_output(self) -> Result<Value, BoxError> {
                    Ok(Value::from(self))
                }
            }
        )+
    };
}

impl_into_output_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl<T: IntoOutput> IntoOutput for Option<T> {
    fn into_output(self) -> Result<Value, BoxError> {
        match self {
            Some(t) => t.into_output(),
            None => Ok(Value::Null),
        }
    }
}

impl<T, E> IntoOutput for Result<T, E>
where
    T: IntoOutput,
    E: Into<BoxError>,
{
    fn into_output(self) -> Result<Value, BoxError> {
        match self {
            Ok(t) => t.into_output(),
            Err(e) => Err(e.into()),
        }
    }
}

/// Wrapper returning any serialisable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoOutput for Json<T> {
    fn into_output(self) -> Result<Value, BoxError> {
        serde_json::to_value(self.0).map_err(Into::into)
    }
}
