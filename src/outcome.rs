//! The [`IntoOutcome`] conversion trait.
//!
//! Handlers return whatever is natural for them; the pipeline only ever sees
//! a `Result<Value, BoxError>`. `()` becomes `Value::Null`, an `Err` becomes
//! a handler failure, everything else becomes the JSON value it reads as.

use serde_json::Value;

use crate::error::BoxError;

/// Conversion of a callable's return value into the payload passed to the
/// next phase.
///
/// Implement on your own types to return them directly from handlers:
///
/// ```rust
/// use chute::{BoxError, IntoOutcome};
/// use serde_json::{Value, json};
///
/// struct Created(u64);
///
/// impl IntoOutcome for Created {
///     fn into_outcome(self) -> Result<Value, BoxError> {
///         Ok(json!({ "created": self.0 }))
///     }
/// }
/// ```
pub trait IntoOutcome {
    fn into_outcome(self) -> Result<Value, BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<Value, BoxError> { Ok(Value::Null) }
}

impl IntoOutcome for Value {
    fn into_outcome(self) -> Result<Value, BoxError> { Ok(self) }
}

impl IntoOutcome for Vec<Value> {
    fn into_outcome(self) -> Result<Value, BoxError> { Ok(Value::Array(self)) }
}

impl IntoOutcome for &'static str {
    fn into_outcome(self) -> Result<Value, BoxError> { Ok(Value::from(self)) }
}

impl IntoOutcome for String {
    fn into_outcome(self) -> Result<Value, BoxError> { Ok(Value::String(self)) }
}

macro_rules! via_from {
    ($($ty:ty),*) => {
        $(
            impl IntoOutcome for $ty {
                fn into_outcome(self) -> Result<Value, BoxError> { Ok(Value::from(self)) }
            }
        )*
    };
}

via_from!(bool, i32, i64, u32, u64, usize, f64);

/// `None` is the empty payload.
impl<T: IntoOutcome> IntoOutcome for Option<T> {
    fn into_outcome(self) -> Result<Value, BoxError> {
        match self {
            Some(v) => v.into_outcome(),
            None => Ok(Value::Null),
        }
    }
}

/// `Err` short-circuits the request into the catch path.
impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<Value, BoxError> {
        self.map_err(Into::into)?.into_outcome()
    }
}
