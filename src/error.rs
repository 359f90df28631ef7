//! Unified error type.
//!
//! Every failure a request can meet ends up as an [`Error`]: resolution
//! failures before any hook runs, and failures raised by user callables at
//! any phase of the protocol. Panics are captured at the callable boundary
//! and surfaced the same way.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::method::Method;

/// The error type user callables return from a failed invocation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One ordered stage of the execution protocol.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Phase {
    Initialize,
    Middleware,
    Pre,
    Handler,
    Post,
    Dispatch,
    ErrorHandler,
    ErrorDispatch,
    Teardown,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialize    => "initialize",
            Self::Middleware    => "middleware",
            Self::Pre           => "pre",
            Self::Handler       => "handler",
            Self::Post          => "post",
            Self::Dispatch      => "dispatch",
            Self::ErrorHandler  => "error-handler",
            Self::ErrorDispatch => "error-dispatch",
            Self::Teardown      => "teardown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error type of a request run through the pipeline.
///
/// By the time [`Pipeline::route`](crate::Pipeline::route) or
/// [`Pipeline::dispatch`](crate::Pipeline::dispatch) hands one of these back,
/// it has already been delivered to every error handler and teardown has run.
#[derive(Debug, Error)]
pub enum Error {
    /// No route is registered for the path (or for the method, in script mode).
    #[error("no route registered for `{0}`")]
    RouteNotFound(String),

    /// A route exists for the path but it was registered for another method.
    #[error("route `{path}` accepts {expected}, not {actual}")]
    MethodMismatch {
        path: String,
        expected: Method,
        actual: String,
    },

    /// A user-supplied callable failed or panicked.
    #[error("{phase} failed: {source}")]
    HandlerFailure {
        phase: Phase,
        #[source]
        source: BoxError,
    },

    /// [`Pipeline::view`](crate::Pipeline::view) was called with no view loader installed.
    #[error("no view loader installed, cannot render `{0}`")]
    ViewUnavailable(String),
}

impl Error {
    pub(crate) fn handler(phase: Phase, source: BoxError) -> Self {
        Self::HandlerFailure { phase, source }
    }

    /// The phase a [`HandlerFailure`](Error::HandlerFailure) came from.
    ///
    /// Resolution and view errors happen outside any phase and return `None`.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::HandlerFailure { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// Source error of a [`HandlerFailure`](Error::HandlerFailure) raised by a panic.
#[derive(Debug, Error)]
#[error("panicked: {message}")]
pub struct Panicked {
    pub message: String,
}

impl Panicked {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "opaque panic payload".to_owned()
        };
        Self { message }
    }
}

/// Method strings that are not a valid token: empty, or containing
/// separators or whitespace.
#[derive(Debug, Error, Eq, PartialEq)]
#[error("invalid method token `{0}`")]
pub struct InvalidMethod(pub String);

/// Runs one user callable, turning both `Err` returns and panics into a
/// [`HandlerFailure`](Error::HandlerFailure) for `phase`.
pub(crate) fn guard<T>(phase: Phase, f: impl FnOnce() -> Result<T, BoxError>) -> Result<T, Error> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(Error::handler(phase, source)),
        Err(payload) => Err(Error::handler(phase, Box::new(Panicked::from_payload(payload)))),
    }
}
