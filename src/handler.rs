//! Handler traits and type erasure.
//!
//! # How handlers are stored
//!
//! A [`HandlerList`] holds callables of *different* closure types in one
//! `Vec`, so each is boxed behind a common trait object. Two call shapes
//! are accepted and told apart by signature alone:
//!
//! ```text
//! || log.push("init")                  ← Handler<()>     no-argument invocation
//! |r: &Value| log.push(r.to_string())  ← Handler<Value>  pass-through of the last result
//!        ↓ pipeline.get("/", h)
//! h.into_boxed_handler()               ← blanket impl for the matching shape
//!        ↓
//! Box::new(NoArgs(h)) / Box::new(PassThrough(h))
//!        ↓  stored as BoxedHandler = Box<dyn ErasedHandler>
//! handler.call(&input)  at request time ← one vtable dispatch
//! ```
//!
//! One-argument closures need their parameter annotated (`|r: &Value|`);
//! without it the compiler cannot tell which shape is meant.

use std::fmt;

use serde_json::Value;

use crate::error::{BoxError, Error, Phase, guard};
use crate::outcome::IntoOutcome;

// ── Internal types ────────────────────────────────────────────────────────────

pub(crate) type Outcome = Result<Value, BoxError>;

/// Internal dispatch interface for route handlers and hooks.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, input: &Value) -> Outcome;
}

/// A heap-allocated, type-erased handler owned by its route or hook list.
#[doc(hidden)]
pub type BoxedHandler = Box<dyn ErasedHandler + 'static>;

/// Internal dispatch interface for error hooks.
#[doc(hidden)]
pub trait ErasedErrorHook {
    fn call(&self, error: &Error) -> Outcome;
}

#[doc(hidden)]
pub type BoxedErrorHook = Box<dyn ErasedErrorHook + 'static>;

// ── Public traits ─────────────────────────────────────────────────────────────

/// Implemented for every valid handler or hook.
///
/// You never implement this yourself. It is satisfied by any closure or
/// function with one of the signatures:
///
/// ```text
/// Fn() -> impl IntoOutcome
/// Fn(&Value) -> impl IntoOutcome
/// ```
///
/// `Args` only exists to keep the two blanket impls apart.
pub trait Handler<Args>: private::Sealed<Args> + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// Implemented for every valid error hook: `Fn() -> impl IntoOutcome` or
/// `Fn(&Error) -> impl IntoOutcome`.
pub trait ErrorHook<Args>: private::Sealed<Args> + 'static {
    #[doc(hidden)]
    fn into_boxed_error_hook(self) -> BoxedErrorHook;
}

mod private {
    pub trait Sealed<Args> {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, R> private::Sealed<()> for F
where
    F: Fn() -> R + 'static,
    R: IntoOutcome,
{
}

impl<F, R> Handler<()> for F
where
    F: Fn() -> R + 'static,
    R: IntoOutcome,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Box::new(NoArgs(self))
    }
}

impl<F, R> ErrorHook<()> for F
where
    F: Fn() -> R + 'static,
    R: IntoOutcome,
{
    fn into_boxed_error_hook(self) -> BoxedErrorHook {
        Box::new(NoArgs(self))
    }
}

impl<F, R> private::Sealed<Value> for F
where
    F: Fn(&Value) -> R + 'static,
    R: IntoOutcome,
{
}

impl<F, R> Handler<Value> for F
where
    F: Fn(&Value) -> R + 'static,
    R: IntoOutcome,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Box::new(PassThrough(self))
    }
}

impl<F, R> private::Sealed<Error> for F
where
    F: Fn(&Error) -> R + 'static,
    R: IntoOutcome,
{
}

impl<F, R> ErrorHook<Error> for F
where
    F: Fn(&Error) -> R + 'static,
    R: IntoOutcome,
{
    fn into_boxed_error_hook(self) -> BoxedErrorHook {
        Box::new(PassThrough(self))
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

/// Calls the wrapped function without its input.
struct NoArgs<F>(F);

/// Calls the wrapped function with its input.
struct PassThrough<F>(F);

impl<F, R> ErasedHandler for NoArgs<F>
where
    F: Fn() -> R,
    R: IntoOutcome,
{
    fn call(&self, _input: &Value) -> Outcome {
        (self.0)().into_outcome()
    }
}

impl<F, R> ErasedErrorHook for NoArgs<F>
where
    F: Fn() -> R,
    R: IntoOutcome,
{
    fn call(&self, _error: &Error) -> Outcome {
        (self.0)().into_outcome()
    }
}

impl<F, R> ErasedHandler for PassThrough<F>
where
    F: Fn(&Value) -> R,
    R: IntoOutcome,
{
    fn call(&self, input: &Value) -> Outcome {
        (self.0)(input).into_outcome()
    }
}

impl<F, R> ErasedErrorHook for PassThrough<F>
where
    F: Fn(&Error) -> R,
    R: IntoOutcome,
{
    fn call(&self, error: &Error) -> Outcome {
        (self.0)(error).into_outcome()
    }
}

// ── HandlerList ───────────────────────────────────────────────────────────────

/// An ordered, append-only sequence of handlers.
///
/// Insertion order is execution order. Nothing is ever reordered,
/// deduplicated, or removed.
#[derive(Default)]
pub struct HandlerList(Vec<BoxedHandler>);

impl HandlerList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoxedHandler> {
        self.0.iter()
    }

    pub(crate) fn push(&mut self, handler: BoxedHandler) {
        self.0.push(handler);
    }

    /// Calls every handler with the same `input`, discarding results.
    /// Stops at the first failure.
    pub(crate) fn run(&self, phase: Phase, input: &Value) -> Result<(), Error> {
        for handler in &self.0 {
            guard(phase, || handler.call(input))?;
        }
        Ok(())
    }

    /// Feeds `seed` to the first handler and each result to the next one.
    /// Returns the last result, or `seed` if the list is empty.
    pub(crate) fn chain(&self, phase: Phase, seed: Value) -> Result<Value, Error> {
        self.0
            .iter()
            .try_fold(seed, |acc, handler| guard(phase, || handler.call(&acc)))
    }
}

impl fmt::Debug for HandlerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerList").field("len", &self.0.len()).finish()
    }
}

/// Views a result as an argument list.
///
/// Arrays spread into their elements, `Null` is no arguments, and any other
/// value is a single argument.
///
/// ```rust
/// use chute::spread;
/// use serde_json::json;
///
/// assert_eq!(spread(&json!([1, 2])).len(), 2);
/// assert_eq!(spread(&json!("one")), &[json!("one")]);
/// assert!(spread(&json!(null)).is_empty());
/// ```
pub fn spread(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        Value::Null => &[],
        other => std::slice::from_ref(other),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;

    #[test]
    fn chain_threads_each_result_into_the_next() {
        let mut list = HandlerList::new();
        list.push((|v: &Value| v.as_i64().unwrap_or(0) + 1).into_boxed_handler());
        list.push((|v: &Value| v.as_i64().unwrap_or(0) * 10).into_boxed_handler());
        assert_eq!(list.chain(Phase::Pre, json!(4)).unwrap(), json!(50));
    }

    #[test]
    fn chain_of_empty_list_returns_seed() {
        let list = HandlerList::new();
        assert_eq!(list.chain(Phase::Pre, json!("seed")).unwrap(), json!("seed"));
    }

    #[test]
    fn run_stops_at_first_failure() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut list = HandlerList::new();
        let s = Rc::clone(&seen);
        list.push((move || s.borrow_mut().push(1)).into_boxed_handler());
        list.push((|| -> Result<(), BoxError> { Err("stop".into()) }).into_boxed_handler());
        let s = Rc::clone(&seen);
        list.push((move || s.borrow_mut().push(3)).into_boxed_handler());

        let err = list.run(Phase::Middleware, &Value::Null).unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Middleware));
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn no_arg_handlers_ignore_input() {
        let h = (|| "fixed").into_boxed_handler();
        assert_eq!(h.call(&json!(99)).unwrap(), json!("fixed"));
    }

    #[test]
    fn error_hooks_see_the_error() {
        let hook = (|e: &Error| e.to_string()).into_boxed_error_hook();
        let out = hook.call(&Error::RouteNotFound("/nope".into())).unwrap();
        assert_eq!(out, json!("no route registered for `/nope`"));
    }

    #[test]
    fn spread_views_results_as_arguments() {
        let pair = json!(["a", "b"]);
        assert_eq!(spread(&pair), &[json!("a"), json!("b")]);
        assert_eq!(spread(&json!(7)), &[json!(7)]);
    }
}
