//! A registered route: one method, one handler, and its pre/post hooks.

use std::fmt;

use serde_json::Value;

use crate::error::{Error, Phase, guard};
use crate::handler::{BoxedHandler, Handler, HandlerList};
use crate::method::Method;

/// A path (or, in script mode, no path) bound to a method and a handler.
///
/// The method and handler are fixed at registration. Hooks can only be
/// appended, and run in the order they were added:
///
/// ```rust
/// use chute::Pipeline;
/// use serde_json::Value;
///
/// let mut app = Pipeline::new();
/// app.get("/items", || vec![1, 2, 3].len())
///     .pre(|| "authorised")
///     .post(|count: &Value| println!("listed {count} items"));
/// ```
pub struct Route {
    path: Option<String>,
    method: Method,
    handler: BoxedHandler,
    pre: HandlerList,
    post: HandlerList,
}

impl Route {
    pub(crate) fn new(path: Option<String>, method: Method, handler: BoxedHandler) -> Self {
        Self {
            path: path.filter(|p| !p.is_empty()),
            method,
            handler,
            pre: HandlerList::new(),
            post: HandlerList::new(),
        }
    }

    /// Appends a hook that runs before the handler. Returns `self` for chaining.
    pub fn pre<A>(&mut self, handler: impl Handler<A>) -> &mut Self {
        self.pre.push(handler.into_boxed_handler());
        self
    }

    /// Appends a hook that runs after the handler and receives its result.
    /// Returns `self` for chaining.
    pub fn post<A>(&mut self, handler: impl Handler<A>) -> &mut Self {
        self.post.push(handler.into_boxed_handler());
        self
    }

    /// The registered path, or `None` for a script-mode route.
    pub fn path(&self) -> Option<&str> { self.path.as_deref() }
    pub fn method(&self) -> &Method { &self.method }
    pub fn handler(&self) -> &BoxedHandler { &self.handler }
    pub fn pre_handlers(&self) -> &HandlerList { &self.pre }
    pub fn post_handlers(&self) -> &HandlerList { &self.post }

    pub(crate) fn call(&self, input: &Value) -> Result<Value, Error> {
        guard(Phase::Handler, || self.handler.call(input))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("pre", &self.pre)
            .field("post", &self.post)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn route(path: Option<&str>) -> Route {
        Route::new(path.map(str::to_owned), Method::Get, (|| 1).into_boxed_handler())
    }

    #[test]
    fn hooks_append_in_order() {
        let mut r = route(Some("/a"));
        r.pre(|| 1).pre(|v: &Value| v.clone()).post(|| ());
        assert_eq!(r.pre_handlers().len(), 2);
        assert_eq!(r.post_handlers().len(), 1);
    }

    #[test]
    fn empty_path_is_script_mode() {
        assert_eq!(route(Some("")).path(), None);
        assert_eq!(route(None).path(), None);
        assert_eq!(route(Some("/x")).path(), Some("/x"));
    }

    #[test]
    fn accessors_expose_registration() {
        let r = route(Some("/a"));
        assert_eq!(r.method(), &Method::Get);
        assert_eq!(r.handler().call(&Value::Null).unwrap(), json!(1));
        assert_eq!(r.call(&Value::Null).unwrap(), json!(1));
    }
}
