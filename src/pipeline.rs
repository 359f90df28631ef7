//! The request pipeline.
//!
//! # Execution protocol
//!
//! Every request resolved by [`Pipeline::route`] or [`Pipeline::dispatch`]
//! runs the same fixed sequence:
//!
//! ```text
//! initializers → middleware → service middleware → pre-handlers
//!     → handler → post-handlers → service dispatch
//!         ↓ first failure anywhere above (or a failed lookup)
//!     error handlers → service error handlers → service error dispatch
//! destructors → service destructors          ← always
//! ```
//!
//! The first failure short-circuits the rest of the success path and is
//! caught exactly once. Nothing is retried. Teardown runs whether or not
//! anything failed.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde_json::Value;
use tracing::{debug, debug_span, error, trace, warn};

use crate::config::{Arguments, Config};
use crate::error::{Error, Phase, guard};
use crate::handler::{BoxedErrorHook, ErrorHook, Handler, HandlerList};
use crate::method::Method;
use crate::route::Route;
use crate::service::{Service, ServiceRegistry};
use crate::view::View;

/// Route tables, global hooks, and services.
///
/// Configure it once at startup, then hand requests to [`route`](Self::route)
/// or [`dispatch`](Self::dispatch). Registration takes `&mut self`, request
/// handling takes `&self`.
pub struct Pipeline {
    config: Config,
    routes: HashMap<String, Route>,
    request_handlers: HashMap<String, Route>,
    initializers: HandlerList,
    middleware: HandlerList,
    destructors: HandlerList,
    error_handlers: Vec<BoxedErrorHook>,
    services: ServiceRegistry,
    views: Option<Box<dyn View>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            routes: HashMap::new(),
            request_handlers: HashMap::new(),
            initializers: HandlerList::new(),
            middleware: HandlerList::new(),
            destructors: HandlerList::new(),
            error_handlers: Vec::new(),
            services: ServiceRegistry::new(),
            views: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ── Route registration ────────────────────────────────────────────────────

    /// Registers `handler` for `method` at the exact `path`, replacing any
    /// route already registered there. Returns the route so hooks can be
    /// chained onto it.
    ///
    /// An empty `path` registers a script-mode route, as
    /// [`request_handler`](Self::request_handler) does.
    pub fn on<A>(&mut self, method: Method, path: &str, handler: impl Handler<A>) -> &mut Route {
        if path.is_empty() {
            return self.request_handler(method, handler);
        }
        debug!(%method, path, "route registered");
        let route = Route::new(Some(path.to_owned()), method, handler.into_boxed_handler());
        match self.routes.entry(path.to_owned()) {
            Entry::Occupied(mut slot) => {
                trace!(path, replaced = %slot.get().method(), "route replaced");
                slot.insert(route);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(route),
        }
    }

    pub fn get<A>(&mut self, path: &str, handler: impl Handler<A>) -> &mut Route {
        self.on(Method::Get, path, handler)
    }

    pub fn put<A>(&mut self, path: &str, handler: impl Handler<A>) -> &mut Route {
        self.on(Method::Put, path, handler)
    }

    pub fn patch<A>(&mut self, path: &str, handler: impl Handler<A>) -> &mut Route {
        self.on(Method::Patch, path, handler)
    }

    pub fn post<A>(&mut self, path: &str, handler: impl Handler<A>) -> &mut Route {
        self.on(Method::Post, path, handler)
    }

    pub fn delete<A>(&mut self, path: &str, handler: impl Handler<A>) -> &mut Route {
        self.on(Method::Delete, path, handler)
    }

    /// Registers a path-less, script-mode route reached through
    /// [`dispatch`](Self::dispatch). One per method; the last one wins.
    pub fn request_handler<A>(&mut self, method: Method, handler: impl Handler<A>) -> &mut Route {
        debug!(%method, "request handler registered");
        let key = method.as_str().to_owned();
        let route = Route::new(None, method, handler.into_boxed_handler());
        match self.request_handlers.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(route);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(route),
        }
    }

    // ── Global hooks ──────────────────────────────────────────────────────────

    /// Runs first on every request, with no input.
    pub fn initialize<A>(&mut self, hook: impl Handler<A>) -> &mut Self {
        self.initializers.push(hook.into_boxed_handler());
        self
    }

    /// Runs after the initializers on every request, with no input.
    pub fn middleware<A>(&mut self, hook: impl Handler<A>) -> &mut Self {
        self.middleware.push(hook.into_boxed_handler());
        self
    }

    /// Receives the error of every failed request.
    pub fn error_handler<A>(&mut self, hook: impl ErrorHook<A>) -> &mut Self {
        self.error_handlers.push(hook.into_boxed_error_hook());
        self
    }

    /// Runs last on every request, failed or not.
    pub fn destructor<A>(&mut self, hook: impl Handler<A>) -> &mut Self {
        self.destructors.push(hook.into_boxed_handler());
        self
    }

    pub fn service(&mut self, service: impl Service) -> &mut Self {
        debug!(service = service.name(), "service registered");
        self.services.push(Box::new(service));
        self
    }

    /// Installs the loader used by [`view`](Self::view).
    pub fn views(&mut self, views: impl View) -> &mut Self {
        self.views = Some(Box::new(views));
        self
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub fn find(&self, path: &str) -> Option<&Route> {
        self.routes.get(path)
    }

    pub fn find_request_handler(&self, method: impl AsRef<str>) -> Option<&Route> {
        self.request_handlers.get(method.as_ref())
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    /// Renders a view through the installed loader.
    pub fn view(&self, path: &str) -> Result<Value, Error> {
        let views = self
            .views
            .as_ref()
            .ok_or_else(|| Error::ViewUnavailable(path.to_owned()))?;
        guard(Phase::Handler, || views.render(path))
    }

    // ── Request handling ──────────────────────────────────────────────────────

    /// Runs the route registered at `path`.
    ///
    /// Fails with [`Error::RouteNotFound`] when nothing is registered there
    /// and with [`Error::MethodMismatch`] when the route expects another
    /// method; neither runs a single handler. An empty `path` behaves as
    /// [`dispatch`](Self::dispatch).
    ///
    /// Never panics on behalf of a callable. An `Err` has already been
    /// through every error handler, and teardown has already run. A failed
    /// destructor is reported only when the request itself succeeded, and
    /// is caught like any other failure before it is returned.
    pub fn route(&self, method: impl AsRef<str>, path: &str) -> Result<(), Error> {
        let method = method.as_ref();
        if path.is_empty() {
            return self.dispatch(method);
        }
        let span = debug_span!("route", method, path);
        let _enter = span.enter();
        let resolved = self.resolve(method, path);
        self.finish(resolved.and_then(|route| self.execute(route)))
    }

    /// Runs the script-mode route registered for `method`.
    ///
    /// Same guarantees as [`route`](Self::route).
    pub fn dispatch(&self, method: impl AsRef<str>) -> Result<(), Error> {
        let method = method.as_ref();
        let span = debug_span!("dispatch", method);
        let _enter = span.enter();
        let resolved = self
            .request_handlers
            .get(method)
            .ok_or_else(|| Error::RouteNotFound(method.to_owned()));
        self.finish(resolved.and_then(|route| self.execute(route)))
    }

    fn resolve(&self, method: &str, path: &str) -> Result<&Route, Error> {
        let route = self
            .routes
            .get(path)
            .ok_or_else(|| Error::RouteNotFound(path.to_owned()))?;
        if route.method().as_str() != method {
            return Err(Error::MethodMismatch {
                path: path.to_owned(),
                expected: route.method().clone(),
                actual: method.to_owned(),
            });
        }
        Ok(route)
    }

    /// The success path. Returns at the first failure.
    fn execute(&self, route: &Route) -> Result<(), Error> {
        trace!("initializing");
        self.initializers.run(Phase::Initialize, &Value::Null)?;
        self.middleware.run(Phase::Middleware, &Value::Null)?;
        self.services.middleware()?;

        let input = route.pre_handlers().chain(Phase::Pre, Value::Null)?;
        let input = match self.config.arguments {
            Arguments::PassThrough => input,
            Arguments::Discard => Value::Null,
        };

        trace!("calling handler");
        let result = route.call(&input)?;

        route.post_handlers().run(Phase::Post, &result)?;
        self.services.dispatch(&result)?;
        Ok(())
    }

    /// Catch path and teardown.
    fn finish(&self, outcome: Result<(), Error>) -> Result<(), Error> {
        if let Err(err) = &outcome {
            warn!(phase = err.phase().map(Phase::as_str), error = %err, "request failed");
            self.catch(err);
            if let Err(suppressed) = self.teardown() {
                debug!(error = %suppressed, "teardown failure suppressed by request error");
            }
            return outcome;
        }
        let teardown = self.teardown();
        if let Err(err) = &teardown {
            warn!(phase = Phase::Teardown.as_str(), error = %err, "teardown failed");
            self.catch(err);
        }
        teardown
    }

    fn catch(&self, err: &Error) {
        for hook in &self.error_handlers {
            if let Err(e) = guard(Phase::ErrorHandler, || hook.call(err)) {
                error!(error = %e, "error handler failed");
            }
        }
        self.services.handle_error(err);
        self.services.error_dispatch(err);
    }

    /// Runs every destructor, then every destructor service. Returns the
    /// first failure.
    fn teardown(&self) -> Result<(), Error> {
        let mut first = Ok(());
        for hook in self.destructors.iter() {
            if let Err(e) = guard(Phase::Teardown, || hook.call(&Value::Null)) {
                warn!(error = %e, "destructor failed");
                first = first.and(Err(e));
            }
        }
        first.and(self.services.destruct())
    }
}

impl Default for Pipeline {
    fn default() -> Self { Self::new() }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("routes", &self.routes)
            .field("request_handlers", &self.request_handlers)
            .field("initializers", &self.initializers)
            .field("middleware", &self.middleware)
            .field("destructors", &self.destructors)
            .field("error_handlers", &self.error_handlers.len())
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}
