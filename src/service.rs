//! Services: pluggable objects that take part in one or more phases.
//!
//! A service opts into a phase by implementing that phase's capability trait
//! and returning itself from the matching `as_*` accessor on [`Service`].
//! Accessors default to `None`, so a service only mentions the phases it
//! cares about. Phases ask every registered service in registration order
//! and silently skip the ones that decline.
//!
//! ```rust
//! use chute::service::{Destructor, Middleware, Service};
//! use chute::BoxError;
//!
//! struct Db;
//!
//! impl Middleware for Db {
//!     fn middleware(&self) -> Result<(), BoxError> { Ok(()) } // open
//! }
//!
//! impl Destructor for Db {
//!     fn destruct(&self) -> Result<(), BoxError> { Ok(()) } // close
//! }
//!
//! impl Service for Db {
//!     fn as_middleware(&self) -> Option<&dyn Middleware> { Some(self) }
//!     fn as_destructor(&self) -> Option<&dyn Destructor> { Some(self) }
//! }
//! ```

use std::fmt;

use serde_json::Value;
use tracing::{error, warn};

use crate::error::{BoxError, Error, Phase, guard};

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Runs after the global middleware, before the route's pre-handlers.
pub trait Middleware {
    fn middleware(&self) -> Result<(), BoxError>;
}

/// Consumes the handler's result once the post-handlers have run.
pub trait Dispatch {
    fn dispatch(&self, result: &Value) -> Result<(), BoxError>;
}

/// Notified of a failed request, after the global error handlers.
pub trait ErrorHandler {
    fn handle_error(&self, error: &Error) -> Result<(), BoxError>;
}

/// Delivers a failed request's error, after every [`ErrorHandler`].
pub trait ErrorDispatch {
    fn error_dispatch(&self, error: &Error) -> Result<(), BoxError>;
}

/// Runs at teardown, after the global destructors, whether or not the
/// request failed.
pub trait Destructor {
    fn destruct(&self) -> Result<(), BoxError>;
}

/// A pluggable object. Implement the `as_*` accessor of every capability
/// the type supports.
pub trait Service: 'static {
    fn as_middleware(&self) -> Option<&dyn Middleware> { None }
    fn as_dispatch(&self) -> Option<&dyn Dispatch> { None }
    fn as_error_handler(&self) -> Option<&dyn ErrorHandler> { None }
    fn as_error_dispatch(&self) -> Option<&dyn ErrorDispatch> { None }
    fn as_destructor(&self) -> Option<&dyn Destructor> { None }

    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// The ordered collection of services owned by a pipeline.
#[derive(Default)]
pub struct ServiceRegistry {
    services: Vec<Box<dyn Service>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self { services: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub(crate) fn push(&mut self, service: Box<dyn Service>) {
        self.services.push(service);
    }

    pub(crate) fn middleware(&self) -> Result<(), Error> {
        for m in self.services.iter().filter_map(|s| s.as_middleware()) {
            guard(Phase::Middleware, || m.middleware())?;
        }
        Ok(())
    }

    pub(crate) fn dispatch(&self, result: &Value) -> Result<(), Error> {
        for d in self.services.iter().filter_map(|s| s.as_dispatch()) {
            guard(Phase::Dispatch, || d.dispatch(result))?;
        }
        Ok(())
    }

    /// Runs every error handler; one failing does not stop the rest.
    pub(crate) fn handle_error(&self, err: &Error) {
        for s in &self.services {
            if let Some(h) = s.as_error_handler() {
                if let Err(e) = guard(Phase::ErrorHandler, || h.handle_error(err)) {
                    error!(service = s.name(), error = %e, "error handler failed");
                }
            }
        }
    }

    /// Runs every error dispatcher; one failing does not stop the rest.
    pub(crate) fn error_dispatch(&self, err: &Error) {
        for s in &self.services {
            if let Some(d) = s.as_error_dispatch() {
                if let Err(e) = guard(Phase::ErrorDispatch, || d.error_dispatch(err)) {
                    error!(service = s.name(), error = %e, "error dispatch failed");
                }
            }
        }
    }

    /// Runs every destructor and returns the first failure.
    pub(crate) fn destruct(&self) -> Result<(), Error> {
        let mut first = Ok(());
        for s in &self.services {
            if let Some(d) = s.as_destructor() {
                if let Err(e) = guard(Phase::Teardown, || d.destruct()) {
                    warn!(service = s.name(), error = %e, "destructor failed");
                    first = first.and(Err(e));
                }
            }
        }
        first
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.services.iter().map(|s| s.name()))
            .finish()
    }
}
