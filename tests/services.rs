use std::cell::RefCell;
use std::rc::Rc;

use chute::service::{Destructor, Dispatch, ErrorDispatch, ErrorHandler, Middleware, Service};
use chute::{BoxError, Error, Pipeline};
use serde_json::Value;

type Log = Rc<RefCell<Vec<String>>>;

/// Takes part in middleware and dispatch.
struct Renderer(Log);

impl Middleware for Renderer {
    fn middleware(&self) -> Result<(), BoxError> {
        self.0.borrow_mut().push("renderer:mw".into());
        Ok(())
    }
}

impl Dispatch for Renderer {
    fn dispatch(&self, result: &Value) -> Result<(), BoxError> {
        self.0.borrow_mut().push(format!("renderer:dispatch:{result}"));
        Ok(())
    }
}

impl Service for Renderer {
    fn as_middleware(&self) -> Option<&dyn Middleware> { Some(self) }
    fn as_dispatch(&self) -> Option<&dyn Dispatch> { Some(self) }
}

/// Takes part in every failure phase and teardown.
struct Reporter(Log);

impl ErrorHandler for Reporter {
    fn handle_error(&self, error: &Error) -> Result<(), BoxError> {
        self.0.borrow_mut().push(format!("reporter:handle:{}", error.phase().map_or("-", |p| p.as_str())));
        Ok(())
    }
}

impl ErrorDispatch for Reporter {
    fn error_dispatch(&self, _error: &Error) -> Result<(), BoxError> {
        self.0.borrow_mut().push("reporter:error_dispatch".into());
        Ok(())
    }
}

impl Destructor for Reporter {
    fn destruct(&self) -> Result<(), BoxError> {
        self.0.borrow_mut().push("reporter:destruct".into());
        Ok(())
    }
}

impl Service for Reporter {
    fn as_error_handler(&self) -> Option<&dyn ErrorHandler> { Some(self) }
    fn as_error_dispatch(&self) -> Option<&dyn ErrorDispatch> { Some(self) }
    fn as_destructor(&self) -> Option<&dyn Destructor> { Some(self) }
}

/// Implements nothing at all.
struct Bystander;

impl Service for Bystander {}

fn app(log: &Log) -> Pipeline {
    let mut app = Pipeline::new();
    app.service(Bystander)
        .service(Renderer(Rc::clone(log)))
        .service(Reporter(Rc::clone(log)));

    let l = Rc::clone(log);
    app.middleware(move || l.borrow_mut().push("global:mw".into()));
    let l = Rc::clone(log);
    app.error_handler(move || l.borrow_mut().push("global:error".into()));
    let l = Rc::clone(log);
    app.destructor(move || l.borrow_mut().push("global:destruct".into()));
    app
}

#[test]
fn dual_capability_service_runs_once_per_phase() {
    let log = Log::default();
    let mut app = app(&log);
    app.get("/ok", || "page");

    app.route("GET", "/ok").unwrap();
    assert_eq!(
        *log.borrow(),
        [
            "global:mw",
            "renderer:mw",
            "renderer:dispatch:\"page\"",
            "global:destruct",
            "reporter:destruct",
        ],
    );
}

#[test]
fn failing_handler_skips_dispatch_but_not_destructors() {
    let log = Log::default();
    let mut app = app(&log);
    let l = Rc::clone(&log);
    app.get("/fail", || -> Result<(), BoxError> { Err("boom".into()) })
        .post(move || l.borrow_mut().push("post".into()));

    assert!(app.route("GET", "/fail").is_err());
    assert_eq!(
        *log.borrow(),
        [
            "global:mw",
            "renderer:mw",
            "global:error",
            "reporter:handle:handler",
            "reporter:error_dispatch",
            "global:destruct",
            "reporter:destruct",
        ],
    );
}

#[test]
fn failing_dispatch_service_enters_catch_path() {
    struct Strict;

    impl Dispatch for Strict {
        fn dispatch(&self, _result: &Value) -> Result<(), BoxError> {
            Err("cannot render".into())
        }
    }

    impl Service for Strict {
        fn as_dispatch(&self) -> Option<&dyn Dispatch> { Some(self) }
    }

    let log = Log::default();
    let mut app = Pipeline::new();
    app.service(Strict).service(Reporter(Rc::clone(&log)));
    app.get("/x", || ());

    let err = app.route("GET", "/x").unwrap_err();
    assert_eq!(err.to_string(), "dispatch failed: cannot render");
    assert_eq!(
        *log.borrow(),
        ["reporter:handle:dispatch", "reporter:error_dispatch", "reporter:destruct"],
    );
}

#[test]
fn resolution_errors_reach_services_without_a_phase() {
    let log = Log::default();
    let app = app(&log);

    assert!(app.route("GET", "/nowhere").is_err());
    assert_eq!(
        *log.borrow(),
        [
            "global:error",
            "reporter:handle:-",
            "reporter:error_dispatch",
            "global:destruct",
            "reporter:destruct",
        ],
    );
    assert_eq!(app.services().len(), 3);
}

#[test]
fn failing_error_dispatch_service_does_not_stop_the_next() {
    struct Flaky;

    impl ErrorDispatch for Flaky {
        fn error_dispatch(&self, _error: &Error) -> Result<(), BoxError> {
            Err("pager offline".into())
        }
    }

    impl Service for Flaky {
        fn as_error_dispatch(&self) -> Option<&dyn ErrorDispatch> { Some(self) }
    }

    struct Crashy;

    impl ErrorDispatch for Crashy {
        fn error_dispatch(&self, _error: &Error) -> Result<(), BoxError> {
            panic!("reporter crashed")
        }
    }

    impl Service for Crashy {
        fn as_error_dispatch(&self) -> Option<&dyn ErrorDispatch> { Some(self) }
    }

    let log = Log::default();
    let mut app = Pipeline::new();
    app.service(Flaky).service(Crashy).service(Reporter(Rc::clone(&log)));
    app.get("/fail", || -> Result<(), BoxError> { Err("boom".into()) });

    let err = app.route("GET", "/fail").unwrap_err();
    assert_eq!(err.to_string(), "handler failed: boom");
    assert_eq!(
        *log.borrow(),
        ["reporter:handle:handler", "reporter:error_dispatch", "reporter:destruct"],
    );
}
