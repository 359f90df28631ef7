//! Minimal chute example: a few routes, a service, and a simulated host
//! feeding it requests.
//!
//! Run with:
//!   cargo run --example basic

use chute::service::{Dispatch, ErrorDispatch, Service};
use chute::{BoxError, Error, Method, Pipeline};
use serde_json::{Value, json};

fn main() {
    tracing_subscriber::fmt::init();

    let mut app = Pipeline::new();

    app.initialize(|| tracing::info!("request started"))
        .middleware(|| tracing::info!("checking credentials"))
        .service(Printer)
        .destructor(|| tracing::info!("request finished"));

    app.get("/users/42", get_user)
        .pre(|| "alice")
        .post(|user: &Value| tracing::info!(%user, "user served"));
    app.post("/users", create_user);
    app.delete("/users/7", || -> Result<(), BoxError> { Err("users cannot be deleted".into()) });
    app.request_handler(Method::Options, || json!({ "allow": ["GET", "POST", "DELETE"] }));

    // A real host would read these off the wire.
    for (method, path) in [("GET", "/users/42"), ("POST", "/users"), ("DELETE", "/users/7"), ("GET", "/nope")] {
        if let Err(e) = app.route(method, path) {
            tracing::debug!(error = %e, "host saw a failed request");
        }
    }
    if let Err(e) = app.dispatch("OPTIONS") {
        tracing::debug!(error = %e, "host saw a failed dispatch");
    }
}

// GET /users/42 — the pre-handler's result arrives as the argument.
fn get_user(name: &Value) -> Value {
    json!({ "id": 42, "name": name })
}

// POST /users
fn create_user() -> Value {
    json!({ "id": 99, "name": "new_user" })
}

/// Writes successful results and errors to stdout, standing in for the
/// host's response writer.
struct Printer;

impl Dispatch for Printer {
    fn dispatch(&self, result: &Value) -> Result<(), BoxError> {
        println!("200 {result}");
        Ok(())
    }
}

impl ErrorDispatch for Printer {
    fn error_dispatch(&self, error: &Error) -> Result<(), BoxError> {
        let status = match error {
            Error::RouteNotFound(_) => 404,
            Error::MethodMismatch { .. } => 405,
            _ => 500,
        };
        println!("{status} {error}");
        Ok(())
    }
}

impl Service for Printer {
    fn as_dispatch(&self) -> Option<&dyn Dispatch> { Some(self) }
    fn as_error_dispatch(&self) -> Option<&dyn ErrorDispatch> { Some(self) }
}
