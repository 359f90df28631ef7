//! # chute
//!
//! Request routing and an ordered middleware pipeline for script-style and
//! monolithic applications. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! The host owns the transport. It reads the request, hands chute a method
//! token and a path, and produces the response from whatever the dispatch
//! hooks did with the handler's result. chute owns what happens in between:
//!
//! - Exact-match routing — one route per path, one script-mode route per method
//! - A fixed execution order — initializers, middleware, pre-handlers,
//!   handler, post-handlers, dispatch, then teardown
//! - A single catch path — the first failure anywhere, panics included,
//!   goes to every error handler exactly once
//! - Services — objects that opt into phases through capability traits
//!
//! What it intentionally leaves out: path patterns, content negotiation,
//! sessions and cookies, serialization.
//!
//! ## Quick start
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use chute::{Error, Pipeline};
//! use serde_json::Value;
//!
//! let log = Rc::new(RefCell::new(Vec::<String>::new()));
//! let mut app = Pipeline::new();
//!
//! let l = Rc::clone(&log);
//! app.initialize(move || l.borrow_mut().push("init".into()));
//!
//! let l = Rc::clone(&log);
//! app.get("/x", || 42).post(move |r: &Value| l.borrow_mut().push(format!("post:{r}")));
//!
//! let l = Rc::clone(&log);
//! app.error_handler(move |e: &Error| l.borrow_mut().push(format!("caught:{e}")));
//!
//! app.route("GET", "/x").unwrap();
//! assert!(app.route("GET", "/missing").is_err());
//!
//! assert_eq!(
//!     *log.borrow(),
//!     ["init", "post:42", "caught:no route registered for `/missing`"],
//! );
//! ```

mod config;
mod error;
mod handler;
mod method;
mod outcome;
mod pipeline;
mod route;
mod view;

pub mod service;

pub use config::{Arguments, Config};
pub use error::{BoxError, Error, InvalidMethod, Panicked, Phase};
pub use handler::{ErrorHook, Handler, HandlerList, spread};
pub use method::Method;
pub use outcome::IntoOutcome;
pub use pipeline::Pipeline;
pub use route::Route;
pub use service::{Service, ServiceRegistry};
pub use view::{Directory, View};
