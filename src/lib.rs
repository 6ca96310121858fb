//! # Switchyard
//!
//! A small HTTP dispatcher: requests are routed by their first path segment
//! to mounted sub-routers, and each sub-router runs an ordered middleware
//! chain before the route handler.
//!
//! ## Quick Start
//!
//! ```rust
//! use switchyard::app::Dispatcher;
//! use switchyard::http::{Method, Request};
//! use switchyard::middleware::MethodGuard;
//! use switchyard::router::{build_mount_table, Router};
//!
//! let mut reports = Router::new();
//! reports.middleware(MethodGuard::only(Method::GET));
//! reports
//!     .get("/", |_req, res| {
//!         res.send("all reports");
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::new(build_mount_table([("/reports", reports)]).unwrap());
//!
//! let res = dispatcher.respond(&Request::new(Method::DELETE, "/reports"));
//! assert_eq!(res.status, 400);
//! ```
//!
//! ## Middleware
//!
//! A middleware continues the chain by calling `next.run(req, res)` at most
//! once, or finalizes the response and returns without calling it.
//!
//! ```rust
//! use switchyard::middleware::from_fn;
//! use switchyard::router::Router;
//!
//! let mut router = Router::new();
//! router.middleware(from_fn(|req, res, mut next| {
//!     res.header("x-powered-by", "switchyard");
//!     next.run(req, res)
//! }));
//! ```

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod middleware;
pub mod router;
pub mod server;

pub use app::Dispatcher;
pub use error::{RouterError, RouterResult};
pub use http::{Body, Method, Request, Response};
pub use router::{build_mount_table, MountTable, Router};
