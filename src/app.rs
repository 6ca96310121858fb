//! Root dispatcher: the entry point the transport calls for every request.
//!
//! A [`Dispatcher`] owns the immutable [`MountTable`] and routes each request
//! to the sub-router mounted on its first path segment.
//!
//! # Examples
//!
//! ```rust
//! use switchyard::app::Dispatcher;
//! use switchyard::http::{Method, Request, Response};
//! use switchyard::router::{build_mount_table, Router};
//!
//! let mut api = Router::new();
//! api.get("/", |_req, res| {
//!     res.send("api root");
//!     Ok(())
//! })
//! .unwrap();
//!
//! let dispatcher = Dispatcher::new(build_mount_table([("/api", api)]).unwrap());
//! let res = dispatcher.respond(&Request::new(Method::GET, "/api"));
//! assert_eq!(res.body_text(), "api root");
//! ```

use crate::config::ServerConfig;
use crate::error::{RouterError, RouterResult};
use crate::http::request::normalize_path;
use crate::http::{Method, Request, Response};
use crate::router::MountTable;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

type ErrorHandler = Arc<dyn Fn(&RouterError, &mut Response) + Send + Sync>;

#[derive(Clone)]
pub struct Dispatcher {
    mounts: Arc<MountTable>,
    root_body: Option<String>,
    on_error: Option<ErrorHandler>,
}

impl Dispatcher {
    pub fn new(mounts: MountTable) -> Self {
        Self::from_config(mounts, &ServerConfig::default())
    }

    pub fn from_config(mounts: MountTable, config: &ServerConfig) -> Self {
        Self {
            mounts: Arc::new(mounts),
            root_body: config.root_placeholder().map(str::to_string),
            on_error: None,
        }
    }

    /// Body served with 200 for `GET /` when no sub-router owns the root.
    pub fn root_body(mut self, body: impl Into<String>) -> Self {
        self.root_body = Some(body.into());
        self
    }

    /// Disables the root placeholder; `GET /` then yields 404.
    pub fn without_root_fallback(mut self) -> Self {
        self.root_body = None;
        self
    }

    /// Replaces the default JSON error rendering. The handler receives the
    /// response as left by the failed chain.
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RouterError, &mut Response) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(handler));
        self
    }

    pub fn mounts(&self) -> &MountTable {
        &self.mounts
    }

    /// Dispatches `req` into `res`. Never fails: routing errors, handler
    /// errors and panics become fallback responses.
    ///
    /// `req` is not modified; sub-routers work on a request-scoped copy.
    pub fn dispatch(&self, req: &Request, res: &mut Response) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.route(req, res)));
        let result = outcome.unwrap_or_else(|payload| {
            Err(RouterError::MiddlewareFault(panic_message(payload.as_ref())))
        });

        if let Err(err) = result {
            match &err {
                RouterError::RouteNotFound { .. } => debug!(method = %req.method, path = %req.path, "{}", err),
                _ => warn!(method = %req.method, path = %req.path, error = %err, "request failed"),
            }
            self.render_error(&err, res);
        }

        debug!(method = %req.method, path = %req.path, status = res.status, "dispatched");
    }

    /// Dispatches into a fresh default response.
    pub fn respond(&self, req: &Request) -> Response {
        let mut res = Response::default();
        self.dispatch(req, &mut res);
        res
    }

    pub fn render_error(&self, err: &RouterError, res: &mut Response) {
        match &self.on_error {
            Some(handler) => handler(err, res),
            None => {
                res.apply_error(err);
            }
        }
    }

    fn route(&self, req: &Request, res: &mut Response) -> RouterResult<()> {
        match self.mounts.lookup(&req.path) {
            Some((prefix, router)) => {
                let mut scoped = req.mounted_at(prefix);
                router.handle(&mut scoped, res)
            }
            None => self.root(req, res),
        }
    }

    fn root(&self, req: &Request, res: &mut Response) -> RouterResult<()> {
        let is_root = normalize_path(&req.path) == "/";
        match (&self.root_body, req.method) {
            (Some(body), Method::GET) if is_root => {
                res.status(200).send(body);
                Ok(())
            }
            (Some(body), Method::HEAD) if is_root => {
                res.status(200).send(body).body.clear();
                Ok(())
            }
            _ => Err(RouterError::RouteNotFound {
                method: req.method,
                path: req.path.clone(),
            }),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mounts", &self.mounts.prefixes())
            .field("root_body", &self.root_body)
            .field("custom_error_handler", &self.on_error.is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::from_fn;
    use crate::router::{build_mount_table, Router};

    fn dispatcher() -> Dispatcher {
        let mut shop = Router::new();
        shop.get("/", |_req, res| {
            res.send("shop");
            Ok(())
        })
        .unwrap()
        .get("/fail", |_req, _res| Err(RouterError::fault("inventory offline")))
        .unwrap()
        .get("/panic", |_req, _res| panic!("handler exploded"))
        .unwrap();

        let mut echo = Router::new();
        echo.middleware(from_fn(|req, res, mut next| {
            let mount = req.mount_path.clone().unwrap_or_default();
            res.header("x-mount", mount).header("x-sub-path", req.sub_path());
            next.run(req, res)
        }));
        echo.get("/deep/path", |_req, res| {
            res.send("deep");
            Ok(())
        })
        .unwrap();

        Dispatcher::new(build_mount_table([("/shop", shop), ("/echo", echo)]).unwrap())
    }

    #[test]
    fn delegates_to_mounted_router() {
        let res = dispatcher().respond(&Request::new(Method::GET, "/shop"));
        assert_eq!(res.status, 200);
        assert_eq!(res.body_text(), "shop");
    }

    #[test]
    fn scoped_request_carries_mount_and_sub_path() {
        let res = dispatcher().respond(&Request::new(Method::GET, "/echo/deep/path"));
        assert_eq!(res.get_header("x-mount"), Some("/echo"));
        assert_eq!(res.get_header("x-sub-path"), Some("/deep/path"));
        assert_eq!(res.body_text(), "deep");
    }

    #[test]
    fn root_fallback_answers_get_only() {
        let dispatcher = dispatcher().root_body("up");
        let res = dispatcher.respond(&Request::new(Method::GET, "/"));
        assert_eq!(res.status, 200);
        assert_eq!(res.body_text(), "up");

        let res = dispatcher.respond(&Request::new(Method::HEAD, "/"));
        assert_eq!(res.status, 200);
        assert!(res.body.is_empty());

        let res = dispatcher.respond(&Request::new(Method::POST, "/"));
        assert_eq!(res.status, 404);
    }

    #[test]
    fn root_fallback_can_be_disabled() {
        let res = dispatcher()
            .without_root_fallback()
            .respond(&Request::new(Method::GET, "/"));
        assert_eq!(res.status, 404);
    }

    #[test]
    fn unmatched_prefix_is_404() {
        let res = dispatcher().respond(&Request::new(Method::GET, "/nowhere"));
        assert_eq!(res.status, 404);
        let body: serde_json::Value = serde_json::from_slice(res.body.as_bytes()).unwrap();
        assert_eq!(body["error"]["message"], "Cannot GET /nowhere");
    }

    #[test]
    fn handler_errors_become_500() {
        let res = dispatcher().respond(&Request::new(Method::GET, "/shop/fail"));
        assert_eq!(res.status, 500);
        assert!(res.body_text().contains("inventory offline"));
    }

    #[test]
    fn panics_become_500() {
        let res = dispatcher().respond(&Request::new(Method::GET, "/shop/panic"));
        assert_eq!(res.status, 500);
        assert!(res.body_text().contains("handler exploded"));
    }

    #[test]
    fn custom_error_handler_is_used() {
        let dispatcher = dispatcher().on_error(|err, res| {
            res.status(err.status_code()).send("custom");
        });
        let res = dispatcher.respond(&Request::new(Method::GET, "/missing"));
        assert_eq!(res.status, 404);
        assert_eq!(res.body_text(), "custom");
    }

    #[test]
    fn dispatch_does_not_modify_the_request() {
        let req = Request::new(Method::GET, "/echo/deep/path");
        let before = req.clone();
        dispatcher().respond(&req);
        assert_eq!(req, before);
    }
}
