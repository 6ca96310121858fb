mod mount;

pub use mount::{build_mount_table, MountTable};

use crate::error::{RouterError, RouterResult};
use crate::handler::Handler;
use crate::http::request::normalize_path;
use crate::http::{Method, Request, Response};
use crate::middleware::{Middleware, MiddlewareChain};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A group of routes sharing one middleware chain, reachable under a mount
/// prefix once placed in a [`MountTable`].
#[derive(Clone, Default)]
pub struct Router {
    middlewares: MiddlewareChain,
    routes: HashMap<String, HashMap<Method, Arc<dyn Handler>>>,
}

macro_rules! method_route {
    ($name:ident, $method:ident) => {
        pub fn $name<F>(&mut self, path: &str, handler: F) -> RouterResult<&mut Self>
        where
            F: Fn(&mut Request, &mut Response) -> RouterResult<()> + Send + Sync + 'static,
        {
            self.route(Method::$method, path, handler)
        }
    };
}

impl Router {
    pub fn new() -> Self {
        Self {
            middlewares: MiddlewareChain::new(),
            routes: HashMap::new(),
        }
    }

    method_route!(get, GET);
    method_route!(post, POST);
    method_route!(put, PUT);
    method_route!(patch, PATCH);
    method_route!(delete, DELETE);
    method_route!(head, HEAD);
    method_route!(options, OPTIONS);
    method_route!(connect, CONNECT);
    method_route!(trace, TRACE);

    /// Registers `handler` for the exact `(method, path)` pair.
    pub fn route<F>(&mut self, method: Method, path: &str, handler: F) -> RouterResult<&mut Self>
    where
        F: Fn(&mut Request, &mut Response) -> RouterResult<()> + Send + Sync + 'static,
    {
        let path = normalize_path(path);
        let methods = self.routes.entry(path.clone()).or_default();
        if methods.contains_key(&method) {
            return Err(RouterError::DuplicateRoute { method, path });
        }
        methods.insert(method, Arc::new(handler));
        Ok(self)
    }

    /// Appends a middleware; it runs before every route of this router,
    /// including routes registered earlier.
    pub fn middleware(&mut self, middleware: impl Middleware) -> &mut Self {
        self.middlewares.add(middleware);
        self
    }

    pub fn has_route(&self, method: Method, path: &str) -> bool {
        self.routes
            .get(&normalize_path(path))
            .is_some_and(|methods| methods.contains_key(&method))
    }

    /// Methods answerable on `path`, with `HEAD` implied by `GET`.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let Some(methods) = self.routes.get(&normalize_path(path)) else {
            return Vec::new();
        };
        let mut allowed: Vec<Method> = methods.keys().copied().collect();
        if methods.contains_key(&Method::GET) && !methods.contains_key(&Method::HEAD) {
            allowed.push(Method::HEAD);
        }
        allowed.sort_by_key(|m| m.as_str());
        allowed
    }

    /// Runs the chain for `req`, ending in the handler registered for its
    /// method and sub-path.
    ///
    /// The chain runs even when nothing is registered for the pair; the
    /// terminal then fails with [`RouterError::RouteNotFound`].
    pub fn handle(&self, req: &mut Request, res: &mut Response) -> RouterResult<()> {
        let sub_path = req.sub_path();
        let terminal = self.resolve(req.method, &sub_path);
        self.middlewares.run(req, res, &terminal)
    }

    fn resolve(&self, method: Method, sub_path: &str) -> Terminal<'_> {
        let Some(methods) = self.routes.get(sub_path) else {
            return Terminal::NotFound;
        };
        if let Some(handler) = methods.get(&method) {
            return Terminal::Route(handler.as_ref());
        }
        match method {
            Method::HEAD => methods
                .get(&Method::GET)
                .map_or(Terminal::NotFound, |get| Terminal::HeadFromGet(get.as_ref())),
            Method::OPTIONS => Terminal::Options(self.allowed_methods(sub_path)),
            _ => Terminal::NotFound,
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&String> = self.routes.keys().collect();
        paths.sort();
        f.debug_struct("Router")
            .field("middlewares", &self.middlewares)
            .field("paths", &paths)
            .finish()
    }
}

enum Terminal<'r> {
    Route(&'r dyn Handler),
    HeadFromGet(&'r dyn Handler),
    Options(Vec<Method>),
    NotFound,
}

impl Handler for Terminal<'_> {
    fn handle(&self, req: &mut Request, res: &mut Response) -> RouterResult<()> {
        match self {
            Terminal::Route(handler) => handler.handle(req, res),
            Terminal::HeadFromGet(get) => {
                get.handle(req, res)?;
                res.body.clear();
                Ok(())
            }
            Terminal::Options(methods) => {
                let allow = methods
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
                res.header("allow", &allow).send(allow);
                Ok(())
            }
            Terminal::NotFound => Err(RouterError::RouteNotFound {
                method: req.method,
                path: req.path.clone(),
            }),
        }
    }
}
