mod method_guard;
mod mount_header;

pub use method_guard::{MethodGuard, INVALID_METHOD_BODY};
pub use mount_header::MountPathHeader;

use crate::error::{RouterError, RouterResult};
use crate::handler::Handler;
use crate::http::{Request, Response};
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// One step of a sub-router chain.
///
/// An implementation either calls `next.run(req, res)` to continue, or returns
/// without calling it after finalizing `res` itself. Returning `Err` aborts the
/// chain and lets the dispatcher write the fallback response.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> RouterResult<()>;
}

/// One-shot capability to continue the chain past the current middleware.
pub struct Next<'a> {
    rest: &'a [Arc<dyn Middleware>],
    terminal: &'a dyn Handler,
    index: usize,
    consumed: bool,
}

impl<'a> Next<'a> {
    fn new(rest: &'a [Arc<dyn Middleware>], terminal: &'a dyn Handler, index: usize) -> Self {
        Self {
            rest,
            terminal,
            index,
            consumed: false,
        }
    }

    /// Runs the remainder of the chain. A second call fails with
    /// [`RouterError::NextReused`] and runs nothing.
    pub fn run(&mut self, req: &mut Request, res: &mut Response) -> RouterResult<()> {
        if self.consumed {
            let position = self.index.saturating_sub(1);
            error!(position, path = %req.path, "middleware called next more than once");
            return Err(RouterError::NextReused { position });
        }
        self.consumed = true;

        match self.rest.split_first() {
            Some((current, rest)) => {
                current.call(req, res, Next::new(rest, self.terminal, self.index + 1))
            }
            None => self.terminal.handle(req, res),
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.rest.len())
            .field("index", &self.index)
            .field("consumed", &self.consumed)
            .finish()
    }
}

/// Ordered middleware list; insertion order is execution order.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    pub fn run(&self, req: &mut Request, res: &mut Response, terminal: &dyn Handler) -> RouterResult<()> {
        Next::new(&self.middlewares, terminal, 0).run(req, res)
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.middlewares.len())
            .finish()
    }
}

/// Middleware backed by a closure, see [`from_fn`].
pub struct FnMiddleware<F> {
    f: F,
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&mut Request, &mut Response, Next<'_>) -> RouterResult<()> + Send + Sync + 'static,
{
    fn call(&self, req: &mut Request, res: &mut Response, next: Next<'_>) -> RouterResult<()> {
        (self.f)(req, res, next)
    }
}

pub fn from_fn<F>(f: F) -> FnMiddleware<F>
where
    F: Fn(&mut Request, &mut Response, Next<'_>) -> RouterResult<()> + Send + Sync + 'static,
{
    FnMiddleware { f }
}
