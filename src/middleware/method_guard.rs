use crate::error::{RouterError, RouterResult};
use crate::http::{Method, Request, Response};
use crate::middleware::{Middleware, Next};
use tracing::debug;

pub const INVALID_METHOD_BODY: &str = "Invalid http request method";

/// Rejects requests whose method is outside the allow-list with a 400.
///
/// The rejection is written here and the chain stops, so route handlers
/// never see a disallowed method.
#[derive(Clone, Debug)]
pub struct MethodGuard {
    allowed: Vec<Method>,
}

impl MethodGuard {
    pub fn new(allowed: impl IntoIterator<Item = Method>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn only(method: Method) -> Self {
        Self::new([method])
    }

    pub fn allows(&self, method: Method) -> bool {
        self.allowed.contains(&method)
    }
}

impl Middleware for MethodGuard {
    fn call(&self, req: &mut Request, res: &mut Response, mut next: Next<'_>) -> RouterResult<()> {
        if self.allows(req.method) {
            return next.run(req, res);
        }

        let rejection = RouterError::MethodNotAllowed(req.method);
        debug!(path = %req.path, "{}", rejection);
        res.status(rejection.status_code()).send(INVALID_METHOD_BODY);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::MiddlewareChain;

    fn reached(_req: &mut Request, res: &mut Response) -> RouterResult<()> {
        res.send("reached");
        Ok(())
    }

    fn run(guard: MethodGuard, method: Method) -> Response {
        let mut chain = MiddlewareChain::new();
        chain.add(guard);
        let mut req = Request::new(method, "/medium-clients");
        let mut res = Response::default();
        chain.run(&mut req, &mut res, &reached).unwrap();
        res
    }

    #[test]
    fn allowed_method_continues() {
        let res = run(MethodGuard::only(Method::GET), Method::GET);
        assert_eq!(res.status, 200);
        assert_eq!(res.body_text(), "reached");
    }

    #[test]
    fn other_methods_are_rejected_with_400() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
            let res = run(MethodGuard::only(Method::GET), method);
            assert_eq!(res.status, 400, "{}", method);
            assert_eq!(res.body_text(), INVALID_METHOD_BODY);
        }
    }

    #[test]
    fn allow_list_can_hold_several_methods() {
        let guard = MethodGuard::new([Method::GET, Method::POST]);
        assert!(guard.allows(Method::POST));
        assert!(!guard.allows(Method::DELETE));
    }
}
