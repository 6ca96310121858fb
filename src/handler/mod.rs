use crate::error::RouterResult;
use crate::http::{Request, Response};

/// Terminal step of a chain: writes the final response for one route.
pub trait Handler: Send + Sync {
    fn handle(&self, req: &mut Request, res: &mut Response) -> RouterResult<()>;
}

impl<F> Handler for F
where
    F: Fn(&mut Request, &mut Response) -> RouterResult<()> + Send + Sync,
{
    fn handle(&self, req: &mut Request, res: &mut Response) -> RouterResult<()> {
        (self)(req, res)
    }
}
