use crate::error::RouterResult;
use crate::http::{Request, Response};
use crate::middleware::{Middleware, Next};

/// Writes the mount point of the handling sub-router into a response header.
///
/// Falls back to the full request path when no mount point is recorded.
#[derive(Clone, Debug)]
pub struct MountPathHeader {
    header: String,
}

impl MountPathHeader {
    pub fn new(header: &str) -> Self {
        Self {
            header: header.to_string(),
        }
    }
}

impl Default for MountPathHeader {
    fn default() -> Self {
        Self::new("url")
    }
}

impl Middleware for MountPathHeader {
    fn call(&self, req: &mut Request, res: &mut Response, mut next: Next<'_>) -> RouterResult<()> {
        let value = req.mount_path.as_deref().unwrap_or(&req.path).to_string();
        res.header(&self.header, value);
        next.run(req, res)
    }
}
