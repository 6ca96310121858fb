use crate::error::{RouterError, RouterResult};
use crate::router::Router;
use std::collections::HashMap;
use std::sync::Arc;

/// Prefix → sub-router mapping, read-only once built.
#[derive(Clone, Debug, Default)]
pub struct MountTable {
    mounts: HashMap<String, Arc<Router>>,
}

impl MountTable {
    /// Finds the sub-router owning the first segment of `path`.
    pub fn lookup(&self, path: &str) -> Option<(&str, &Router)> {
        let prefix = first_segment(path)?;
        self.mounts
            .get_key_value(prefix)
            .map(|(prefix, router)| (prefix.as_str(), router.as_ref()))
    }

    pub fn get(&self, prefix: &str) -> Option<&Router> {
        self.mounts.get(prefix).map(Arc::as_ref)
    }

    pub fn prefixes(&self) -> Vec<&str> {
        let mut prefixes: Vec<&str> = self.mounts.keys().map(String::as_str).collect();
        prefixes.sort_unstable();
        prefixes
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

/// Builds the mount table once at startup.
///
/// Each prefix must be a single static segment such as `/medium-clients`
/// (a trailing slash is tolerated) and may be mounted only once.
pub fn build_mount_table<I, P>(sub_routers: I) -> RouterResult<MountTable>
where
    I: IntoIterator<Item = (P, Router)>,
    P: AsRef<str>,
{
    let mut mounts = HashMap::new();
    for (prefix, router) in sub_routers {
        let prefix = validate_prefix(prefix.as_ref())?;
        if mounts.contains_key(&prefix) {
            return Err(RouterError::DuplicateMount(prefix));
        }
        mounts.insert(prefix, Arc::new(router));
    }
    Ok(MountTable { mounts })
}

fn validate_prefix(raw: &str) -> RouterResult<String> {
    let prefix = raw.trim_end_matches('/');
    let segment = prefix
        .strip_prefix('/')
        .ok_or_else(|| RouterError::InvalidMountPrefix(raw.to_string()))?;
    let is_static = !segment.is_empty()
        && !segment.contains(|c: char| matches!(c, '/' | ':' | '*' | '?' | '#') || c.is_whitespace());
    if !is_static {
        return Err(RouterError::InvalidMountPrefix(raw.to_string()));
    }
    Ok(prefix.to_string())
}

/// `/medium-clients/x` → `/medium-clients`; `None` for the root path.
fn first_segment(path: &str) -> Option<&str> {
    let rest = path.strip_prefix('/')?;
    let end = rest.find('/').unwrap_or(rest.len());
    if end == 0 {
        None
    } else {
        Some(&path[..end + 1])
    }
}
