use crate::error::RouterError;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::PATCH => "PATCH",
        }
    }
}

impl FromStr for Method {
    type Err = RouterError;

    /// Method tokens are case-sensitive, so `get` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "HEAD" => Ok(Method::HEAD),
            "CONNECT" => Ok(Method::CONNECT),
            "OPTIONS" => Ok(Method::OPTIONS),
            "TRACE" => Ok(Method::TRACE),
            "PATCH" => Ok(Method::PATCH),
            other => Err(RouterError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text or binary payload together with its content type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    pub(crate) content_type: String,
    pub(crate) data: Vec<u8>,
}

impl Body {
    pub fn new() -> Body {
        Body::default()
    }

    pub fn from_string(s: &str) -> Body {
        Body {
            content_type: "text/html; charset=utf-8".to_string(),
            data: s.as_bytes().to_vec(),
        }
    }

    pub fn from_bytes(b: Vec<u8>) -> Body {
        Body {
            content_type: "application/octet-stream".to_string(),
            data: b,
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Body {
        self.content_type = content_type.to_string();
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.data).to_string()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.data.clear();
    }
}

impl From<Vec<u8>> for Body {
    fn from(b: Vec<u8>) -> Body {
        Body::from_bytes(b)
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Body {
        Body::from_string(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Absolute path as received, never rewritten by mounting.
    pub path: String,
    /// Prefix of the sub-router currently handling the request.
    pub mount_path: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Body,
}

impl Request {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            mount_path: None,
            headers: HashMap::new(),
            body: Body::new(),
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_lowercase(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_lowercase()).map(String::as_str)
    }

    /// The path relative to the current mount point.
    ///
    /// Trailing slashes are ignored and an empty remainder becomes `/`, so
    /// `/premium-clients`, `/premium-clients/` and a root mount all yield `/`.
    pub fn sub_path(&self) -> String {
        let rest = match &self.mount_path {
            Some(prefix) => self.path.strip_prefix(prefix.as_str()).unwrap_or(&self.path),
            None => &self.path,
        };
        normalize_path(rest)
    }

    /// Copy of this request scoped to a sub-router mounted at `prefix`.
    pub(crate) fn mounted_at(&self, prefix: &str) -> Request {
        let mut scoped = self.clone();
        scoped.mount_path = Some(prefix.to_string());
        scoped
    }
}

pub(crate) fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parse_is_exhaustive_and_strict() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::GET);
        assert_eq!("PATCH".parse::<Method>().unwrap(), Method::PATCH);
        assert!(matches!("get".parse::<Method>(), Err(RouterError::UnsupportedMethod(m)) if m == "get"));
        assert!("".parse::<Method>().is_err());
        assert!("BREW".parse::<Method>().is_err());
    }

    #[test]
    fn sub_path_strips_mount_prefix() {
        let req = Request::new(Method::GET, "/premium-clients/orders/").mounted_at("/premium-clients");
        assert_eq!(req.sub_path(), "/orders");

        let req = Request::new(Method::GET, "/premium-clients").mounted_at("/premium-clients");
        assert_eq!(req.sub_path(), "/");
    }

    #[test]
    fn sub_path_without_mount_is_normalized_path() {
        assert_eq!(Request::new(Method::GET, "/").sub_path(), "/");
        assert_eq!(Request::new(Method::GET, "/a/b/").sub_path(), "/a/b");
    }

    #[test]
    fn mounted_copy_leaves_original_untouched() {
        let req = Request::new(Method::GET, "/medium-clients");
        let scoped = req.mounted_at("/medium-clients");
        assert_eq!(req.mount_path, None);
        assert_eq!(scoped.mount_path.as_deref(), Some("/medium-clients"));
        assert_eq!(scoped.path, req.path);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new(Method::GET, "/").with_header("X-Trace", "abc");
        assert_eq!(req.get_header("x-trace"), Some("abc"));
        assert_eq!(req.get_header("X-TRACE"), Some("abc"));
    }
}
