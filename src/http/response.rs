use crate::error::{RouterError, RouterResult};
use crate::http::Body;
use serde::Serialize;
use std::collections::HashMap;

/// Accumulator shared, one writer at a time, by every step of a chain.
///
/// Header names are stored lower-cased so `Url` and `url` are the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Body,
}

impl Default for Response {
    fn default() -> Self {
        Response::new(200)
    }
}

impl Response {
    pub fn new(status: u16) -> Response {
        Response {
            status,
            headers: HashMap::new(),
            body: Body::new(),
        }
    }

    // Chainable status setter
    pub fn status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    /// Sets a text body, defaulting the content type the way `res.send` does.
    pub fn send<T: AsRef<str>>(&mut self, body: T) -> &mut Self {
        self.body = Body::from_string(body.as_ref());
        self
    }

    pub fn send_bytes(&mut self, bytes: Vec<u8>) -> &mut Self {
        self.body = Body::from_bytes(bytes);
        self
    }

    pub fn header<K: AsRef<str>, V: AsRef<str>>(&mut self, name: K, value: V) -> &mut Self {
        self.headers
            .insert(name.as_ref().to_lowercase(), value.as_ref().to_string());
        self
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&name.to_lowercase())
    }

    pub fn json<T: Serialize>(&mut self, value: &T) -> RouterResult<&mut Self> {
        let json = serde_json::to_vec(value)
            .map_err(|e| RouterError::fault(format!("JSON serialization error: {}", e)))?;
        self.body = Body::from_bytes(json).with_content_type("application/json");
        Ok(self)
    }

    pub fn text<T: AsRef<str>>(content: T) -> Response {
        let mut response = Response::new(200);
        response.send(content);
        response
    }

    pub fn body_text(&self) -> String {
        self.body.as_string()
    }

    pub fn content_type(&self) -> Option<&str> {
        if self.body.content_type().is_empty() {
            None
        } else {
            Some(self.body.content_type())
        }
    }

    /// Turns this response into the fallback for `err`.
    ///
    /// Status and body are replaced; headers set earlier in the chain stay.
    pub fn apply_error(&mut self, err: &RouterError) -> &mut Self {
        let status = err.status_code();
        let payload = serde_json::json!({
            "error": {
                "message": err.to_string(),
                "status": status
            }
        });
        self.status = status;
        self.body = Body::from_bytes(payload.to_string().into_bytes())
            .with_content_type("application/json");
        self
    }

    pub fn error(err: &RouterError) -> Response {
        let mut response = Response::new(err.status_code());
        response.apply_error(err);
        response
    }
}
