use crate::http::Method;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Cannot {method} {path}")]
    RouteNotFound { method: Method, path: String },

    #[error("Method {0} is not allowed on this route")]
    MethodNotAllowed(Method),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported http method: {0}")]
    UnsupportedMethod(String),

    #[error("Middleware fault: {0}")]
    MiddlewareFault(String),

    #[error("Next called more than once by middleware #{position}")]
    NextReused { position: usize },

    #[error("Route {method} {path} is already registered")]
    DuplicateRoute { method: Method, path: String },

    #[error("Prefix {0} is already mounted")]
    DuplicateMount(String),

    #[error("Invalid mount prefix {0:?}: expected a single static segment like \"/users\"")]
    InvalidMountPrefix(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl RouterError {
    pub fn status_code(&self) -> u16 {
        match self {
            RouterError::MethodNotAllowed(_) | RouterError::BadRequest(_) => 400,
            RouterError::RouteNotFound { .. } => 404,
            RouterError::UnsupportedMethod(_) => 501,
            RouterError::MiddlewareFault(_)
            | RouterError::NextReused { .. }
            | RouterError::DuplicateRoute { .. }
            | RouterError::DuplicateMount(_)
            | RouterError::InvalidMountPrefix(_)
            | RouterError::Io(_) => 500,
        }
    }

    /// Wraps any displayable failure raised inside a middleware or handler.
    pub fn fault(msg: impl std::fmt::Display) -> Self {
        RouterError::MiddlewareFault(msg.to_string())
    }
}

pub type RouterResult<T> = Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let not_found = RouterError::RouteNotFound { method: Method::GET, path: "/x".into() };
        assert_eq!(not_found.status_code(), 404);
        assert_eq!(RouterError::MethodNotAllowed(Method::POST).status_code(), 400);
        assert_eq!(RouterError::BadRequest("Invalid request line".into()).status_code(), 400);
        assert_eq!(RouterError::fault("boom").status_code(), 500);
        assert_eq!(RouterError::NextReused { position: 0 }.status_code(), 500);
        assert_eq!(RouterError::UnsupportedMethod("BREW".into()).status_code(), 501);
    }

    #[test]
    fn not_found_message_reads_like_express() {
        let err = RouterError::RouteNotFound { method: Method::DELETE, path: "/a".into() };
        assert_eq!(err.to_string(), "Cannot DELETE /a");
    }
}
