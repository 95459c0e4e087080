//! Client error model.
//!
//! Three layers, mirroring where a failure is detected:
//! - [`TransportError`]: the request never produced an HTTP response.
//! - [`ApiError`]: what the adapter hands back to callers for any failed call.
//! - [`SessionError`] / [`ViewError`]: what the session store and the view
//!   controllers surface to the user.

use reqwest::StatusCode;
use thiserror::Error;

use stockroom_auth::AuthzError;
use stockroom_core::DomainError;

/// Longest response body excerpt kept in an error.
const BODY_EXCERPT_LIMIT: usize = 512;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Coarse classification used for user-facing messaging.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing credentials.
    AuthenticationFailure,
    /// Signed in, but not allowed (e.g. non-staff mutation).
    AuthorizationFailure,
    /// Anything else: connectivity, server errors, unexpected payloads.
    NetworkOrServer,
}

/// A failed backend call, returned unchanged from the adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("API error ({status}): {body}")]
    Status { status: StatusCode, body: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build the error for a non-2xx response.
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let excerpt: String = text.chars().take(BODY_EXCERPT_LIMIT).collect();
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(excerpt),
            _ => ApiError::Status {
                status,
                body: excerpt,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Unauthorized => ErrorKind::AuthenticationFailure,
            ApiError::Forbidden(_) => ErrorKind::AuthorizationFailure,
            ApiError::Status { .. } | ApiError::Transport(_) | ApiError::Decode(_) => {
                ErrorKind::NetworkOrServer
            }
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Message shown for every failed login, whatever the cause.
pub const LOGIN_FAILED_MESSAGE: &str = "Failed to login. Please check your credentials.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Deliberately carries no detail about which part of the credentials failed.
    #[error("{}", LOGIN_FAILED_MESSAGE)]
    AuthenticationFailed,
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::AuthenticationFailure
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    NotPermitted(#[from] AuthzError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("no form is open")]
    NoOpenForm,
}

impl ViewError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ViewError::Validation(_) | ViewError::NoOpenForm => None,
            ViewError::NotPermitted(AuthzError::Unauthenticated) => {
                Some(ErrorKind::AuthenticationFailure)
            }
            ViewError::NotPermitted(AuthzError::Forbidden(_)) => {
                Some(ErrorKind::AuthorizationFailure)
            }
            ViewError::Api(err) => Some(err.kind()),
        }
    }
}
