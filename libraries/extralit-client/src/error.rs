//! Error types for the Extralit client.
//!
//! Two layers: [`ApiError`] is what the HTTP layer observed, [`ClientError`]
//! is what the handle methods report to callers.

use crate::types::UserRole;
use thiserror::Error;

/// Failure observed while talking to the server.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 400
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 401, the API key was rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 409
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// 422, malformed identifier or payload
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Any other non-success status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Connection refused or timed out
    #[error("Server unreachable: {0}")]
    Unreachable(String),

    /// HTTP request failed for another reason
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body or stored document could not be decoded
    #[error("Failed to parse payload: {0}")]
    Payload(String),
}

impl ApiError {
    /// Build the error matching a non-success HTTP status.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::AlreadyExists(message),
            422 => ApiError::Validation(message),
            _ => ApiError::Server { status, message },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, ApiError::AlreadyExists(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

/// Errors returned by workspace, user and schema operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The caller referred to something missing, duplicated or malformed
    #[error("{message}")]
    Value {
        message: String,
        #[source]
        source: Option<ApiError>,
    },

    /// The server or transport failed unexpectedly
    #[error("{message}")]
    Runtime {
        message: String,
        #[source]
        source: Option<ApiError>,
    },

    /// The current user's role does not allow the operation
    #[error("User with role={role} is not allowed to call `{operation}`. Only users with role={allowed:?} are allowed to call this function.")]
    Permission {
        operation: String,
        role: UserRole,
        allowed: Vec<UserRole>,
    },

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Stored credentials missing or unreadable
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// IO error while handling local files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub(crate) fn value(message: impl Into<String>, source: ApiError) -> Self {
        ClientError::Value {
            message: message.into(),
            source: Some(source),
        }
    }

    pub(crate) fn runtime(message: impl Into<String>, source: ApiError) -> Self {
        ClientError::Runtime {
            message: message.into(),
            source: Some(source),
        }
    }

    /// True for errors caused by the caller's input rather than the server.
    pub fn is_value(&self) -> bool {
        matches!(self, ClientError::Value { .. })
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, ClientError::Runtime { .. })
    }

    /// The underlying API error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Value { source, .. } | ClientError::Runtime { source, .. } => {
                source.as_ref()
            }
            _ => None,
        }
    }
}

/// Result type for low-level API calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
