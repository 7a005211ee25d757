//! Session Error Types
//!
//! This module provides session-specific error variants that integrate
//! with the unified `kernel::error::AppError` system, plus the errors of
//! the two layers underneath: the HTTP transport ([`ApiError`]) and the
//! role resolver ([`ResolveFailure`]).

use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::storage::StorageError;
use thiserror::Error;

/// Session-specific result type alias
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced to callers of the session coordinator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The server denied the credential; the session has been torn down
    #[error("Credential rejected by the server")]
    CredentialRejected,

    /// The identity service could not be reached; the session is unchanged
    #[error("Identity service unavailable: {0}")]
    Transient(String),

    /// A storage substrate refused a write
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration cannot be used
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SessionError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::CredentialRejected => ErrorKind::Unauthorized,
            SessionError::Transient(_) => ErrorKind::ServiceUnavailable,
            SessionError::Storage(_) | SessionError::Config(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether the UI should offer a retry instead of a sign-in prompt
    pub fn is_transient(&self) -> bool {
        matches!(self, SessionError::Transient(_))
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            SessionError::CredentialRejected => err.with_action("Sign in again"),
            SessionError::Transient(_) => err.with_action("Check your connection and retry"),
            SessionError::Storage(_) => {
                err.with_action("Allow site storage in your browser settings")
            }
            SessionError::Config(_) => err,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            SessionError::Storage(e) => {
                tracing::error!(error = %e, "Session storage error");
            }
            SessionError::Config(msg) => {
                tracing::error!(message = %msg, "Session configuration error");
            }
            SessionError::Transient(msg) => {
                tracing::warn!(message = %msg, "Session refresh failed transiently");
            }
            SessionError::CredentialRejected => {
                tracing::info!("Credential rejected, session cleared");
            }
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        err.to_app_error()
    }
}

/// Failure of a single request on the HTTP transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("{path} returned HTTP {status}")]
    Status { status: u16, path: String },

    /// No response (DNS, connection, TLS, timeout)
    #[error("Request to {path} failed: {message}")]
    Network {
        path: String,
        message: String,
        timed_out: bool,
    },

    /// A success status with a body the client cannot use
    #[error("Unexpected response body from {path}: {message}")]
    InvalidBody { path: String, message: String },

    /// The request could not be built (bad path, unserializable body)
    #[error("Invalid request to {path}: {message}")]
    InvalidRequest { path: String, message: String },
}

impl ApiError {
    pub fn status(path: impl Into<String>, status: u16) -> Self {
        ApiError::Status {
            status,
            path: path.into(),
        }
    }

    pub fn network(path: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Network {
            path: path.into(),
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn invalid_body(path: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InvalidBody {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_request(path: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InvalidRequest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classify a transport error from `reqwest`
    pub fn from_reqwest(path: &str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return ApiError::status(path, status.as_u16());
        }
        if err.is_decode() {
            return ApiError::invalid_body(path, err.to_string());
        }
        ApiError::Network {
            path: path.to_string(),
            message: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ApiError::Status { path, .. }
            | ApiError::Network { path, .. }
            | ApiError::InvalidBody { path, .. }
            | ApiError::InvalidRequest { path, .. } => path,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Status { status, .. } => ErrorKind::from_status(*status),
            ApiError::Network {
                timed_out: true, ..
            } => ErrorKind::RequestTimeout,
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::InvalidBody { .. } => ErrorKind::BadGateway,
            ApiError::InvalidRequest { .. } => ErrorKind::BadRequest,
        }
    }

    /// The server rejected the credential (as opposed to "not found" etc.)
    pub fn is_authorization_failure(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    /// Network trouble or a server-side fault; says nothing about the credential
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }

    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        err.to_app_error()
    }
}

/// Outcome of a failed role resolution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveFailure {
    /// No role accepts the credential
    #[error("Credential rejected for every role")]
    CredentialRejected,

    /// At least one probe could not reach a verdict
    #[error("Role probe failed transiently: {0}")]
    Transient(String),

    /// The caller abandoned the resolution
    #[error("Resolution cancelled")]
    Cancelled,
}

impl From<ResolveFailure> for SessionError {
    fn from(failure: ResolveFailure) -> Self {
        match failure {
            ResolveFailure::CredentialRejected => SessionError::CredentialRejected,
            ResolveFailure::Transient(msg) => SessionError::Transient(msg),
            // Never surfaced; the coordinator swallows cancellations before this point.
            ResolveFailure::Cancelled => SessionError::Transient("resolution cancelled".into()),
        }
    }
}
