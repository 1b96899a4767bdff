use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure classes of the remote document store, named after the canonical RPC statuses the
/// REST API reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FirestoreErrorCode {
    InvalidArgument,
    MissingProjectId,
    Internal,
    NotFound,
    PermissionDenied,
    Unauthenticated,
    Unavailable,
    DeadlineExceeded,
    ResourceExhausted,
}

impl FirestoreErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirestoreErrorCode::InvalidArgument => "firestore/invalid-argument",
            FirestoreErrorCode::MissingProjectId => "firestore/missing-project-id",
            FirestoreErrorCode::Internal => "firestore/internal",
            FirestoreErrorCode::NotFound => "firestore/not-found",
            FirestoreErrorCode::PermissionDenied => "firestore/permission-denied",
            FirestoreErrorCode::Unauthenticated => "firestore/unauthenticated",
            FirestoreErrorCode::Unavailable => "firestore/unavailable",
            FirestoreErrorCode::DeadlineExceeded => "firestore/deadline-exceeded",
            FirestoreErrorCode::ResourceExhausted => "firestore/resource-exhausted",
        }
    }

    /// Whether the same request may succeed later without any change on our side.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FirestoreErrorCode::Unavailable
                | FirestoreErrorCode::DeadlineExceeded
                | FirestoreErrorCode::ResourceExhausted
        )
    }
}

#[derive(Clone, Debug)]
pub struct FirestoreError {
    pub code: FirestoreErrorCode,
    message: String,
    http_status: Option<u16>,
}

impl FirestoreError {
    pub fn new(code: FirestoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            http_status: None,
        }
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Status of the HTTP response that carried the error, if one was received.
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn is_transient(&self) -> bool {
        self.code.is_transient()
    }
}

impl Display for FirestoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.http_status {
            Some(status) => write!(f, "{} ({}, HTTP {status})", self.message, self.code_str()),
            None => write!(f, "{} ({})", self.message, self.code_str()),
        }
    }
}

impl Error for FirestoreError {}

impl From<serde_json::Error> for FirestoreError {
    fn from(err: serde_json::Error) -> Self {
        internal_error(format!("malformed document JSON: {err}"))
    }
}

impl From<reqwest::Error> for FirestoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return deadline_exceeded(err.to_string());
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            if err.is_connect() {
                return unavailable(err.to_string());
            }
        }
        internal_error(err.to_string())
    }
}

pub type FirestoreResult<T> = Result<T, FirestoreError>;

pub fn invalid_argument(message: impl Into<String>) -> FirestoreError {
    FirestoreError::new(FirestoreErrorCode::InvalidArgument, message)
}

pub fn missing_project_id() -> FirestoreError {
    FirestoreError::new(
        FirestoreErrorCode::MissingProjectId,
        "A project id is required to reach the remote document store",
    )
}

pub fn internal_error(message: impl Into<String>) -> FirestoreError {
    FirestoreError::new(FirestoreErrorCode::Internal, message)
}

pub fn not_found(message: impl Into<String>) -> FirestoreError {
    FirestoreError::new(FirestoreErrorCode::NotFound, message)
}

pub fn permission_denied(message: impl Into<String>) -> FirestoreError {
    FirestoreError::new(FirestoreErrorCode::PermissionDenied, message)
}

pub fn unauthenticated(message: impl Into<String>) -> FirestoreError {
    FirestoreError::new(FirestoreErrorCode::Unauthenticated, message)
}

pub fn unavailable(message: impl Into<String>) -> FirestoreError {
    FirestoreError::new(FirestoreErrorCode::Unavailable, message)
}

pub fn deadline_exceeded(message: impl Into<String>) -> FirestoreError {
    FirestoreError::new(FirestoreErrorCode::DeadlineExceeded, message)
}

pub fn resource_exhausted(message: impl Into<String>) -> FirestoreError {
    FirestoreError::new(FirestoreErrorCode::ResourceExhausted, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_http_status_when_known() {
        let err = permission_denied("denied");
        assert_eq!(err.to_string(), "denied (firestore/permission-denied)");

        let err = err.with_http_status(403);
        assert_eq!(err.http_status(), Some(403));
        assert_eq!(err.to_string(), "denied (firestore/permission-denied, HTTP 403)");
    }

    #[test]
    fn only_capacity_and_connectivity_failures_are_transient() {
        assert!(unavailable("down").is_transient());
        assert!(deadline_exceeded("slow").is_transient());
        assert!(resource_exhausted("quota").is_transient());
        assert!(!permission_denied("rules").is_transient());
        assert!(!invalid_argument("bad").is_transient());
    }

    #[test]
    fn json_errors_become_internal() {
        let err: FirestoreError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.code, FirestoreErrorCode::Internal);
        assert!(err.message().starts_with("malformed document JSON"));
    }
}
