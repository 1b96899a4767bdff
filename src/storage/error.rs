use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageErrorCode {
    Unknown,
    InvalidArgument,
    NoDefaultBucket,
    ObjectNotFound,
    NoDownloadUrl,
    InternalError,
}

impl StorageErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageErrorCode::Unknown => "storage/unknown",
            StorageErrorCode::InvalidArgument => "storage/invalid-argument",
            StorageErrorCode::NoDefaultBucket => "storage/no-default-bucket",
            StorageErrorCode::ObjectNotFound => "storage/object-not-found",
            StorageErrorCode::NoDownloadUrl => "storage/no-download-url",
            StorageErrorCode::InternalError => "storage/internal-error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageError {
    pub code: StorageErrorCode,
    message: String,
    pub status: Option<u16>,
    pub server_response: Option<String>,
}

impl StorageError {
    pub fn new(code: StorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            server_response: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_server_response(mut self, response: impl Into<String>) -> Self {
        self.server_response = Some(response.into());
        self
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(server) = &self.server_response {
            write!(f, "{} ({}): {}", self.message, self.code_str(), server)
        } else {
            write!(f, "{} ({})", self.message, self.code_str())
        }
    }
}

impl Error for StorageError {}

pub type StorageResult<T> = Result<T, StorageError>;

pub fn unknown_error(message: impl Into<String>) -> StorageError {
    StorageError::new(StorageErrorCode::Unknown, message)
}

pub fn invalid_argument(message: impl Into<String>) -> StorageError {
    StorageError::new(StorageErrorCode::InvalidArgument, message)
}

pub fn no_default_bucket() -> StorageError {
    StorageError::new(
        StorageErrorCode::NoDefaultBucket,
        "No storage bucket is configured for uploads.",
    )
}

pub fn object_not_found(path: &str) -> StorageError {
    StorageError::new(
        StorageErrorCode::ObjectNotFound,
        format!("Object '{path}' does not exist."),
    )
}

pub fn no_download_url(path: &str) -> StorageError {
    StorageError::new(
        StorageErrorCode::NoDownloadUrl,
        format!("Object '{path}' does not expose a download URL."),
    )
}

pub fn internal_error(message: impl Into<String>) -> StorageError {
    StorageError::new(StorageErrorCode::InternalError, message)
}
