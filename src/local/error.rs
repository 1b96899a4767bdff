use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocalStorageErrorCode {
    Unavailable,
    QuotaExceeded,
    Serialization,
    Io,
}

impl LocalStorageErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalStorageErrorCode::Unavailable => "local/unavailable",
            LocalStorageErrorCode::QuotaExceeded => "local/quota-exceeded",
            LocalStorageErrorCode::Serialization => "local/serialization",
            LocalStorageErrorCode::Io => "local/io",
        }
    }
}

#[derive(Clone, Debug)]
pub struct LocalStorageError {
    pub code: LocalStorageErrorCode,
    message: String,
}

impl LocalStorageError {
    pub fn new(code: LocalStorageErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for LocalStorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl Error for LocalStorageError {}

pub type LocalStorageResult<T> = Result<T, LocalStorageError>;

pub fn unavailable(message: impl Into<String>) -> LocalStorageError {
    LocalStorageError::new(LocalStorageErrorCode::Unavailable, message)
}

pub fn quota_exceeded(message: impl Into<String>) -> LocalStorageError {
    LocalStorageError::new(LocalStorageErrorCode::QuotaExceeded, message)
}

pub fn serialization_error(message: impl Into<String>) -> LocalStorageError {
    LocalStorageError::new(LocalStorageErrorCode::Serialization, message)
}

pub fn io_error(message: impl Into<String>) -> LocalStorageError {
    LocalStorageError::new(LocalStorageErrorCode::Io, message)
}
