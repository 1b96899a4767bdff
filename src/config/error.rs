use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigErrorCode {
    InvalidSecurityPin,
    InvalidValue,
}

impl ConfigErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigErrorCode::InvalidSecurityPin => "config/invalid-security-pin",
            ConfigErrorCode::InvalidValue => "config/invalid-value",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConfigError {
    pub code: ConfigErrorCode,
    message: String,
}

impl ConfigError {
    pub fn new(code: ConfigErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl Error for ConfigError {}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub fn invalid_security_pin(message: impl Into<String>) -> ConfigError {
    ConfigError::new(ConfigErrorCode::InvalidSecurityPin, message)
}

pub fn invalid_value(message: impl Into<String>) -> ConfigError {
    ConfigError::new(ConfigErrorCode::InvalidValue, message)
}
