use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PinErrorCode {
    IncompletePin,
    NoPendingAction,
}

impl PinErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinErrorCode::IncompletePin => "security/incomplete-pin",
            PinErrorCode::NoPendingAction => "security/no-pending-action",
        }
    }
}

#[derive(Clone, Debug)]
pub struct PinError {
    pub code: PinErrorCode,
    message: String,
}

impl PinError {
    pub fn new(code: PinErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl Display for PinError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl Error for PinError {}

pub type PinResult<T> = Result<T, PinError>;

pub fn incomplete_pin(expected: usize) -> PinError {
    PinError::new(
        PinErrorCode::IncompletePin,
        format!("The PIN must have {expected} digits"),
    )
}

pub fn no_pending_action() -> PinError {
    PinError::new(
        PinErrorCode::NoPendingAction,
        "No protected action is waiting for a PIN",
    )
}
