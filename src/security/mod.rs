//! PIN protection for sensitive actions.

pub mod error;
mod pin;

pub use error::{PinError, PinErrorCode, PinResult};
pub use pin::{GateState, PinGate, PinOutcome};
