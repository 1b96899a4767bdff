use std::fmt;

use crate::config::constants::PIN_LENGTH;
use crate::config::{SecurityPin, StudyMateConfig};
use crate::security::error::{incomplete_pin, no_pending_action, PinResult};

type ProtectedAction = Box<dyn FnOnce() + Send + 'static>;

/// What [`PinGate::request`] did with the action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    /// No PIN is configured; the action already ran.
    Ran,
    /// The action is parked until the PIN is entered.
    PinRequired,
}

/// Result of a verification attempt or of a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinOutcome {
    /// Fewer than [`PIN_LENGTH`] digits entered so far.
    Incomplete { entered: usize },
    /// The pending action ran and the gate is idle again.
    Accepted,
    /// Wrong PIN: input cleared, action still pending.
    Rejected,
}

/// Gate in front of sensitive actions. The PIN is asked for on every protected action.
pub struct PinGate {
    pin: Option<SecurityPin>,
    input: String,
    pending: Option<ProtectedAction>,
}

impl fmt::Debug for PinGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinGate")
            .field("enabled", &self.is_enabled())
            .field("entered", &self.input.len())
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl PinGate {
    pub fn new(pin: Option<SecurityPin>) -> Self {
        Self {
            pin,
            input: String::new(),
            pending: None,
        }
    }

    pub fn from_config(config: &StudyMateConfig) -> Self {
        Self::new(config.security_pin.clone())
    }

    pub fn is_enabled(&self) -> bool {
        self.pin.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Digits typed so far.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Runs `action` now when the gate is disabled, otherwise parks it (replacing any
    /// previously parked action) and starts a fresh PIN entry.
    pub fn request<F>(&mut self, action: F) -> GateState
    where
        F: FnOnce() + Send + 'static,
    {
        if self.pin.is_none() {
            action();
            return GateState::Ran;
        }
        self.pending = Some(Box::new(action));
        self.input.clear();
        GateState::PinRequired
    }

    /// Appends one digit; the entry is verified as soon as it reaches [`PIN_LENGTH`] digits.
    /// Values above 9 are ignored.
    pub fn press_digit(&mut self, digit: u8) -> PinResult<PinOutcome> {
        if self.pending.is_none() {
            return Err(no_pending_action());
        }
        if digit <= 9 && self.input.len() < PIN_LENGTH {
            self.input.push(char::from(b'0' + digit));
        }
        if self.input.len() == PIN_LENGTH {
            Ok(self.verify())
        } else {
            Ok(PinOutcome::Incomplete {
                entered: self.input.len(),
            })
        }
    }

    pub fn delete_digit(&mut self) {
        self.input.pop();
    }

    /// Replaces the entry with the digits of `text`, truncated to [`PIN_LENGTH`].
    pub fn set_input(&mut self, text: &str) {
        self.input = text
            .chars()
            .filter(char::is_ascii_digit)
            .take(PIN_LENGTH)
            .collect();
    }

    /// Verifies the current entry explicitly. A short entry is kept so it can be completed.
    pub fn submit(&mut self) -> PinResult<PinOutcome> {
        if self.pending.is_none() {
            return Err(no_pending_action());
        }
        if self.input.len() != PIN_LENGTH {
            return Err(incomplete_pin(PIN_LENGTH));
        }
        Ok(self.verify())
    }

    /// Drops the parked action and the entry. Returns whether an action was parked.
    pub fn cancel(&mut self) -> bool {
        self.input.clear();
        self.pending.take().is_some()
    }

    fn verify(&mut self) -> PinOutcome {
        let accepted = self
            .pin
            .as_ref()
            .is_some_and(|pin| pin.matches(&self.input));
        self.input.clear();
        if !accepted {
            return PinOutcome::Rejected;
        }
        if let Some(action) = self.pending.take() {
            action();
        }
        PinOutcome::Accepted
    }
}
