//! Two-step reset confirmation.

use super::error::SimulatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetState {
    #[default]
    Idle,
    PendingConfirmation,
}

/// Gate in front of the destructive session reset. It only tracks state;
/// the session performs the reset once [`ResetGate::confirm`] succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetGate {
    state: ResetState,
}

impl ResetGate {
    pub fn is_pending(&self) -> bool {
        self.state == ResetState::PendingConfirmation
    }

    pub fn request(&mut self) {
        self.state = ResetState::PendingConfirmation;
    }

    pub fn confirm(&mut self) -> Result<(), SimulatorError> {
        match self.state {
            ResetState::PendingConfirmation => {
                self.state = ResetState::Idle;
                Ok(())
            }
            ResetState::Idle => Err(SimulatorError::ResetNotPending),
        }
    }

    pub fn cancel(&mut self) {
        self.state = ResetState::Idle;
    }
}
