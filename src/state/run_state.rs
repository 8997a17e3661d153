use crate::AuditError;
use serde::Serialize;

/// Lifecycle of a single audit run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Pending,
    InProgress,
    Done,
}

impl RunState {
    /// Moves to `next`, allowing only `Pending -> InProgress -> Done`
    ///
    /// # Errors
    ///
    /// Returns `AuditError::InvalidTransition` for any other move.
    pub fn transition(&mut self, next: RunState) -> Result<(), AuditError> {
        let allowed = matches!(
            (*self, next),
            (Self::Pending, Self::InProgress) | (Self::InProgress, Self::Done)
        );

        if !allowed {
            return Err(AuditError::InvalidTransition {
                from: *self,
                to: next,
            });
        }

        *self = next;
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        *self == Self::Done
    }
}
