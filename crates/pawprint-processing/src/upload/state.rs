use std::fmt::{Display, Formatter, Result as FmtResult};

/// Upload run states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Validating,
    Transforming,
    Uploading,
    Completed,
    Failed,
    Cancelled,
}

impl UploadState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UploadState::Completed | UploadState::Failed | UploadState::Cancelled
        )
    }

    /// Allowed transitions. Steps are strictly sequential; any live state may fail,
    /// only the upload step may be cancelled.
    pub fn can_transition_to(self, next: UploadState) -> bool {
        use UploadState::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Transforming)
                | (Transforming, Uploading)
                | (Uploading, Completed)
                | (Uploading, Cancelled)
                | (Idle | Validating | Transforming | Uploading, Failed)
        )
    }
}

impl Display for UploadState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            UploadState::Idle => "idle",
            UploadState::Validating => "validating",
            UploadState::Transforming => "transforming",
            UploadState::Uploading => "uploading",
            UploadState::Completed => "completed",
            UploadState::Failed => "failed",
            UploadState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// State tracker for one upload attempt
#[derive(Debug, Clone)]
pub struct UploadRun {
    state: UploadState,
    history: Vec<UploadState>,
}

impl Default for UploadRun {
    fn default() -> Self {
        Self {
            state: UploadState::Idle,
            history: vec![UploadState::Idle],
        }
    }
}

impl UploadRun {
    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn history(&self) -> &[UploadState] {
        &self.history
    }

    /// Move to `next`. Illegal transitions are logged and ignored.
    pub fn advance(&mut self, next: UploadState) {
        if !self.state.can_transition_to(next) {
            tracing::error!(from = %self.state, to = %next, "Illegal upload state transition");
            return;
        }
        tracing::debug!(from = %self.state, to = %next, "Upload state transition");
        self.state = next;
        self.history.push(next);
    }

    pub fn into_history(self) -> Vec<UploadState> {
        self.history
    }
}
