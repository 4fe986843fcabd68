//! Chat session state types

use super::history::HistoryCache;
use super::store::{SequenceId, SessionStore};

/// Shown when the service fails an analysis without saying why
pub const ANALYZE_FALLBACK_ERROR: &str = "Failed to analyze sentiment";
pub const LOAD_HISTORY_ERROR: &str = "Failed to load history";
pub const DELETE_HISTORY_ERROR: &str = "Failed to delete chat";

// ============================================================================
// Error Channel
// ============================================================================

/// At most one transient, user-dismissible error. Last writer wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorChannel {
    message: Option<String>,
}

impl ErrorChannel {
    pub fn set(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    pub fn current(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

// ============================================================================
// Submission Phase
// ============================================================================

/// Lifecycle of the analysis coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPhase {
    /// Ready for a new submission
    #[default]
    Idle,

    /// Analysis call in flight for the optimistic user message `pending`
    Submitting { pending: SequenceId },
}

impl SubmitPhase {
    pub fn is_submitting(self) -> bool {
        matches!(self, SubmitPhase::Submitting { .. })
    }
}

// ============================================================================
// Chat State
// ============================================================================

/// Everything the host renders from
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatState {
    pub log: SessionStore,
    pub history: HistoryCache,
    pub error: ErrorChannel,
    pub phase: SubmitPhase,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }
}
