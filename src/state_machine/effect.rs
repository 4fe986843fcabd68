//! Effects produced by state transitions

use super::store::SequenceId;
use crate::sentiment::HistoryQuery;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Publish the new state to the host
    PublishState,

    /// The log changed; the host should bring the newest entry into view
    ScrollToNewest,

    /// Clear the host's input buffer
    ClearInput,

    /// A history page arrived; the host should show it
    RevealHistory,

    /// Call the analysis endpoint for the optimistic message `pending`
    RequestAnalysis { pending: SequenceId, text: String },

    /// Fetch a history page
    RequestHistory { query: HistoryQuery },

    /// Delete one history entry on the service
    RequestDelete { id: String },
}

impl Effect {
    pub fn request_analysis(pending: SequenceId, text: impl Into<String>) -> Self {
        Effect::RequestAnalysis {
            pending,
            text: text.into(),
        }
    }

    /// True for effects that perform a remote call
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Effect::RequestAnalysis { .. } | Effect::RequestHistory { .. } | Effect::RequestDelete { .. }
        )
    }
}
