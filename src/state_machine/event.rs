//! Events that can occur in a chat session

use super::store::SequenceId;
use crate::sentiment::{AnalyzeResponse, HistoryPage, HistoryQuery};
use chrono::{DateTime, Utc};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit {
        text: String,
        at: DateTime<Utc>,
    },
    DismissError,
    LoadHistory {
        query: HistoryQuery,
    },
    DeleteHistory {
        id: String,
    },

    // Analysis outcomes, correlated by the optimistic message they answer
    AnalysisSucceeded {
        pending: SequenceId,
        response: AnalyzeResponse,
        at: DateTime<Utc>,
    },
    AnalysisFailed {
        pending: SequenceId,
        /// Message supplied by the service, if any
        server_message: Option<String>,
    },

    // History outcomes
    HistoryLoaded {
        query: HistoryQuery,
        page: HistoryPage,
    },
    HistoryLoadFailed,
    HistoryDeleted {
        id: String,
    },
    HistoryDeleteFailed,
}

impl Event {
    /// Submit `text` stamped with the current time
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit {
            text: text.into(),
            at: Utc::now(),
        }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Submit { .. } => "submit",
            Event::DismissError => "dismiss_error",
            Event::LoadHistory { .. } => "load_history",
            Event::DeleteHistory { .. } => "delete_history",
            Event::AnalysisSucceeded { .. } => "analysis_succeeded",
            Event::AnalysisFailed { .. } => "analysis_failed",
            Event::HistoryLoaded { .. } => "history_loaded",
            Event::HistoryLoadFailed => "history_load_failed",
            Event::HistoryDeleted { .. } => "history_deleted",
            Event::HistoryDeleteFailed => "history_delete_failed",
        }
    }
}
