//! Pure state transition function
//!
//! Submissions are written to the log optimistically and reconciled once the
//! service answers: confirmed with a bot reply, or rolled back with the
//! failure reported on the error channel. History is only changed after the
//! service confirms.

use super::state::{ANALYZE_FALLBACK_ERROR, DELETE_HISTORY_ERROR, LOAD_HISTORY_ERROR};
use super::store::{InvariantViolation, SequenceId};
use super::{ChatState, Effect, Event, SubmitPhase};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("An analysis is already in progress")]
    AnalysisInFlight,
    #[error("Unexpected event: {0}")]
    UnexpectedEvent(String),
    #[error(transparent)]
    InvariantViolation(#[from] InvariantViolation),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs; timestamps
/// arrive on the events.
#[allow(clippy::too_many_lines)]
pub fn transition(state: &ChatState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // ============================================================
        // Submission
        // ============================================================

        // Blank input never reaches the log or the service
        (_, Event::Submit { text, .. }) if is_blank(&text) => {
            Ok(TransitionResult::new(state.clone()))
        }

        // Idle + Submit -> Submitting, optimistic user message
        (SubmitPhase::Idle, Event::Submit { text, at }) => {
            let mut next = state.clone();
            next.error.clear();
            let pending = next.log.append_user(text.clone(), at);
            next.phase = SubmitPhase::Submitting { pending };

            Ok(TransitionResult::new(next)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::ScrollToNewest)
                .with_effect(Effect::request_analysis(pending, text)))
        }

        (SubmitPhase::Submitting { .. }, Event::Submit { .. }) => {
            Err(TransitionError::AnalysisInFlight)
        }

        // Submitting + success -> Idle, bot reply confirms the turn
        (SubmitPhase::Submitting { pending }, Event::AnalysisSucceeded { pending: answered, response, at })
            if pending == answered =>
        {
            let mut next = state.clone();
            next.log.append_bot(response.text, response.sentiment, at);
            next.phase = SubmitPhase::Idle;

            Ok(TransitionResult::new(next).with_effects([
                Effect::PublishState,
                Effect::ScrollToNewest,
                Effect::ClearInput,
            ]))
        }

        // Submitting + failure -> Idle, optimistic message withdrawn.
        // The input buffer is left alone so the text can be retried.
        (SubmitPhase::Submitting { pending }, Event::AnalysisFailed { pending: answered, server_message })
            if pending == answered =>
        {
            let mut next = state.clone();
            rollback_pending(&mut next, pending)?;
            next.error.set(
                server_message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| ANALYZE_FALLBACK_ERROR.to_string()),
            );
            next.phase = SubmitPhase::Idle;

            Ok(TransitionResult::new(next)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::ScrollToNewest))
        }

        (phase, event @ (Event::AnalysisSucceeded { .. } | Event::AnalysisFailed { .. })) => {
            Err(TransitionError::UnexpectedEvent(format!(
                "{} while {}",
                event.kind(),
                describe_phase(phase)
            )))
        }

        // ============================================================
        // Error Channel
        // ============================================================
        (_, Event::DismissError) => {
            let mut next = state.clone();
            next.error.clear();
            Ok(TransitionResult::new(next).with_effect(Effect::PublishState))
        }

        // ============================================================
        // History
        // ============================================================
        (_, Event::LoadHistory { query }) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::RequestHistory { query }))
        }

        (_, Event::HistoryLoaded { query, page }) => {
            let mut next = state.clone();
            next.history.replace(page, query.limit);
            Ok(TransitionResult::new(next)
                .with_effect(Effect::PublishState)
                .with_effect(Effect::RevealHistory))
        }

        (_, Event::HistoryLoadFailed) => {
            let mut next = state.clone();
            next.error.set(LOAD_HISTORY_ERROR);
            Ok(TransitionResult::new(next).with_effect(Effect::PublishState))
        }

        // No optimistic removal: the cache changes only once the service confirms
        (_, Event::DeleteHistory { id }) => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::RequestDelete { id }))
        }

        (_, Event::HistoryDeleted { id }) => {
            let mut next = state.clone();
            next.history.remove(&id);
            Ok(TransitionResult::new(next).with_effect(Effect::PublishState))
        }

        (_, Event::HistoryDeleteFailed) => {
            let mut next = state.clone();
            next.error.set(DELETE_HISTORY_ERROR);
            Ok(TransitionResult::new(next).with_effect(Effect::PublishState))
        }
    }
}

/// True when `text` has nothing to analyze. A byte order mark counts as
/// blank alongside Unicode whitespace.
pub fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || c == '\u{FEFF}')
}

/// Withdraw the optimistic user message for `pending`.
///
/// Anything else at the tail means a reply was already appended for this
/// turn, which no correct sequence of events produces.
fn rollback_pending(state: &mut ChatState, pending: SequenceId) -> Result<(), InvariantViolation> {
    match state.log.last() {
        Some(last) if last.sequence_id == pending => {
            state.log.rollback_last()?;
            Ok(())
        }
        Some(last) => Err(InvariantViolation(format!(
            "rollback of message {pending} but log ends at {}",
            last.sequence_id
        ))),
        None => Err(InvariantViolation(format!(
            "rollback of message {pending} on empty conversation log"
        ))),
    }
}

fn describe_phase(phase: SubmitPhase) -> String {
    match phase {
        SubmitPhase::Idle => "idle".to_string(),
        SubmitPhase::Submitting { pending } => format!("awaiting analysis of message {pending}"),
    }
}
