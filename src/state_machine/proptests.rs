//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

#![allow(clippy::cast_possible_wrap)]

use super::state::{ANALYZE_FALLBACK_ERROR, DELETE_HISTORY_ERROR};
use super::store::SequenceId;
use super::*;
use crate::sentiment::{
    AnalyzeResponse, HistoryItem, HistoryPage, HistoryQuery, ScoreField, SentimentLabel,
    SentimentResult, SentimentScores,
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_label() -> impl Strategy<Value = SentimentLabel> {
    prop_oneof![
        Just(SentimentLabel::Positive),
        Just(SentimentLabel::Negative),
        Just(SentimentLabel::Neutral),
    ]
}

fn arb_sentiment() -> impl Strategy<Value = SentimentResult> {
    (
        arb_label(),
        0.0f64..1.0,
        -1.0f64..1.0,
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(label, pos, combined_score, models_agree)| SentimentResult {
            label,
            emoji: "🙂".to_string(),
            scores: SentimentScores {
                pos,
                neu: 1.0 - pos,
                neg: 0.0,
            },
            combined_score,
            score_field: ScoreField::Combined,
            analyzer: None,
            confidence: None,
            models_agree,
        })
}

/// Text with at least one visible character
fn arb_text() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Z0-9!?]{1,20}[ ]{0,2}"
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n\u{FEFF}]{0,6}"
}

fn arb_history_item() -> impl Strategy<Value = HistoryItem> {
    ("[a-f0-9]{6}", arb_text(), arb_sentiment(), 0i64..2_000_000_000).prop_map(
        |(id, text, sentiment, secs)| HistoryItem {
            id,
            text,
            sentiment,
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        },
    )
}

fn arb_history_page() -> impl Strategy<Value = HistoryPage> {
    proptest::collection::vec(arb_history_item(), 0..6).prop_map(|chats| HistoryPage {
        total: chats.len() as u64,
        chats,
        page: 1,
        pages: 1,
    })
}

/// Events a host might deliver in any order, including stale outcomes
fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(Event::submit),
        arb_blank().prop_map(Event::submit),
        Just(Event::DismissError),
        Just(Event::LoadHistory {
            query: HistoryQuery::default()
        }),
        (0u64..6, arb_text(), arb_sentiment()).prop_map(|(pending, text, sentiment)| {
            Event::AnalysisSucceeded {
                pending,
                response: AnalyzeResponse { text, sentiment },
                at: Utc::now(),
            }
        }),
        (0u64..6, proptest::option::of("[a-zA-Z ]{0,20}")).prop_map(
            |(pending, server_message)| Event::AnalysisFailed {
                pending,
                server_message,
            }
        ),
        arb_history_page().prop_map(|page| Event::HistoryLoaded {
            query: HistoryQuery::default(),
            page,
        }),
        Just(Event::HistoryLoadFailed),
        "[a-f0-9]{6}".prop_map(|id| Event::HistoryDeleted { id }),
        Just(Event::HistoryDeleteFailed),
    ]
}

fn submit_and_pending(state: &ChatState, text: &str) -> (ChatState, SequenceId) {
    let result = transition(state, Event::submit(text)).unwrap();
    match result.new_state.phase {
        SubmitPhase::Submitting { pending } => (result.new_state, pending),
        SubmitPhase::Idle => panic!("non-blank submit from Idle must start Submitting"),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_success_grows_log_by_user_then_bot(
        text in arb_text(),
        reply in arb_text(),
        sentiment in arb_sentiment(),
    ) {
        let before = ChatState::new();
        let (submitting, pending) = submit_and_pending(&before, &text);
        let result = transition(&submitting, Event::AnalysisSucceeded {
            pending,
            response: AnalyzeResponse { text: reply.clone(), sentiment: sentiment.clone() },
            at: Utc::now(),
        }).unwrap();

        let log = result.new_state.log.messages();
        prop_assert_eq!(log.len(), before.log.len() + 2);
        prop_assert_eq!(log[0].role, Role::User);
        prop_assert_eq!(&log[0].text, &text);
        prop_assert_eq!(log[1].role, Role::Bot);
        prop_assert_eq!(&log[1].text, &reply);
        prop_assert_eq!(log[1].sentiment.as_ref(), Some(&sentiment));
        prop_assert!(result.effects.contains(&Effect::ClearInput));
        prop_assert_eq!(result.new_state.error.current(), None);
        prop_assert_eq!(result.new_state.phase, SubmitPhase::Idle);
    }

    #[test]
    fn prop_failure_restores_log_and_reports(
        text in arb_text(),
        server_message in proptest::option::of("[a-zA-Z ]{1,20}"),
        prior in proptest::collection::vec(arb_text(), 0..4),
    ) {
        let mut before = ChatState::new();
        for line in &prior {
            before.log.append_user(line.clone(), Utc::now());
        }
        let (submitting, pending) = submit_and_pending(&before, &text);
        let result = transition(&submitting, Event::AnalysisFailed {
            pending,
            server_message: server_message.clone(),
        }).unwrap();

        prop_assert_eq!(result.new_state.log.messages(), before.log.messages());
        let expected = server_message.as_deref().unwrap_or(ANALYZE_FALLBACK_ERROR);
        prop_assert_eq!(result.new_state.error.current(), Some(expected));
        prop_assert!(!result.effects.contains(&Effect::ClearInput));
        prop_assert_eq!(result.new_state.phase, SubmitPhase::Idle);
    }

    #[test]
    fn prop_blank_submit_changes_nothing(
        blank in arb_blank(),
        events in proptest::collection::vec(arb_event(), 0..10),
    ) {
        let mut state = ChatState::new();
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
        }

        let result = transition(&state, Event::submit(blank)).unwrap();
        prop_assert_eq!(&result.new_state, &state);
        prop_assert!(result.effects.is_empty());
        prop_assert!(!result.effects.iter().any(Effect::is_remote));
    }

    #[test]
    fn prop_delete_second_entry(a in arb_history_item(), b in arb_history_item()) {
        prop_assume!(a.id != b.id);
        let mut state = ChatState::new();
        state.history.replace(HistoryPage {
            chats: vec![a.clone(), b.clone()],
            total: 2,
            page: 1,
            pages: 1,
        }, 20);

        let ok = transition(&state, Event::HistoryDeleted { id: b.id.clone() }).unwrap();
        prop_assert_eq!(ok.new_state.history.items(), std::slice::from_ref(&a));

        let failed = transition(&state, Event::HistoryDeleteFailed).unwrap();
        prop_assert_eq!(failed.new_state.history.items(), &[a, b][..]);
        prop_assert_eq!(failed.new_state.error.current(), Some(DELETE_HISTORY_ERROR));
    }

    #[test]
    fn prop_history_load_is_idempotent(page in arb_history_page()) {
        let query = HistoryQuery::default();
        let once = transition(&ChatState::new(), Event::HistoryLoaded { query, page: page.clone() })
            .unwrap()
            .new_state;
        let twice = transition(&once, Event::HistoryLoaded { query, page })
            .unwrap()
            .new_state;
        prop_assert_eq!(once.history, twice.history);
    }

    /// Whatever arrives, a Submitting phase always points at the user
    /// message at the tail of the log, and rejected events change nothing.
    #[test]
    fn prop_submitting_tracks_tail_of_log(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state = ChatState::new();
        for event in events {
            match transition(&state, event) {
                Ok(result) => {
                    let delta = result.new_state.log.len() as i64 - state.log.len() as i64;
                    prop_assert!((-1..=1).contains(&delta));
                    state = result.new_state;
                }
                Err(TransitionError::InvariantViolation(v)) => {
                    prop_assert!(false, "invariant violated: {}", v);
                }
                Err(_) => {}
            }

            if let SubmitPhase::Submitting { pending } = state.phase {
                let last = state.log.last();
                prop_assert!(last.is_some());
                let last = last.unwrap();
                prop_assert_eq!(last.sequence_id, pending);
                prop_assert_eq!(last.role, Role::User);
            }
        }
    }
}
