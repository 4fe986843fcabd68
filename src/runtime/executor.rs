//! Chat session runtime executor

use super::traits::{SentimentApi, TokenProvider};
use super::SessionUpdate;

use crate::client::{ApiError, ApiErrorKind};
use crate::state_machine::{transition, ChatState, Effect, Event, TransitionError};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};

/// Owns the chat state and drives it from a single event loop.
///
/// Remote calls run as background tasks and report back through the same
/// event channel, so every state change happens on this loop.
pub struct SessionRuntime<A, T>
where
    A: SentimentApi + 'static,
    T: TokenProvider + 'static,
{
    state: ChatState,
    api: Arc<A>,
    tokens: Arc<T>,
    event_rx: mpsc::Receiver<Event>,
    /// Weak so that the loop ends once every handle is gone
    event_tx: mpsc::WeakSender<Event>,
    updates_tx: broadcast::Sender<SessionUpdate>,
}

impl<A, T> SessionRuntime<A, T>
where
    A: SentimentApi + 'static,
    T: TokenProvider + 'static,
{
    pub fn new(
        state: ChatState,
        api: A,
        tokens: T,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        updates_tx: broadcast::Sender<SessionUpdate>,
    ) -> Self {
        Self {
            state,
            api: Arc::new(api),
            tokens: Arc::new(tokens),
            event_rx,
            event_tx: event_tx.downgrade(),
            updates_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Starting chat session runtime");

        let initial = Arc::new(self.state.clone());
        let _ = self.updates_tx.send(SessionUpdate::State(initial));

        // Ends once the host drops its handle and in-flight calls have reported back
        while let Some(event) = self.event_rx.recv().await {
            if let Err(e) = self.process_event(event) {
                match &e {
                    TransitionError::InvariantViolation(_) => {
                        tracing::error!(error = %e, "Chat state invariant violated");
                    }
                    TransitionError::AnalysisInFlight | TransitionError::UnexpectedEvent(_) => {
                        tracing::warn!(error = %e, "Event rejected");
                    }
                }
                let _ = self.updates_tx.send(SessionUpdate::Rejected {
                    reason: e.to_string(),
                });
            }
        }

        tracing::info!("Chat session runtime stopped");
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let kind = event.kind();
        let result = transition(&self.state, event)?;
        tracing::debug!(
            event = kind,
            effects = result.effects.len(),
            remote_calls = result.effects.iter().filter(|e| e.is_remote()).count(),
            log_len = result.new_state.log.len(),
            "Applied transition"
        );

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }
        Ok(())
    }

    /// Execute an effect. Remote calls are spawned and answer with an event.
    #[allow(clippy::too_many_lines)]
    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::PublishState => {
                let snapshot = Arc::new(self.state.clone());
                let _ = self.updates_tx.send(SessionUpdate::State(snapshot));
            }

            Effect::ScrollToNewest => {
                let _ = self.updates_tx.send(SessionUpdate::ScrollToNewest);
            }

            Effect::ClearInput => {
                let _ = self.updates_tx.send(SessionUpdate::ClearInput);
            }

            Effect::RevealHistory => {
                let _ = self.updates_tx.send(SessionUpdate::RevealHistory);
            }

            Effect::RequestAnalysis { pending, text } => {
                let api = self.api.clone();
                let tokens = self.tokens.clone();
                let Some(event_tx) = self.event_tx.upgrade() else {
                    tracing::debug!("Session closed, dropping remote call");
                    return;
                };

                tokio::spawn(async move {
                    let token = tokens.bearer_token();
                    let start = Instant::now();
                    let event = match api.analyze(&text, token.as_ref()).await {
                        Ok(response) => {
                            tracing::info!(
                                pending,
                                duration_ms = %start.elapsed().as_millis(),
                                label = response.sentiment.label.as_str(),
                                "Analysis request completed"
                            );
                            Event::AnalysisSucceeded {
                                pending,
                                response,
                                at: chrono::Utc::now(),
                            }
                        }
                        Err(e) => {
                            warn_if_unauthorized(&e);
                            tracing::error!(
                                pending,
                                duration_ms = %start.elapsed().as_millis(),
                                kind = ?e.kind,
                                error = %e,
                                "Analysis request failed"
                            );
                            Event::AnalysisFailed {
                                pending,
                                server_message: e.server_message,
                            }
                        }
                    };
                    let _ = event_tx.send(event).await;
                });
            }

            Effect::RequestHistory { query } => {
                let api = self.api.clone();
                let tokens = self.tokens.clone();
                let Some(event_tx) = self.event_tx.upgrade() else {
                    tracing::debug!("Session closed, dropping remote call");
                    return;
                };

                tokio::spawn(async move {
                    let token = tokens.bearer_token();
                    let event = match api.list_history(query, token.as_ref()).await {
                        Ok(page) => {
                            tracing::info!(
                                page = page.page,
                                count = page.chats.len(),
                                total = page.total,
                                "History loaded"
                            );
                            Event::HistoryLoaded { query, page }
                        }
                        Err(e) => {
                            warn_if_unauthorized(&e);
                            tracing::error!(kind = ?e.kind, error = %e, "History load failed");
                            Event::HistoryLoadFailed
                        }
                    };
                    let _ = event_tx.send(event).await;
                });
            }

            Effect::RequestDelete { id } => {
                let api = self.api.clone();
                let tokens = self.tokens.clone();
                let Some(event_tx) = self.event_tx.upgrade() else {
                    tracing::debug!("Session closed, dropping remote call");
                    return;
                };

                tokio::spawn(async move {
                    let token = tokens.bearer_token();
                    let event = match api.delete_history(&id, token.as_ref()).await {
                        Ok(()) => {
                            tracing::info!(id = %id, "History entry deleted");
                            Event::HistoryDeleted { id }
                        }
                        Err(e) => {
                            warn_if_unauthorized(&e);
                            tracing::error!(id = %id, kind = ?e.kind, error = %e, "History delete failed");
                            Event::HistoryDeleteFailed
                        }
                    };
                    let _ = event_tx.send(event).await;
                });
            }
        }
    }
}

fn warn_if_unauthorized(error: &ApiError) {
    if error.kind == ApiErrorKind::Auth {
        tracing::warn!("Service rejected the session credential; check SENTIMENT_TOKEN or SENTIMENT_TOKEN_FILE");
    }
}
