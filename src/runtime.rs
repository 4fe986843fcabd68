//! Runtime for a chat session
//!
//! Hosts the state machine on a tokio task. The host talks to it through a
//! [`SessionHandle`] and renders from the [`SessionUpdate`]s it publishes.

mod executor;
pub mod traits;


pub use executor::SessionRuntime;
pub use traits::*;

use crate::sentiment::HistoryQuery;
use crate::state_machine::{ChatState, Event};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Updates published to the host
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    /// Full state after a change; the host renders from this alone
    State(Arc<ChatState>),
    ScrollToNewest,
    ClearInput,
    RevealHistory,
    /// An event was refused; state is unchanged
    Rejected { reason: String },
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    event_tx: mpsc::Sender<Event>,
}

impl SessionHandle {
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.event_tx
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }

    pub async fn submit(&self, text: impl Into<String>) -> Result<(), String> {
        self.send(Event::submit(text)).await
    }

    pub async fn load_history(&self, query: HistoryQuery) -> Result<(), String> {
        self.send(Event::LoadHistory { query }).await
    }

    pub async fn delete_history(&self, id: impl Into<String>) -> Result<(), String> {
        self.send(Event::DeleteHistory { id: id.into() }).await
    }

    pub async fn dismiss_error(&self) -> Result<(), String> {
        self.send(Event::DismissError).await
    }
}

/// Spawn a session runtime and return its handle along with a receiver that
/// is subscribed before the runtime publishes anything.
pub fn start_session<A, T>(
    api: A,
    tokens: T,
) -> (
    SessionHandle,
    broadcast::Receiver<SessionUpdate>,
    tokio::task::JoinHandle<()>,
)
where
    A: SentimentApi + 'static,
    T: TokenProvider + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (updates_tx, updates_rx) = broadcast::channel(128);

    let runtime = SessionRuntime::new(
        ChatState::new(),
        api,
        tokens,
        event_rx,
        event_tx.clone(),
        updates_tx,
    );
    let join = tokio::spawn(runtime.run());

    (
        SessionHandle { event_tx },
        updates_rx,
        join,
    )
}
