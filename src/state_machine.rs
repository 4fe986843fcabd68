//! Core chat session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.

mod effect;
pub mod event;
pub mod history;
pub mod state;
pub mod store;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use history::HistoryCache;
pub use state::{ChatState, SubmitPhase};
pub use store::{Message, Role};
pub use transition::{is_blank, transition, TransitionError};
