//! Line-oriented terminal host
//!
//! Reads commands from stdin, forwards them to the session, and redraws the
//! screen from the latest published state.

use crate::render;
use crate::runtime::{SessionHandle, SessionUpdate};
use crate::sentiment::HistoryQuery;
use crate::state_machine::{is_blank, ChatState};
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{self, Clear, ClearType},
};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};

const HELP: &str = "Type text to analyze it. Commands: /retry  /history [page]  /delete <id>  /close  /dismiss  /help  /quit";

/// Lines kept for the header, status and prompt when following the tail
const CHROME_LINES: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    Retry,
    History { page: u32 },
    Delete(String),
    CloseHistory,
    Dismiss,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Submit(line.to_string());
        };
        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("retry"), None) => Command::Retry,
            (Some("history"), None) => Command::History { page: 1 },
            (Some("history"), Some(page)) => match page.parse() {
                Ok(page) => Command::History { page },
                Err(_) => Command::Unknown(line.to_string()),
            },
            (Some("delete"), Some(id)) => Command::Delete(id.to_string()),
            (Some("close"), None) => Command::CloseHistory,
            (Some("dismiss"), None) => Command::Dismiss,
            (Some("help"), None) => Command::Help,
            (Some("quit" | "exit"), None) => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Text the user last submitted, kept until an analysis succeeds
#[derive(Debug, Default)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Host-side view of the submission it is waiting on.
///
/// Published state lags behind what the host has sent, so the host tracks
/// its own submission until the runtime reports it settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Awaiting {
    /// Sent, but no published state has shown it in flight yet
    Sent,
    /// Published state has shown it in flight
    InFlight,
}

/// What the host currently shows
#[derive(Debug)]
pub struct View {
    state: Arc<ChatState>,
    input: InputBuffer,
    awaiting: Option<Awaiting>,
    show_history: bool,
    follow_tail: bool,
    notice: Option<String>,
}

impl Default for View {
    fn default() -> Self {
        Self {
            state: Arc::new(ChatState::new()),
            input: InputBuffer::default(),
            awaiting: None,
            show_history: false,
            follow_tail: false,
            notice: None,
        }
    }
}

impl View {
    /// Record text the user is about to submit.
    ///
    /// The buffer keeps the text of the submission in flight; anything typed
    /// while it is pending is rejected by the session and must not replace it.
    pub fn note_submit(&mut self, text: &str) {
        if is_blank(text) || self.awaiting.is_some() {
            return;
        }
        self.input.set(text);
        self.awaiting = Some(Awaiting::Sent);
    }

    /// Updates were dropped; trust the next idle state to settle the submission
    pub fn lagged(&mut self) {
        if self.awaiting.is_some() {
            self.awaiting = Some(Awaiting::InFlight);
        }
    }

    /// Fold a session update into the view
    pub fn apply(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::State(state) => {
                self.awaiting = match (self.awaiting, state.phase.is_submitting()) {
                    (Some(_), true) => Some(Awaiting::InFlight),
                    (Some(Awaiting::InFlight), false) | (None, _) => None,
                    (Some(Awaiting::Sent), false) => Some(Awaiting::Sent),
                };
                self.state = state;
            }
            SessionUpdate::ScrollToNewest => self.follow_tail = true,
            SessionUpdate::ClearInput => self.input.clear(),
            SessionUpdate::RevealHistory => self.show_history = true,
            SessionUpdate::Rejected { reason } => self.notice = Some(reason),
        }
    }

    /// Full screen contents for the current view
    pub fn draw(&self, height: usize) -> String {
        let mut lines = vec!["Sentiment Analysis Chatbot".to_string()];
        if let Some(banner) = render::error_banner(&self.state) {
            lines.push(banner);
        }

        let body = if self.show_history {
            render::history(&self.state.history)
        } else {
            render::conversation(&self.state)
        };
        let body: Vec<&str> = body.lines().collect();
        let budget = height.saturating_sub(CHROME_LINES).max(1);
        let skip = if self.follow_tail && !self.show_history {
            body.len().saturating_sub(budget)
        } else {
            0
        };
        lines.extend(body.iter().skip(skip).map(|l| (*l).to_string()));

        if let Some(status) = render::status_line(&self.state) {
            lines.push(status.to_string());
        } else if !self.input.text().is_empty() && self.state.error.current().is_some() {
            lines.push(format!("/retry to resend: {}", self.input.text()));
        }
        if let Some(notice) = &self.notice {
            lines.push(format!("({notice})"));
        }
        lines.push(HELP.to_string());
        lines.join("\n")
    }
}

fn paint(view: &View) -> io::Result<()> {
    let height = terminal::size().map_or(24, |(_, rows)| usize::from(rows));
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    writeln!(stdout, "{}", view.draw(height))?;
    write!(stdout, "> ")?;
    stdout.flush()
}

/// Drive the session from stdin until the user quits or input ends
pub async fn run(
    handle: &SessionHandle,
    mut updates: broadcast::Receiver<SessionUpdate>,
    history_limit: u32,
) -> io::Result<()> {
    let mut view = View::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    paint(&view)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                view.notice = None;
                let sent = match Command::parse(&line) {
                    Command::Submit(text) => {
                        view.note_submit(&text);
                        view.show_history = false;
                        handle.submit(text).await
                    }
                    Command::Retry => {
                        let text = view.input.text().to_string();
                        view.note_submit(&text);
                        view.show_history = false;
                        handle.submit(text).await
                    }
                    Command::History { page } => {
                        handle.load_history(HistoryQuery::page(page, history_limit)).await
                    }
                    Command::Delete(id) => {
                        if !view.state.history.is_loaded() {
                            view.notice = Some("History not loaded yet; /history shows it".to_string());
                        } else if view.state.history.get(&id).is_none() {
                            view.notice = Some(format!("{id} is not in the loaded history"));
                        }
                        handle.delete_history(id).await
                    }
                    Command::CloseHistory => {
                        view.show_history = false;
                        Ok(())
                    }
                    Command::Dismiss => handle.dismiss_error().await,
                    Command::Help => {
                        view.notice = Some(HELP.to_string());
                        Ok(())
                    }
                    Command::Quit => break,
                    Command::Unknown(raw) => {
                        view.notice = Some(format!("Unknown command: {raw}"));
                        Ok(())
                    }
                };
                if let Err(e) = sent {
                    tracing::error!(error = %e, "Session is no longer running");
                    break;
                }
                paint(&view)?;
            }
            update = updates.recv() => match update {
                Ok(update) => {
                    view.apply(update);
                    paint(&view)?;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Display fell behind session updates");
                    view.lagged();
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}
