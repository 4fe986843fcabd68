//! Terminal presentation of the chat state
//!
//! Pure functions from state to text; the terminal host prints them.

use crate::sentiment::{HistoryItem, ScoreField, SentimentLabel, SentimentResult};
use crate::state_machine::{ChatState, HistoryCache, Message, Role};
use crossterm::style::{Color, Stylize};

const EMPTY_CONVERSATION: &str = "Start a conversation by typing a message below!\n\
     I'll analyze the sentiment of your text and tell you if it's positive, negative, or neutral.";
const EMPTY_HISTORY: &str = "No chat history yet";

pub fn label_color(label: SentimentLabel) -> Color {
    match label {
        SentimentLabel::Positive => Color::Green,
        SentimentLabel::Negative => Color::Red,
        SentimentLabel::Neutral => Color::Grey,
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Score breakdown shown under a bot reply
pub fn sentiment_lines(sentiment: &SentimentResult) -> Vec<String> {
    let header = format!("{} {}", sentiment.emoji, sentiment.label.as_str());
    let score_name = match sentiment.score_field {
        ScoreField::Combined => "Combined",
        ScoreField::Compound | ScoreField::Absent => "Compound",
    };

    let mut lines = vec![
        header.with(label_color(sentiment.label)).bold().to_string(),
        format!("Positive: {}", percent(sentiment.scores.pos)),
        format!("Neutral: {}", percent(sentiment.scores.neu)),
        format!("Negative: {}", percent(sentiment.scores.neg)),
        format!("{score_name}: {:.3}", sentiment.combined_score),
    ];
    if let Some(analyzer) = &sentiment.analyzer {
        lines.push(format!("Analyzer: {analyzer}"));
    }
    if let Some(confidence) = sentiment.confidence {
        lines.push(format!("Confidence: {}", percent(confidence)));
    }
    if let Some(agree) = sentiment.models_agree {
        lines.push(format!(
            "Models Agree: {}",
            if agree { "✓ Yes" } else { "✗ No" }
        ));
    }
    lines
}

pub fn message_lines(message: &Message) -> Vec<String> {
    match message.role {
        Role::User => vec![format!("you> {}", message.text)],
        Role::Bot => {
            let mut lines = vec![format!("bot> {}", message.text)];
            if let Some(sentiment) = &message.sentiment {
                lines.extend(sentiment_lines(sentiment).into_iter().map(|l| format!("     {l}")));
            }
            lines
        }
    }
}

pub fn conversation(state: &ChatState) -> String {
    if state.log.is_empty() {
        return EMPTY_CONVERSATION.to_string();
    }
    state
        .log
        .messages()
        .iter()
        .flat_map(message_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn error_banner(state: &ChatState) -> Option<String> {
    state
        .error
        .current()
        .map(|message| format!("{} {message}  (/dismiss)", "!".red().bold()))
}

pub fn status_line(state: &ChatState) -> Option<&'static str> {
    state.phase.is_submitting().then_some("analyzing...")
}

fn history_line(item: &HistoryItem) -> String {
    format!(
        "[{}] {}  {} {}  {}",
        item.id,
        item.timestamp.format("%Y-%m-%d"),
        item.sentiment.emoji,
        item.sentiment
            .label
            .as_str()
            .with(label_color(item.sentiment.label)),
        item.text
    )
}

pub fn history(cache: &HistoryCache) -> String {
    let mut lines = vec!["Chat History".bold().to_string()];
    if cache.items().is_empty() {
        lines.push(EMPTY_HISTORY.to_string());
    } else {
        lines.extend(cache.items().iter().map(history_line));
    }
    if let Some(info) = cache.page_info() {
        lines.push(format!(
            "page {}/{} ({} total)",
            info.page,
            info.pages.max(1),
            info.total
        ));
    }
    lines.join("\n")
}
