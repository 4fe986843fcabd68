//! Sentiment service payload types
//!
//! Shapes returned by the analysis and history endpoints. The service speaks
//! snake_case and keys history rows by `_id`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Default number of history rows requested per page
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Overall polarity assigned by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

/// Per-polarity fractions, expected to sum to roughly 1
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentScores {
    pub pos: f64,
    pub neu: f64,
    pub neg: f64,
}

/// Which wire field the aggregate score was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreField {
    Combined,
    Compound,
    #[default]
    Absent,
}

/// Analyzer verdict for one piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireSentiment", into = "WireSentiment")]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub emoji: String,
    pub scores: SentimentScores,
    /// Aggregate score in [-1, 1]
    pub combined_score: f64,
    pub score_field: ScoreField,
    pub analyzer: Option<String>,
    pub confidence: Option<f64>,
    /// Only reported by ensemble analyzers
    pub models_agree: Option<bool>,
}

// `combined_score` and the legacy `compound` name the same quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireSentiment {
    label: SentimentLabel,
    emoji: String,
    scores: SentimentScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    combined_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compound: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    models_agree: Option<bool>,
}

impl From<WireSentiment> for SentimentResult {
    fn from(wire: WireSentiment) -> Self {
        let (combined_score, score_field) = match (wire.combined_score, wire.compound) {
            (Some(score), _) => (score, ScoreField::Combined),
            (None, Some(score)) => (score, ScoreField::Compound),
            (None, None) => (0.0, ScoreField::Absent),
        };
        Self {
            label: wire.label,
            emoji: wire.emoji,
            scores: wire.scores,
            combined_score,
            score_field,
            analyzer: wire.analyzer,
            confidence: wire.confidence,
            models_agree: wire.models_agree,
        }
    }
}

impl From<SentimentResult> for WireSentiment {
    fn from(result: SentimentResult) -> Self {
        let (combined_score, compound) = match result.score_field {
            ScoreField::Combined => (Some(result.combined_score), None),
            ScoreField::Compound => (None, Some(result.combined_score)),
            ScoreField::Absent => (None, None),
        };
        Self {
            label: result.label,
            emoji: result.emoji,
            scores: result.scores,
            combined_score,
            compound,
            analyzer: result.analyzer,
            confidence: result.confidence,
            models_agree: result.models_agree,
        }
    }
}

/// Successful body of `POST /api/analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Text to echo back as the bot's message
    pub text: String,
    pub sentiment: SentimentResult,
}

/// One stored analysis from the user's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub text: String,
    pub sentiment: SentimentResult,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Page selector for `GET /api/history`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl HistoryQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }
}

/// Body of `GET /api/history`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryPage {
    pub chats: Vec<HistoryItem>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
}

fn first_page() -> u32 {
    1
}

/// Error body the service returns on failure
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Accepts RFC 3339 as well as the naive UTC form the service emits
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
}
