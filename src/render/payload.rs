//! Validated result schemas, one per tool.
//!
//! The agent hands over untyped JSON. Each schema here is parsed exactly once
//! at the adapter boundary and every parse is total: a missing key becomes
//! `0`, an empty string or an empty list, and a value of the wrong type is
//! treated as missing. Adapters then work with plain Rust values.

use serde_json::{Map, Value};

/// A result that is either data or a failure report from the tool itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Data(T),
    /// The tool returned `{"error": "..."}` instead of data.
    Failed(String),
}

/// Total conversion from an untrusted JSON payload.
pub trait FromPayload: Sized {
    fn from_payload(value: &Value) -> Self;
}

/// Parse a completed result, recognising tool-side failure payloads first.
pub fn parse<T: FromPayload>(value: &Value) -> Parsed<T> {
    match tool_failure(value) {
        Some(message) => Parsed::Failed(message),
        None => Parsed::Data(T::from_payload(value)),
    }
}

/// `{"error": "<message>", ...}` is how the analysis tools report that they
/// could not produce data. A numeric `"error"` entry is ordinary data (for
/// example a keyword called "error").
pub fn tool_failure(value: &Value) -> Option<String> {
    value
        .as_object()?
        .get("error")?
        .as_str()
        .map(|message| message.to_string())
}

// ── Lenient field access ──────────────────────────────────────────

fn object(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object()
}

/// Numbers, and strings that parse as numbers.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Strings as-is, numbers and booleans stringified, anything else empty.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn text_field(value: &Value, key: &str) -> String {
    object(value)
        .and_then(|o| o.get(key))
        .map(as_text)
        .unwrap_or_default()
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    object(value).and_then(|o| o.get(key)).and_then(as_number)
}

/// Object entries with numeric values; non-numeric values count as `0`.
fn number_entries(value: &Value) -> Vec<(String, f64)> {
    object(value)
        .map(|o| {
            o.iter()
                .map(|(k, v)| (k.clone(), as_number(v).unwrap_or(0.0)))
                .collect()
        })
        .unwrap_or_default()
}

fn number_list(value: Option<&Value>) -> Vec<f64> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(as_number).collect())
        .unwrap_or_default()
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(as_text)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

// ── Schemas ───────────────────────────────────────────────────────

/// `{title, summary, data: {label: number}, x_label, y_label}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarChart {
    pub title: String,
    pub summary: String,
    pub data: Vec<(String, f64)>,
    pub x_label: String,
    pub y_label: String,
}

impl FromPayload for BarChart {
    fn from_payload(value: &Value) -> Self {
        Self {
            title: text_field(value, "title"),
            summary: text_field(value, "summary"),
            data: object(value)
                .and_then(|o| o.get("data"))
                .map(number_entries)
                .unwrap_or_default(),
            x_label: text_field(value, "x_label"),
            y_label: text_field(value, "y_label"),
        }
    }
}

/// `{title, summary, data: {days: [..], tips: [number]}, x_label, y_label}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScatterPlot {
    pub title: String,
    pub summary: String,
    /// Number of records, taken from `data.days`.
    pub point_count: usize,
    pub tips: Vec<f64>,
    pub x_label: String,
    pub y_label: String,
}

impl FromPayload for ScatterPlot {
    fn from_payload(value: &Value) -> Self {
        let data = object(value).and_then(|o| o.get("data"));
        let days = data
            .and_then(|d| d.get("days"))
            .and_then(Value::as_array)
            .map(Vec::len);
        let tips = number_list(data.and_then(|d| d.get("tips")));
        Self {
            title: text_field(value, "title"),
            summary: text_field(value, "summary"),
            point_count: days.unwrap_or(tips.len()),
            tips,
            x_label: text_field(value, "x_label"),
            y_label: text_field(value, "y_label"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentKind {
    Positive,
    Negative,
    Neutral,
}

/// A bare label: "positive", "negative", anything else is neutral.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentiment {
    pub kind: SentimentKind,
    /// Normalized (trimmed, lower-cased) label; empty when absent.
    pub label: String,
}

impl FromPayload for Sentiment {
    fn from_payload(value: &Value) -> Self {
        let label = value
            .as_str()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();
        let kind = match label.as_str() {
            "positive" => SentimentKind::Positive,
            "negative" => SentimentKind::Negative,
            _ => SentimentKind::Neutral,
        };
        Self { kind, label }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeywordScore {
    Number(f64),
    /// Non-numeric score, shown verbatim.
    Raw(String),
}

/// `{word: score}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keywords(pub Vec<(String, KeywordScore)>);

impl FromPayload for Keywords {
    fn from_payload(value: &Value) -> Self {
        let entries = object(value)
            .map(|o| {
                o.iter()
                    .map(|(word, score)| {
                        let score = match score {
                            Value::Number(n) => KeywordScore::Number(n.as_f64().unwrap_or(0.0)),
                            other => KeywordScore::Raw(as_text(other)),
                        };
                        (word.clone(), score)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self(entries)
    }
}

/// `{emotion: fraction}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Emotions(pub Vec<(String, f64)>);

impl FromPayload for Emotions {
    fn from_payload(value: &Value) -> Self {
        Self(number_entries(value))
    }
}

/// `{total_entities, unique_entities, entities_by_type: {category: [name]}}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entities {
    pub total: u64,
    pub unique: u64,
    /// Categories in payload order, including empty ones.
    pub by_type: Vec<(String, Vec<String>)>,
}

impl FromPayload for Entities {
    fn from_payload(value: &Value) -> Self {
        let count = |key| {
            number_field(value, key)
                .filter(|n| n.is_finite() && *n > 0.0)
                .map(|n| n.round() as u64)
                .unwrap_or(0)
        };
        let by_type = object(value)
            .and_then(|o| o.get("entities_by_type"))
            .and_then(Value::as_object)
            .map(|groups| {
                groups
                    .iter()
                    .map(|(category, items)| (category.clone(), text_list(Some(items))))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            total: count("total_entities"),
            unique: count("unique_entities"),
            by_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    /// Anything outside the closed set; styled like `Hard`.
    Unrecognized,
}

impl Difficulty {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Unrecognized,
        }
    }
}

/// Readability metrics. Metric values are kept as display strings because
/// the agent sends a mix of integers and decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct Readability {
    pub word_count: String,
    pub sentence_count: String,
    pub avg_word_length: String,
    pub avg_sentence_length: String,
    pub readability_score: String,
    pub difficulty: Difficulty,
    pub difficulty_label: String,
    pub grade_level: Option<String>,
    pub notes: Option<String>,
}

impl FromPayload for Readability {
    fn from_payload(value: &Value) -> Self {
        let metric = |key| {
            let field = object(value).and_then(|o| o.get(key));
            match field {
                Some(Value::Number(n)) => crate::format::number(n.as_f64().unwrap_or(0.0)),
                Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
                _ => "0".to_string(),
            }
        };
        let optional = |key| Some(text_field(value, key)).filter(|s| !s.trim().is_empty());
        let difficulty_label = text_field(value, "difficulty_level");
        Self {
            word_count: metric("word_count"),
            sentence_count: metric("sentence_count"),
            avg_word_length: metric("avg_word_length"),
            avg_sentence_length: metric("avg_sentence_length"),
            readability_score: metric("readability_score"),
            difficulty: Difficulty::from_label(&difficulty_label),
            difficulty_label,
            grade_level: optional("reading_grade_level"),
            notes: optional("complexity_notes"),
        }
    }
}

/// `{word: count}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WordFrequency(pub Vec<(String, f64)>);

impl FromPayload for WordFrequency {
    fn from_payload(value: &Value) -> Self {
        Self(number_entries(value))
    }
}
