//! Text analysis adapters.

use std::sync::Arc;

use serde_json::Value;

use super::payload::{
    self, Difficulty, Emotions, Entities, FromPayload, KeywordScore, Keywords, Parsed, Readability,
    Sentiment, SentimentKind, WordFrequency,
};
use super::{failure_notice, LifecycleAdapter, RenderAdapter, ToolView};
use crate::format;
use crate::visual::{Badge, VisualNode};

/// Sentence preview length in the "analyzing" indicator.
const SENTENCE_PREVIEW_CHARS: usize = 50;

const EMOTION_ICONS: &[(&str, &str)] = &[
    ("joy", "😄"),
    ("sadness", "😢"),
    ("anger", "😠"),
    ("fear", "😨"),
    ("surprise", "😲"),
    ("neutral", "😐"),
    ("other", "🎭"),
];

/// (icon, color class) per entity category.
const ENTITY_STYLES: &[(&str, (&str, &str))] = &[
    ("people", ("👤", "bg-blue-100 text-blue-800")),
    ("places", ("📍", "bg-green-100 text-green-800")),
    ("organizations", ("🏢", "bg-purple-100 text-purple-800")),
    ("dates", ("📅", "bg-orange-100 text-orange-800")),
    ("other", ("🔖", "bg-gray-100 text-gray-800")),
];

/// (icon, color class) per sentiment.
fn sentiment_style(kind: SentimentKind) -> (&'static str, &'static str) {
    match kind {
        SentimentKind::Positive => ("😊", "text-green-600"),
        SentimentKind::Negative => ("😞", "text-red-600"),
        SentimentKind::Neutral => ("😐", "text-gray-600"),
    }
}

fn difficulty_color(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "bg-green-100 text-green-800",
        Difficulty::Medium => "bg-yellow-100 text-yellow-800",
        Difficulty::Hard | Difficulty::Unrecognized => "bg-red-100 text-red-800",
    }
}

pub fn sentiment() -> Arc<dyn RenderAdapter> {
    Arc::new(LifecycleAdapter(SentimentView))
}

pub fn keywords() -> Arc<dyn RenderAdapter> {
    Arc::new(LifecycleAdapter(KeywordsView))
}

pub fn emotions() -> Arc<dyn RenderAdapter> {
    Arc::new(LifecycleAdapter(EmotionsView))
}

pub fn entities() -> Arc<dyn RenderAdapter> {
    Arc::new(LifecycleAdapter(EntitiesView))
}

pub fn readability() -> Arc<dyn RenderAdapter> {
    Arc::new(LifecycleAdapter(ReadabilityView))
}

pub fn word_frequency() -> Arc<dyn RenderAdapter> {
    Arc::new(LifecycleAdapter(WordFrequencyView))
}

// ── Sentiment ─────────────────────────────────────────────────────

pub struct SentimentView;

impl ToolView for SentimentView {
    fn title(&self) -> &str {
        "Sentiment analysis"
    }

    fn executing(&self, args: &Value) -> VisualNode {
        let sentence = args.get("sentence").and_then(Value::as_str).unwrap_or("");
        let message = if sentence.is_empty() {
            "Analyzing sentiment...".to_string()
        } else {
            format!(
                "Analyzing sentiment of: \"{}...\"",
                format::truncate_chars(sentence, SENTENCE_PREVIEW_CHARS)
            )
        };
        VisualNode::progress(message, "bg-green-50")
    }

    fn complete(&self, result: &Value) -> VisualNode {
        // A bare label, so there is no failure payload to look for.
        let sentiment = Sentiment::from_payload(result);
        let (icon, color) = sentiment_style(sentiment.kind);
        let label = if sentiment.label.is_empty() {
            "Unknown".to_string()
        } else {
            format::capitalize(&sentiment.label)
        };
        VisualNode::card(
            "😊",
            "Sentiment Analysis Results",
            vec![VisualNode::Badge(Badge::new(label, color).with_icon(icon))],
        )
    }
}

// ── Keywords ──────────────────────────────────────────────────────

pub struct KeywordsView;

impl ToolView for KeywordsView {
    fn title(&self) -> &str {
        "Keyword extraction"
    }

    fn executing(&self, _args: &Value) -> VisualNode {
        VisualNode::progress("Extracting keywords from text...", "bg-yellow-50")
    }

    fn complete(&self, result: &Value) -> VisualNode {
        let keywords = match payload::parse::<Keywords>(result) {
            Parsed::Data(keywords) => keywords,
            Parsed::Failed(message) => return failure_notice(self.title(), Some(message)),
        };
        let badges = keywords
            .0
            .into_iter()
            .map(|(word, score)| {
                let detail = match score {
                    KeywordScore::Number(n) => format::score(n),
                    KeywordScore::Raw(raw) => raw,
                };
                VisualNode::Badge(Badge::new(word, "bg-yellow-100 text-yellow-800").with_detail(detail))
            })
            .collect();
        VisualNode::card("🔑", "Extracted Keywords", badges)
    }
}

// ── Emotions ──────────────────────────────────────────────────────

pub struct EmotionsView;

impl ToolView for EmotionsView {
    fn title(&self) -> &str {
        "Emotion detection"
    }

    fn executing(&self, _args: &Value) -> VisualNode {
        VisualNode::progress("Detecting emotions in text...", "bg-pink-50")
    }

    fn complete(&self, result: &Value) -> VisualNode {
        let emotions = match payload::parse::<Emotions>(result) {
            Parsed::Data(emotions) => emotions,
            Parsed::Failed(message) => return failure_notice(self.title(), Some(message)),
        };
        let gauges = emotions
            .0
            .into_iter()
            .map(|(emotion, fraction)| {
                let percent = format::clamp_percentage(fraction);
                VisualNode::Gauge {
                    icon: format::pick_icon(&emotion, EMOTION_ICONS, "other")
                        .map(|icon| icon.to_string()),
                    label: format::capitalize(&emotion),
                    percent,
                    caption: format::percent_label(percent),
                }
            })
            .collect();
        VisualNode::card("🎭", "Emotion Detection Results", gauges)
    }
}

// ── Entities ──────────────────────────────────────────────────────

pub struct EntitiesView;

impl ToolView for EntitiesView {
    fn title(&self) -> &str {
        "Entity extraction"
    }

    fn executing(&self, _args: &Value) -> VisualNode {
        VisualNode::progress("Extracting named entities from text...", "bg-indigo-50")
    }

    fn complete(&self, result: &Value) -> VisualNode {
        let entities = match payload::parse::<Entities>(result) {
            Parsed::Data(entities) => entities,
            Parsed::Failed(message) => return failure_notice(self.title(), Some(message)),
        };
        let mut children = vec![
            VisualNode::field("Total Entities", entities.total.to_string()),
            VisualNode::field("Unique Entities", entities.unique.to_string()),
        ];
        for (category, items) in entities.by_type {
            if items.is_empty() {
                continue;
            }
            let (icon, color) = format::pick_icon(&category, ENTITY_STYLES, "other")
                .copied()
                .unwrap_or(("🔖", "bg-gray-100 text-gray-800"));
            children.push(VisualNode::BadgeGroup {
                icon: Some(icon.to_string()),
                title: format::capitalize(&category),
                badges: items.into_iter().map(|item| Badge::new(item, color)).collect(),
            });
        }
        VisualNode::card("🏷️", "Named Entity Recognition", children)
    }
}

// ── Readability ───────────────────────────────────────────────────

pub struct ReadabilityView;

impl ToolView for ReadabilityView {
    fn title(&self) -> &str {
        "Readability analysis"
    }

    fn executing(&self, _args: &Value) -> VisualNode {
        VisualNode::progress("Analyzing text readability...", "bg-orange-50")
    }

    fn complete(&self, result: &Value) -> VisualNode {
        let r = match payload::parse::<Readability>(result) {
            Parsed::Data(r) => r,
            Parsed::Failed(message) => return failure_notice(self.title(), Some(message)),
        };
        let label = if r.difficulty_label.trim().is_empty() {
            "Unknown".to_string()
        } else {
            r.difficulty_label.trim().to_string()
        };
        let mut children = vec![
            VisualNode::field("Word Count", r.word_count),
            VisualNode::field("Sentence Count", r.sentence_count),
            VisualNode::field("Avg Word Length", r.avg_word_length),
            VisualNode::field("Avg Sentence Length", r.avg_sentence_length),
            VisualNode::field("Readability Score", r.readability_score),
            VisualNode::Badge(Badge::new(label, difficulty_color(r.difficulty))),
        ];
        if let Some(grade) = r.grade_level {
            children.push(VisualNode::field("Reading Level", grade));
        }
        if let Some(notes) = r.notes {
            children.push(VisualNode::muted(notes));
        }
        VisualNode::card("📖", "Readability Analysis", children)
    }
}

// ── Word frequency ────────────────────────────────────────────────

pub struct WordFrequencyView;

impl ToolView for WordFrequencyView {
    fn title(&self) -> &str {
        "Word frequency"
    }

    fn executing(&self, _args: &Value) -> VisualNode {
        VisualNode::progress("Analyzing word frequency...", "bg-teal-50")
    }

    fn complete(&self, result: &Value) -> VisualNode {
        let frequencies = match payload::parse::<WordFrequency>(result) {
            Parsed::Data(frequencies) => frequencies,
            Parsed::Failed(message) => return failure_notice(self.title(), Some(message)),
        };
        let counts: Vec<f64> = frequencies.0.iter().map(|(_, c)| *c).collect();
        let bars = frequencies
            .0
            .iter()
            .map(|(word, count)| VisualNode::Bar {
                label: word.clone(),
                width: format::relative_width(*count, counts.iter().copied()),
                caption: format::number(*count),
                color: "bg-teal-500".to_string(),
            })
            .collect();
        VisualNode::card("📊", "Word Frequency Analysis", bars)
    }
}
