//! Visual descriptions produced by render adapters.
//!
//! A [`VisualNode`] tree is derived fresh from the current state of a tool
//! call every time a frame is built. Nothing here is cached or compared by
//! identity; the rendering surface consumes the tree (as JSON or as text)
//! and throws it away.

use serde::Serialize;
use std::fmt::Write as _;

/// Number of character cells a 100% bar occupies in text output.
const TEXT_BAR_CELLS: usize = 30;
/// Number of character cells a 100% gauge occupies in text output.
const TEXT_GAUGE_CELLS: usize = 12;

/// Emphasis for a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Body,
    Muted,
    Strong,
}

/// A small colored label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub text: String,
    /// Color class understood by the rendering surface.
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Badge {
    pub fn new(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: color.into(),
            icon: None,
            detail: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// One presentation primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VisualNode {
    /// Titled container for a finished result.
    Card {
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        title: String,
        children: Vec<VisualNode>,
    },
    Text {
        text: String,
        style: TextStyle,
    },
    /// `label: value` row.
    Field {
        label: String,
        value: String,
    },
    /// Proportional bar; `width` is a percentage in `[0, 100]`.
    Bar {
        label: String,
        width: f64,
        caption: String,
        color: String,
    },
    Badge(Badge),
    /// Titled group of badges sharing one category.
    BadgeGroup {
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        title: String,
        badges: Vec<Badge>,
    },
    /// Percentage gauge; `percent` is in `[0, 100]`.
    Gauge {
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        label: String,
        percent: f64,
        caption: String,
    },
    /// Lightweight "in progress" indicator shown while a tool executes.
    Progress {
        message: String,
        accent: String,
    },
    /// Failure notice.
    Notice {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl VisualNode {
    pub fn card(icon: &str, title: impl Into<String>, children: Vec<VisualNode>) -> Self {
        Self::Card {
            icon: (!icon.is_empty()).then(|| icon.to_string()),
            title: title.into(),
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            style: TextStyle::Body,
        }
    }

    pub fn muted(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            style: TextStyle::Muted,
        }
    }

    pub fn field(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Field {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn progress(message: impl Into<String>, accent: impl Into<String>) -> Self {
        Self::Progress {
            message: message.into(),
            accent: accent.into(),
        }
    }

    pub fn notice(title: impl Into<String>, message: Option<String>) -> Self {
        Self::Notice {
            title: title.into(),
            message,
        }
    }

    /// This node and every node below it, depth first.
    pub fn descendants(&self) -> Vec<&VisualNode> {
        let mut out = vec![self];
        if let VisualNode::Card { children, .. } = self {
            for child in children {
                out.extend(child.descendants());
            }
        }
        out
    }

    /// Plain-text rendering for terminals and logs.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out, 0);
        out
    }

    fn write_text(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match self {
            VisualNode::Card {
                icon,
                title,
                children,
            } => {
                match icon {
                    Some(icon) => {
                        let _ = writeln!(out, "{pad}{icon} {title}");
                    }
                    None => {
                        let _ = writeln!(out, "{pad}{title}");
                    }
                }
                for child in children {
                    child.write_text(out, depth + 1);
                }
            }
            VisualNode::Text { text, style } => {
                let _ = match style {
                    TextStyle::Strong => writeln!(out, "{pad}**{text}**"),
                    _ => writeln!(out, "{pad}{text}"),
                };
            }
            VisualNode::Field { label, value } => {
                let _ = writeln!(out, "{pad}{label}: {value}");
            }
            VisualNode::Bar {
                label,
                width,
                caption,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "{pad}{label:<12} {} {caption}",
                    cells(*width, TEXT_BAR_CELLS)
                );
            }
            VisualNode::Badge(badge) => {
                let _ = writeln!(out, "{pad}{}", badge_text(badge));
            }
            VisualNode::BadgeGroup {
                icon,
                title,
                badges,
            } => {
                let icon = icon.as_deref().map(|i| format!("{i} ")).unwrap_or_default();
                let items: Vec<String> = badges.iter().map(badge_text).collect();
                let _ = writeln!(out, "{pad}{icon}{title}: {}", items.join(" "));
            }
            VisualNode::Gauge {
                icon,
                label,
                percent,
                caption,
            } => {
                let icon = icon.as_deref().map(|i| format!("{i} ")).unwrap_or_default();
                let _ = writeln!(
                    out,
                    "{pad}{icon}{label:<10} {} {caption}",
                    cells(*percent, TEXT_GAUGE_CELLS)
                );
            }
            VisualNode::Progress { message, .. } => {
                let _ = writeln!(out, "{pad}⏳ {message}");
            }
            VisualNode::Notice { title, message } => match message {
                Some(message) => {
                    let _ = writeln!(out, "{pad}⚠️ {title}: {message}");
                }
                None => {
                    let _ = writeln!(out, "{pad}⚠️ {title}");
                }
            },
        }
    }
}

fn badge_text(badge: &Badge) -> String {
    let mut text = String::from("[");
    if let Some(icon) = &badge.icon {
        text.push_str(icon);
        text.push(' ');
    }
    text.push_str(&badge.text);
    if let Some(detail) = &badge.detail {
        let _ = write!(text, " ({detail})");
    }
    text.push(']');
    text
}

/// Draw a bar of `percent` over `total` cells. A zero-width bar still gets a
/// single thin cell so every row keeps the same shape.
fn cells(percent: f64, total: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * total as f64).round() as usize;
    if filled == 0 {
        return format!("▏{}", " ".repeat(total - 1));
    }
    format!("{}{}", "█".repeat(filled), " ".repeat(total - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_kind_tag() {
        let node = VisualNode::Bar {
            label: "Mon".to_string(),
            width: 50.0,
            caption: "$10.00".to_string(),
            color: "bg-blue-500".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"kind": "bar", "label": "Mon", "width": 50.0, "caption": "$10.00", "color": "bg-blue-500"})
        );
    }

    #[test]
    fn badge_flattens_into_node() {
        let node = VisualNode::Badge(Badge::new("Positive", "text-green-600").with_icon("😊"));
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["kind"], "badge");
        assert_eq!(value["text"], "Positive");
        assert_eq!(value["icon"], "😊");
        assert!(value.get("detail").is_none());
    }

    #[test]
    fn descendants_walks_cards() {
        let tree = VisualNode::card(
            "📊",
            "Tips",
            vec![
                VisualNode::text("summary"),
                VisualNode::card("", "inner", vec![VisualNode::field("a", "b")]),
            ],
        );
        assert_eq!(tree.descendants().len(), 4);
    }

    #[test]
    fn text_rendering_draws_minimum_bar() {
        let node = VisualNode::Bar {
            label: "zero".to_string(),
            width: 0.0,
            caption: "0".to_string(),
            color: "bg-teal-500".to_string(),
        };
        let text = node.to_text();
        assert!(text.contains('▏'));
        assert!(text.contains("zero"));
    }

    #[test]
    fn text_rendering_indents_children() {
        let tree = VisualNode::card("📖", "Readability", vec![VisualNode::field("Words", "10")]);
        assert_eq!(tree.to_text(), "📖 Readability\n  Words: 10\n");
    }
}
