use serde::{Deserialize, Serialize};

/// A tappable suggestion chip (quick reply or card button).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payload: String,
}

/// One card in a media carousel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, rename = "mediaUrl", skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Suggestion>,
}

/// The fields of an RCS document the preview renders. Deliberately lenient:
/// every field defaults and unknown fields are ignored, so any valid JSON
/// object deserializes. The author's full JSON value is what gets sent, not
/// this pruned view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, rename = "quickReplies", skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<Suggestion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<Card>,
}

/// Which of the three mutually exclusive preview layouts a document selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Message,
    Carousel,
    Raw,
}

impl Document {
    /// Classify for rendering. Message wins whenever `text` is present and
    /// non-empty, even if cards are also present; carousel applies whenever
    /// `cards` is non-empty; everything else falls back to the raw view.
    pub fn view_kind(&self) -> ViewKind {
        if self.text.as_deref().is_some_and(|t| !t.is_empty()) {
            ViewKind::Message
        } else if !self.cards.is_empty() {
            ViewKind::Carousel
        } else {
            ViewKind::Raw
        }
    }

    /// Lenient decode from a parsed JSON value. Shapeless values (arrays,
    /// scalars, objects with mismatched field types) become the default
    /// document, which classifies as raw.
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}
