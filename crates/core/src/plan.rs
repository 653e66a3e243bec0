//! Slide plan types: the per-slide content requests driving generation.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Hint keywords that ask for visual content.
const VISUAL_KEYWORDS: &[&str] = &["image", "picture", "photo", "visual"];

/// Default layout hint when a plan omits one.
pub const DEFAULT_LAYOUT_HINT: &str = "bullets";

fn default_layout_hint() -> String {
    DEFAULT_LAYOUT_HINT.to_string()
}

/// Whether the slide wants an image, and what kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageIntent {
    #[serde(default)]
    pub want: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Content requested for one slide.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlideContentRequest {
    #[serde(default)]
    pub title: Option<String>,

    /// Bullets in display order.
    #[serde(default)]
    pub bullets: Vec<String>,

    #[serde(default)]
    pub subtitle: Option<String>,

    /// Speaker notes.
    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub image_intent: Option<ImageIntent>,

    #[serde(default = "default_layout_hint")]
    pub layout_hint: String,

    /// Explicitly chosen layout, overriding the hint when valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_index: Option<usize>,
}

impl SlideContentRequest {
    /// Create a request with a title and the default hint.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            layout_hint: default_layout_hint(),
            ..Self::default()
        }
    }

    /// Set the bullets.
    pub fn with_bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bullets = bullets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the layout hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.layout_hint = hint.into();
        self
    }

    /// Set the subtitle.
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Set the speaker notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Ask for an image.
    pub fn with_image(mut self, description: Option<&str>) -> Self {
        self.image_intent = Some(ImageIntent {
            want: true,
            description: description.map(str::to_string),
        });
        self
    }

    /// Pin the slide to a layout index.
    pub fn with_layout_index(mut self, index: usize) -> Self {
        self.layout_index = Some(index);
        self
    }

    /// Title, if present and not blank.
    pub fn title_text(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Subtitle, if present and not blank.
    pub fn subtitle_text(&self) -> Option<&str> {
        non_blank(self.subtitle.as_deref())
    }

    /// Notes, if present and not blank.
    pub fn notes_text(&self) -> Option<&str> {
        non_blank(self.notes.as_deref())
    }

    /// Lower-cased layout hint.
    pub fn hint(&self) -> String {
        self.layout_hint.to_lowercase()
    }

    /// Whether the hint itself names visual content.
    pub fn hint_requests_visual(&self) -> bool {
        let hint = self.hint();
        VISUAL_KEYWORDS.iter().any(|k| hint.contains(k))
    }

    /// Whether dedicated image regions should be filled.
    pub fn wants_visual(&self) -> bool {
        self.image_intent.as_ref().is_some_and(|i| i.want) || self.hint_requests_visual()
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// The ordered list of slide requests for one presentation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlidePlan {
    pub slides: Vec<SlideContentRequest>,
}

impl SlidePlan {
    /// Create a plan from slide requests.
    pub fn new(slides: Vec<SlideContentRequest>) -> Self {
        Self { slides }
    }

    /// Decode a plan from JSON of the form `{"slides": [...]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the plan as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}
