//! Generation settings.

use crate::assign::ContentUnit;
use serde::{Deserialize, Serialize};

/// Tunables for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Used when neither the placeholder nor the theme names a typeface.
    default_family: String,

    title_size: f64,
    subtitle_size: f64,
    body_size: f64,
    supplemental_size: f64,

    /// Whether images may be placed outside dedicated image regions.
    free_placement: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            default_family: "Calibri".to_string(),
            title_size: 28.0,
            subtitle_size: 20.0,
            body_size: 18.0,
            supplemental_size: 14.0,
            free_placement: true,
        }
    }
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_family(mut self, family: impl Into<String>) -> Self {
        self.default_family = family.into();
        self
    }

    pub fn with_title_size(mut self, size: f64) -> Self {
        self.title_size = size.max(1.0);
        self
    }

    pub fn with_subtitle_size(mut self, size: f64) -> Self {
        self.subtitle_size = size.max(1.0);
        self
    }

    pub fn with_body_size(mut self, size: f64) -> Self {
        self.body_size = size.max(1.0);
        self
    }

    pub fn with_supplemental_size(mut self, size: f64) -> Self {
        self.supplemental_size = size.max(1.0);
        self
    }

    /// Enable or disable free image placement on layouts without image regions.
    pub fn with_free_placement(mut self, enabled: bool) -> Self {
        self.free_placement = enabled;
        self
    }

    pub fn default_family(&self) -> &str {
        &self.default_family
    }

    pub fn free_placement(&self) -> bool {
        self.free_placement
    }

    /// Base font size for a kind of content, before fitting.
    pub fn base_size(&self, content: &ContentUnit) -> f64 {
        match content {
            ContentUnit::Title(_) => self.title_size,
            ContentUnit::Subtitle(_) => self.subtitle_size,
            ContentUnit::Bullets(_) => self.body_size,
            ContentUnit::Text(_) => self.supplemental_size,
        }
    }
}
