//! Domain types describing a template's layouts and placeholder regions.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Semantic role of a placeholder region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceholderRole {
    Title,
    Body,
    Subtitle,
    /// Generic object region; may hold an image.
    Object,
    /// Secondary text region (vertical body text and the like).
    SupplementalText,
    Picture,
    ClipArt,
    Media,
    /// Any raw code without a dedicated role.
    Unknown(u16),
}

impl PlaceholderRole {
    /// Map a raw placeholder type code to its role.
    ///
    /// Codes follow the numbering used for the OOXML placeholder type
    /// enumeration: 1 title, 2 body, 3 centered title, 4 subtitle,
    /// 5 vertical title, 6 vertical body, 7 object, 9 clip art,
    /// 10 media, 17 vertical object, 18 picture.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 | 3 | 5 => Self::Title,
            2 => Self::Body,
            4 => Self::Subtitle,
            6 => Self::SupplementalText,
            7 | 17 => Self::Object,
            9 => Self::ClipArt,
            10 => Self::Media,
            18 => Self::Picture,
            other => Self::Unknown(other),
        }
    }

    /// Whether this region can be replaced by an image.
    pub fn is_image_capable(&self) -> bool {
        matches!(
            self,
            Self::Picture | Self::ClipArt | Self::Media | Self::Object
        )
    }

    /// Whether this region is filled with text by the assignment engine.
    pub fn is_text(&self) -> bool {
        !self.is_image_capable()
    }

    /// Short lowercase name, used in summaries and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Body => "content",
            Self::Subtitle => "subtitle",
            Self::Object => "object/image",
            Self::SupplementalText => "text",
            Self::Picture | Self::ClipArt | Self::Media => "image",
            Self::Unknown(_) => "other",
        }
    }
}

/// Coarse size bucket derived from a region's share of the canvas area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeClass {
    Tiny,
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// Classify by area percentage of the canvas.
    pub fn from_area_percent(percent: f64) -> Self {
        if percent >= 50.0 {
            Self::Large
        } else if percent >= 25.0 {
            Self::Medium
        } else if percent >= 10.0 {
            Self::Small
        } else {
            Self::Tiny
        }
    }
}

/// Font properties sampled from a layout's own text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FontDescriptor {
    /// Typeface name, if the sample run named one.
    pub family: Option<String>,

    /// Size in points, if the sample run set one.
    pub size: Option<f64>,

    pub bold: bool,
    pub italic: bool,
}

/// A single placeholder region on a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderDescriptor {
    pub role: PlaceholderRole,

    /// Raw placeholder type code the role was derived from.
    pub raw_code: u16,

    /// Placeholder index, unique within its layout.
    pub index: u32,

    /// Position and size in inches.
    pub geometry: Rect,

    pub size_class: SizeClass,

    /// Font sampled from the layout, if any.
    pub font: Option<FontDescriptor>,
}

impl PlaceholderDescriptor {
    /// Build a descriptor, deriving role and size class.
    pub fn new(
        raw_code: u16,
        index: u32,
        geometry: Rect,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Self {
        let area_percent = geometry.to_percent(canvas_width, canvas_height).area();
        Self {
            role: PlaceholderRole::from_code(raw_code),
            raw_code,
            index,
            geometry,
            size_class: SizeClass::from_area_percent(area_percent),
            font: None,
        }
    }

    /// Attach a sampled font.
    pub fn with_font(mut self, font: Option<FontDescriptor>) -> Self {
        self.font = font;
        self
    }
}

/// A named layout and its placeholders, ordered by placeholder index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    pub index: usize,
    pub name: String,
    pub placeholders: Vec<PlaceholderDescriptor>,
}

impl LayoutDescriptor {
    /// Create a layout; placeholders are put into stable index order.
    pub fn new(
        index: usize,
        name: impl Into<String>,
        mut placeholders: Vec<PlaceholderDescriptor>,
    ) -> Self {
        placeholders.sort_by_key(|p| p.index);
        Self {
            index,
            name: name.into(),
            placeholders,
        }
    }

    /// Whether any placeholder has the given role.
    pub fn has_role(&self, role: PlaceholderRole) -> bool {
        self.placeholders.iter().any(|p| p.role == role)
    }

    /// Number of placeholders with the given role.
    pub fn count_role(&self, role: PlaceholderRole) -> usize {
        self.placeholders.iter().filter(|p| p.role == role).count()
    }

    /// Whether any placeholder can take an image.
    pub fn has_image_region(&self) -> bool {
        self.placeholders.iter().any(|p| p.role.is_image_capable())
    }

    /// A layout without placeholders cannot carry content.
    pub fn is_usable(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Find a placeholder by its index.
    pub fn placeholder(&self, index: u32) -> Option<&PlaceholderDescriptor> {
        self.placeholders.iter().find(|p| p.index == index)
    }

    /// One-line description of the layout's composition.
    pub fn summary(&self) -> String {
        let title = self.has_role(PlaceholderRole::Title);
        let content = self.has_role(PlaceholderRole::Body);
        let subtitle = self.has_role(PlaceholderRole::Subtitle);
        let image = self.has_image_region();

        let structure = match (title, content, image, subtitle) {
            (true, true, true, _) => "title + content + image areas",
            (true, true, false, _) => "title + content areas",
            (true, false, true, _) => "title + image areas",
            (true, false, false, true) => "title + subtitle areas",
            (true, false, false, false) => "title-focused layout",
            (false, true, _, _) => "content-focused layout",
            _ => "basic layout",
        };

        let mut parts = Vec::new();
        if !self.name.is_empty() && self.name != "Layout" && self.name != "Slide Layout" {
            parts.push(format!("'{}' layout", self.name));
        }
        parts.push(structure.to_string());

        let mut names: Vec<&str> = self.placeholders.iter().map(|p| p.role.name()).collect();
        names.sort_unstable();
        names.dedup();
        if !names.is_empty() {
            parts.push(format!("Contains: {}", names.join(", ")));
        }

        parts.join(" - ")
    }
}

/// The analysed structure of a template, read-only for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateStructure {
    /// Canvas width in inches.
    pub width: f64,

    /// Canvas height in inches.
    pub height: f64,

    pub layouts: Vec<LayoutDescriptor>,
}

impl TemplateStructure {
    /// Create a structure from canvas size and layouts.
    pub fn new(width: f64, height: f64, layouts: Vec<LayoutDescriptor>) -> Self {
        Self {
            width,
            height,
            layouts,
        }
    }

    /// Width divided by height, rounded to four places.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height <= 0.0 {
            return 0.0;
        }
        (self.width / self.height * 10_000.0).round() / 10_000.0
    }

    /// Canvas area in square inches.
    pub fn canvas_area(&self) -> f64 {
        self.width * self.height
    }

    /// Look up a layout by index.
    pub fn layout(&self, index: usize) -> Option<&LayoutDescriptor> {
        self.layouts.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ph(code: u16, index: u32, geometry: Rect) -> PlaceholderDescriptor {
        PlaceholderDescriptor::new(code, index, geometry, 10.0, 7.5)
    }

    #[test]
    fn test_role_table() {
        assert_eq!(PlaceholderRole::from_code(1), PlaceholderRole::Title);
        assert_eq!(PlaceholderRole::from_code(3), PlaceholderRole::Title);
        assert_eq!(PlaceholderRole::from_code(2), PlaceholderRole::Body);
        assert_eq!(PlaceholderRole::from_code(4), PlaceholderRole::Subtitle);
        assert_eq!(
            PlaceholderRole::from_code(6),
            PlaceholderRole::SupplementalText
        );
        assert_eq!(PlaceholderRole::from_code(7), PlaceholderRole::Object);
        assert_eq!(PlaceholderRole::from_code(9), PlaceholderRole::ClipArt);
        assert_eq!(PlaceholderRole::from_code(10), PlaceholderRole::Media);
        assert_eq!(PlaceholderRole::from_code(18), PlaceholderRole::Picture);
        assert_eq!(PlaceholderRole::from_code(12), PlaceholderRole::Unknown(12));
    }

    #[test]
    fn test_image_capable_roles() {
        assert!(PlaceholderRole::Picture.is_image_capable());
        assert!(PlaceholderRole::Object.is_image_capable());
        assert!(!PlaceholderRole::Body.is_image_capable());
        assert!(!PlaceholderRole::Unknown(8).is_image_capable());
    }

    #[test]
    fn test_size_class() {
        assert_eq!(SizeClass::from_area_percent(80.0), SizeClass::Large);
        assert_eq!(SizeClass::from_area_percent(50.0), SizeClass::Large);
        assert_eq!(SizeClass::from_area_percent(30.0), SizeClass::Medium);
        assert_eq!(SizeClass::from_area_percent(10.0), SizeClass::Small);
        assert_eq!(SizeClass::from_area_percent(9.9), SizeClass::Tiny);
    }

    #[test]
    fn test_descriptor_size_class_from_geometry() {
        // 9 x 5 inches on a 10 x 7.5 canvas covers 60%
        let body = ph(2, 1, Rect::new(0.5, 1.5, 9.0, 5.0));
        assert_eq!(body.size_class, SizeClass::Large);

        // 9 x 1.25 inches covers 15%
        let title = ph(1, 0, Rect::new(0.5, 0.3, 9.0, 1.25));
        assert_eq!(title.size_class, SizeClass::Small);
    }

    #[test]
    fn test_layout_sorts_placeholders_by_index() {
        let layout = LayoutDescriptor::new(
            1,
            "Title and Content",
            vec![ph(2, 1, Rect::default()), ph(1, 0, Rect::default())],
        );

        assert_eq!(layout.placeholders[0].index, 0);
        assert_eq!(layout.placeholders[1].index, 1);
        assert!(layout.has_role(PlaceholderRole::Title));
        assert!(layout.is_usable());
    }

    #[test]
    fn test_summary() {
        let layout = LayoutDescriptor::new(
            1,
            "Title and Content",
            vec![ph(1, 0, Rect::default()), ph(2, 1, Rect::default())],
        );
        assert_eq!(
            layout.summary(),
            "'Title and Content' layout - title + content areas - Contains: content, title"
        );

        let blank = LayoutDescriptor::new(6, "Blank", Vec::new());
        assert_eq!(blank.summary(), "'Blank' layout - basic layout");
        assert!(!blank.is_usable());
    }

    #[test]
    fn test_aspect_ratio() {
        let structure = TemplateStructure::new(13.333, 7.5, Vec::new());
        assert_eq!(structure.aspect_ratio(), 1.7777);
    }
}
