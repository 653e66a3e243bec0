//! Presentation assembler.
//!
//! Takes one slide request at a time through layout selection, content
//! assignment, text fitting and image placement, and hands the finished
//! [`SlideBuild`] to a [`DocumentSink`]. A slide whose layout cannot take
//! its content is reduced to its title instead of failing the document.

use crate::assign::{assign, Assignment, AssignmentLedger, ContentUnit};
use crate::error::{Error, Result};
use crate::fit::{char_budget, fit_font, limit_chars, max_bullets};
use crate::geometry::Rect;
use crate::images::{
    fill_image_regions, place_free_image, ImagePlacement, ImagePool, ImagePoolCursor,
};
use crate::options::GenerationOptions;
use crate::plan::{SlideContentRequest, SlidePlan};
use crate::runs::plain_text;
use crate::types::{LayoutDescriptor, PlaceholderDescriptor, PlaceholderRole, TemplateStructure};
use serde::Serialize;

/// Share of the canvas height taken by a free-standing title box.
const TITLE_BOX_SHARE: f64 = 0.15;

/// Font settled for one text shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFont {
    pub family: String,

    /// Size in points.
    pub size: f64,

    pub bold: bool,
    pub italic: bool,
}

/// A placeholder together with the fitted text it receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledPlaceholder {
    pub placeholder: PlaceholderDescriptor,

    /// One entry per paragraph. Entries may carry emphasis markers.
    pub paragraphs: Vec<String>,

    pub font: ResolvedFont,

    /// Whether the paragraphs are bullets.
    pub bulleted: bool,
}

/// Text placed at an explicit position rather than in a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBox {
    pub region: Rect,
    pub text: String,
    pub font: ResolvedFont,
}

/// Everything decided about one slide, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideBuild {
    /// 1-based position in the deck.
    pub number: usize,

    pub layout_index: usize,
    pub texts: Vec<FilledPlaceholder>,
    pub text_boxes: Vec<TextBox>,
    pub images: Vec<ImagePlacement>,

    /// Speaker notes.
    pub notes: Option<String>,
}

impl SlideBuild {
    fn new(number: usize, layout_index: usize) -> Self {
        Self {
            number,
            layout_index,
            texts: Vec::new(),
            text_boxes: Vec::new(),
            images: Vec::new(),
            notes: None,
        }
    }

    /// Rectangles of every text-bearing shape on the slide.
    pub fn text_regions(&self) -> Vec<Rect> {
        self.texts
            .iter()
            .map(|t| t.placeholder.geometry)
            .chain(self.text_boxes.iter().map(|b| b.region))
            .collect()
    }
}

/// Receives finished slides, in deck order.
pub trait DocumentSink {
    /// Create the shapes for `slide`. Image placements index into `pool`.
    fn add_slide(&mut self, slide: &SlideBuild, pool: &ImagePool) -> Result<()>;
}

/// Collects slides in memory.
impl DocumentSink for Vec<SlideBuild> {
    fn add_slide(&mut self, slide: &SlideBuild, _pool: &ImagePool) -> Result<()> {
        self.push(slide.clone());
        Ok(())
    }
}

type LayoutPredicate = fn(&LayoutDescriptor) -> bool;

fn title_and_subtitle(layout: &LayoutDescriptor) -> bool {
    layout.has_role(PlaceholderRole::Title)
        && layout.has_role(PlaceholderRole::Subtitle)
        && !layout.has_role(PlaceholderRole::Body)
}

fn section_name(layout: &LayoutDescriptor) -> bool {
    layout.name.to_lowercase().contains("section")
}

fn title_alone(layout: &LayoutDescriptor) -> bool {
    layout.has_role(PlaceholderRole::Title)
        && !layout.has_role(PlaceholderRole::Body)
        && !layout.has_role(PlaceholderRole::Subtitle)
}

fn two_columns(layout: &LayoutDescriptor) -> bool {
    layout.count_role(PlaceholderRole::Body) + layout.count_role(PlaceholderRole::Object) >= 2
}

fn title_and_image(layout: &LayoutDescriptor) -> bool {
    layout.has_role(PlaceholderRole::Title) && layout.has_image_region()
}

fn title_and_body(layout: &LayoutDescriptor) -> bool {
    layout.has_role(PlaceholderRole::Title) && layout.has_role(PlaceholderRole::Body)
}

/// Layout shapes to try for a lower-cased hint, most specific first.
fn hint_predicates(hint: &str) -> Vec<LayoutPredicate> {
    let mut predicates: Vec<LayoutPredicate> = Vec::new();
    if hint.contains("title") && !hint.contains("content") {
        predicates.push(title_and_subtitle);
    }
    if hint.contains("section") {
        predicates.push(section_name);
        predicates.push(title_alone);
    }
    if hint.contains("two") || hint.contains("comparison") {
        predicates.push(two_columns);
    }
    if hint.contains("image") || hint.contains("picture") {
        predicates.push(title_and_image);
    }
    if ["bullets", "content", "quote"].iter().any(|k| hint.contains(k)) {
        predicates.push(title_and_body);
    }
    predicates
}

/// Choose the layout for a slide.
///
/// A valid explicit index wins, then the hint keywords, then the first
/// layout with a body, then layout 0. `None` only for a template without
/// layouts.
pub fn select_layout(structure: &TemplateStructure, request: &SlideContentRequest) -> Option<usize> {
    if structure.layouts.is_empty() {
        return None;
    }
    if let Some(index) = request.layout_index {
        if index < structure.layouts.len() {
            return Some(index);
        }
        log::debug!("ignoring out-of-range layout index {}", index);
    }

    hint_predicates(&request.hint())
        .into_iter()
        .find_map(|predicate| structure.layouts.iter().position(predicate))
        .or_else(|| {
            structure
                .layouts
                .iter()
                .position(|l| l.has_role(PlaceholderRole::Body))
        })
        .or(Some(0))
}

fn default_title(number: usize) -> String {
    format!("Slide {}", number)
}

/// Keep `text` when its displayed form fits the area budget, otherwise
/// cut the displayed form. Emphasis is lost on cut text.
fn cap_text(text: &str, displayed: &str, geometry: &Rect) -> String {
    if displayed.chars().count() <= char_budget(geometry) {
        text.to_string()
    } else {
        limit_chars(displayed, geometry)
    }
}

/// Builds slides against one analysed template.
///
/// The image cursor lives as long as the assembler, so pool images cycle
/// across the whole deck.
#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    structure: &'a TemplateStructure,
    pool: &'a ImagePool,
    options: GenerationOptions,
    theme_font: Option<String>,
    cursor: ImagePoolCursor,
}

impl<'a> Assembler<'a> {
    pub fn new(structure: &'a TemplateStructure, pool: &'a ImagePool) -> Self {
        Self {
            structure,
            pool,
            options: GenerationOptions::default(),
            theme_font: None,
            cursor: ImagePoolCursor::new(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Typeface to use when a placeholder carries none of its own.
    pub fn with_theme_font(mut self, family: Option<String>) -> Self {
        self.theme_font = family;
        self
    }

    /// Build and emit every slide of `plan`, returning the slide count.
    pub fn assemble<S: DocumentSink + ?Sized>(
        &mut self,
        plan: &SlidePlan,
        sink: &mut S,
    ) -> Result<usize> {
        for (i, request) in plan.slides.iter().enumerate() {
            let number = i + 1;
            let slide = match self.build_slide(number, request) {
                Ok(slide) => slide,
                Err(Error::LayoutUnusable { layout, reason }) => {
                    log::warn!(
                        "slide {}: layout {} is unusable ({}), keeping only the title",
                        number,
                        layout,
                        reason
                    );
                    self.title_only(number, request)
                }
                Err(e) => return Err(e),
            };
            sink.add_slide(&slide, self.pool)?;
        }
        Ok(plan.len())
    }

    /// Assign, fit and place one slide.
    pub fn build_slide(&mut self, number: usize, request: &SlideContentRequest) -> Result<SlideBuild> {
        let mut request = request.clone();
        if request.title_text().is_none() {
            request.title = Some(default_title(number));
        }

        let layout_index = select_layout(self.structure, &request).ok_or_else(|| {
            Error::LayoutUnusable {
                layout: 0,
                reason: "template has no layouts".to_string(),
            }
        })?;
        let structure = self.structure;
        let layout = structure
            .layout(layout_index)
            .ok_or_else(|| Error::LayoutUnusable {
                layout: layout_index,
                reason: "layout does not exist".to_string(),
            })?;
        if !layout.is_usable() {
            return Err(Error::LayoutUnusable {
                layout: layout_index,
                reason: "layout has no placeholders".to_string(),
            });
        }

        let mut ledger = AssignmentLedger::new();
        let assignments = assign(layout, &request, &mut ledger);

        let mut slide = SlideBuild::new(number, layout_index);
        slide.notes = request.notes_text().map(str::to_string);
        slide.texts = assignments
            .iter()
            .filter_map(|a| self.fill(number, a))
            .collect();

        let unplaced = ledger.unconsumed_bullets(request.bullets.len()).len();
        if unplaced > 0 {
            log::debug!(
                "slide {}: layout '{}' has no room for {} bullet(s)",
                number,
                layout.name,
                unplaced
            );
        }

        slide.images = fill_image_regions(
            layout,
            request.wants_visual(),
            self.pool,
            &mut self.cursor,
            &mut ledger,
        );

        if request.hint_requests_visual() && !layout.has_image_region() {
            if self.options.free_placement() {
                let text = slide.text_regions();
                slide
                    .images
                    .extend(place_free_image(structure, self.pool, &mut self.cursor, &text));
            } else {
                log::debug!("slide {}: free image placement is disabled", number);
            }
        }

        if slide.texts.is_empty() && slide.images.is_empty() {
            return Err(Error::LayoutUnusable {
                layout: layout_index,
                reason: "no placeholder accepts the slide content".to_string(),
            });
        }
        Ok(slide)
    }

    /// A slide carrying nothing but its title.
    ///
    /// Uses the first layout with a title placeholder; a template without
    /// one gets a text box across the top of layout 0.
    pub fn title_only(&self, number: usize, request: &SlideContentRequest) -> SlideBuild {
        let title = request
            .title_text()
            .map(str::to_string)
            .unwrap_or_else(|| default_title(number));

        let titled = self.structure.layouts.iter().enumerate().find_map(|(i, layout)| {
            layout
                .placeholders
                .iter()
                .find(|p| p.role == PlaceholderRole::Title)
                .map(|p| (i, p))
        });

        let mut slide = match titled {
            Some((layout_index, placeholder)) => {
                let mut slide = SlideBuild::new(number, layout_index);
                let assignment = Assignment {
                    placeholder: placeholder.clone(),
                    content: ContentUnit::Title(title),
                };
                slide.texts.extend(self.fill(number, &assignment));
                slide
            }
            None => {
                let mut slide = SlideBuild::new(number, 0);
                let region = Rect::new(
                    0.0,
                    0.0,
                    self.structure.width,
                    self.structure.height * TITLE_BOX_SHARE,
                );
                let displayed = plain_text(&title);
                let base = self.options.base_size(&ContentUnit::Title(String::new()));
                slide.text_boxes.push(TextBox {
                    region,
                    text: cap_text(&title, &displayed, &region),
                    font: ResolvedFont {
                        family: self.family_for(None),
                        size: fit_font(base, &displayed, &region, true),
                        bold: false,
                        italic: false,
                    },
                });
                slide
            }
        };
        slide.notes = request.notes_text().map(str::to_string);
        slide
    }

    /// Fit one assignment to its placeholder. `None` when nothing fits.
    fn fill(&self, number: usize, assignment: &Assignment) -> Option<FilledPlaceholder> {
        let placeholder = &assignment.placeholder;
        let geometry = &placeholder.geometry;
        let base = placeholder
            .font
            .as_ref()
            .and_then(|f| f.size)
            .unwrap_or_else(|| self.options.base_size(&assignment.content));

        let (paragraphs, size, bulleted) = match &assignment.content {
            ContentUnit::Bullets(items) => {
                let displayed: Vec<String> = items.iter().map(|b| plain_text(b)).collect();
                let longest = displayed
                    .iter()
                    .max_by_key(|b| b.chars().count())
                    .map(String::as_str)
                    .unwrap_or("");
                let size = fit_font(base, longest, geometry, false);
                let capacity = max_bullets(geometry, size, &displayed);
                if capacity < items.len() {
                    log::debug!(
                        "slide {}: placeholder {} holds {} of {} bullets at {:.1}pt",
                        number,
                        placeholder.index,
                        capacity,
                        items.len(),
                        size
                    );
                }
                (items[..capacity].to_vec(), size, true)
            }
            ContentUnit::Title(text) | ContentUnit::Subtitle(text) | ContentUnit::Text(text) => {
                let displayed = plain_text(text);
                let size = fit_font(base, &displayed, geometry, assignment.content.is_title());
                (vec![cap_text(text, &displayed, geometry)], size, false)
            }
        };

        if paragraphs.is_empty() {
            log::debug!(
                "slide {}: placeholder {} is too small for any text",
                number,
                placeholder.index
            );
            return None;
        }

        let sampled = placeholder.font.as_ref();
        Some(FilledPlaceholder {
            placeholder: placeholder.clone(),
            paragraphs,
            font: ResolvedFont {
                family: self.family_for(sampled.and_then(|f| f.family.as_deref())),
                size,
                bold: sampled.is_some_and(|f| f.bold),
                italic: sampled.is_some_and(|f| f.italic),
            },
            bulleted,
        })
    }

    fn family_for(&self, sampled: Option<&str>) -> String {
        sampled
            .or(self.theme_font.as_deref())
            .unwrap_or(self.options.default_family())
            .to_string()
    }
}
