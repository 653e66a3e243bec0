//! Core model and layout engine for template-guided slide generation.
//!
//! Everything here is pure: the caller supplies an analysed
//! [`TemplateStructure`], an [`ImagePool`] and a [`SlidePlan`], and receives
//! per-slide decisions through a [`DocumentSink`].

pub mod assemble;
pub mod assign;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod images;
pub mod options;
pub mod plan;
pub mod planner;
pub mod runs;
pub mod types;

pub use assemble::{
    select_layout, Assembler, DocumentSink, FilledPlaceholder, ResolvedFont, SlideBuild, TextBox,
};
pub use assign::{assign, Assignment, AssignmentLedger, ContentUnit};
pub use error::{Error, Result};
pub use fit::{fit_font, limit_chars, max_bullets};
pub use geometry::{Rect, RectPercent};
pub use images::{ImagePlacement, ImagePool, ImagePoolCursor, ImagePoolEntry};
pub use options::GenerationOptions;
pub use plan::{ImageIntent, SlideContentRequest, SlidePlan};
pub use planner::plan_from_text;
pub use runs::{parse_runs, TextRun};
pub use types::{
    FontDescriptor, LayoutDescriptor, PlaceholderDescriptor, PlaceholderRole, SizeClass,
    TemplateStructure,
};
