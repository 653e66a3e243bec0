//! Image pool reuse and image placement.
//!
//! Images harvested from the template are cycled round-robin across the
//! slides that ask for one. A slide whose layout has image regions gets
//! the image in the region's exact rectangle; otherwise a free corner
//! position that clears all text on the slide is searched for.

use crate::assign::AssignmentLedger;
use crate::geometry::Rect;
use crate::types::{LayoutDescriptor, TemplateStructure};
use serde::Serialize;

/// Largest share of the canvas a freely placed image may cover.
pub const MAX_FREE_AREA_SHARE: f64 = 0.30;

/// Distance from the canvas edges for corner anchors, in inches.
pub const CORNER_OFFSET: f64 = 0.3;

/// Clearance required between a free image and text, in inches.
pub const OVERLAP_BUFFER: f64 = 0.1;

/// A raster image harvested from the template.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePoolEntry {
    pub bytes: Vec<u8>,

    /// Width in inches, used for the aspect ratio.
    pub width: f64,

    /// Height in inches, used for the aspect ratio.
    pub height: f64,

    /// Template slide the image came from.
    pub source_slide: usize,

    /// Lowercase file extension, e.g. "png".
    pub extension: String,
}

impl ImagePoolEntry {
    /// Width over height; 1.0 when the size is degenerate.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Read-only collection of reusable template images.
#[derive(Debug, Clone, Default)]
pub struct ImagePool {
    entries: Vec<ImagePoolEntry>,
}

impl ImagePool {
    pub fn new(entries: Vec<ImagePoolEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImagePoolEntry> {
        self.entries.get(index)
    }
}

/// Round-robin position in an [`ImagePool`], owned by one generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImagePoolCursor {
    counter: usize,
}

impl ImagePoolCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the next pool index and advance. `None` for an empty pool.
    pub fn next_index(&mut self, pool: &ImagePool) -> Option<usize> {
        if pool.is_empty() {
            return None;
        }
        let index = self.counter % pool.len();
        self.counter += 1;
        Some(index)
    }

    /// Number of selections made so far.
    pub fn uses(&self) -> usize {
        self.counter
    }
}

/// An image decision for one slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImagePlacement {
    /// Index into the image pool.
    pub pool_index: usize,

    /// Where the image goes, in inches.
    pub region: Rect,

    /// The placeholder the image replaces, if any.
    pub replaces: Option<u32>,
}

/// Fill the layout's unconsumed image-capable placeholders.
///
/// Each filled region consumes its placeholder in the ledger and one step
/// of the cursor. Nothing happens when the slide does not want visuals or
/// the pool is empty.
pub fn fill_image_regions(
    layout: &LayoutDescriptor,
    wants_visual: bool,
    pool: &ImagePool,
    cursor: &mut ImagePoolCursor,
    ledger: &mut AssignmentLedger,
) -> Vec<ImagePlacement> {
    if !wants_visual || pool.is_empty() {
        return Vec::new();
    }

    let mut placements = Vec::new();
    for placeholder in &layout.placeholders {
        if !placeholder.role.is_image_capable() || ledger.is_placeholder_used(placeholder.index) {
            continue;
        }
        let Some(pool_index) = cursor.next_index(pool) else {
            break;
        };
        ledger.consume_placeholder(placeholder.index);
        placements.push(ImagePlacement {
            pool_index,
            region: placeholder.geometry,
            replaces: Some(placeholder.index),
        });
    }
    placements
}

/// Corner anchors tried for free placement, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    pub const ORDER: [Corner; 3] = [Corner::TopRight, Corner::BottomRight, Corner::BottomLeft];

    /// Position a `width` x `height` box at this corner of the canvas.
    fn anchor(self, width: f64, height: f64, canvas_width: f64, canvas_height: f64) -> Rect {
        let right = canvas_width - width - CORNER_OFFSET;
        let bottom = canvas_height - height - CORNER_OFFSET;
        match self {
            Corner::TopRight => Rect::new(right, CORNER_OFFSET, width, height),
            Corner::BottomRight => Rect::new(right, bottom, width, height),
            Corner::BottomLeft => Rect::new(CORNER_OFFSET, bottom, width, height),
        }
    }
}

/// Size of a freely placed image: the largest box with the image's aspect
/// ratio that covers at most [`MAX_FREE_AREA_SHARE`] of the canvas and
/// fits inside the corner offsets.
pub fn free_image_size(structure: &TemplateStructure, entry: &ImagePoolEntry) -> (f64, f64) {
    let aspect = entry.aspect_ratio();
    let area = structure.canvas_area() * MAX_FREE_AREA_SHARE;

    let mut width = (area * aspect).sqrt();
    let mut height = width / aspect;

    let max_width = (structure.width - 2.0 * CORNER_OFFSET).max(0.0);
    let max_height = (structure.height - 2.0 * CORNER_OFFSET).max(0.0);
    let scale = (max_width / width).min(max_height / height).min(1.0);
    if scale.is_finite() && scale > 0.0 {
        width *= scale;
        height *= scale;
    }
    (width, height)
}

/// Find a corner rectangle for `entry` clear of every rectangle in `text`.
///
/// Returns `None` when every corner conflicts; an overlapping placement is
/// never produced.
pub fn find_free_region(
    structure: &TemplateStructure,
    entry: &ImagePoolEntry,
    text: &[Rect],
) -> Option<Rect> {
    let (width, height) = free_image_size(structure, entry);
    if width <= 0.0 || height <= 0.0 {
        return None;
    }

    let canvas = Rect::new(0.0, 0.0, structure.width, structure.height);
    Corner::ORDER
        .iter()
        .map(|corner| corner.anchor(width, height, structure.width, structure.height))
        .filter(|candidate| canvas.contains(candidate))
        .find(|candidate| {
            !text
                .iter()
                .any(|shape| candidate.overlaps_with_buffer(shape, OVERLAP_BUFFER))
        })
}

/// Place one pool image freely on a slide without image regions.
///
/// The cursor only advances when a position is found.
pub fn place_free_image(
    structure: &TemplateStructure,
    pool: &ImagePool,
    cursor: &mut ImagePoolCursor,
    text: &[Rect],
) -> Option<ImagePlacement> {
    if pool.is_empty() {
        return None;
    }
    let pool_index = cursor.uses() % pool.len();
    let entry = pool.get(pool_index)?;

    match find_free_region(structure, entry, text) {
        Some(region) => {
            cursor.next_index(pool);
            Some(ImagePlacement {
                pool_index,
                region,
                replaces: None,
            })
        }
        None => {
            log::debug!("no free corner for image {}; slide gets no image", pool_index);
            None
        }
    }
}
