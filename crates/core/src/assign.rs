//! Content assignment engine.
//!
//! Maps a slide's title, bullets and subtitle onto the placeholders of its
//! layout in a single pass over the placeholders in index order. An
//! [`AssignmentLedger`] records what has been consumed so that no
//! placeholder and no bullet is used twice on the same slide.

use crate::plan::SlideContentRequest;
use crate::types::{LayoutDescriptor, PlaceholderDescriptor, PlaceholderRole};
use serde::Serialize;
use std::collections::BTreeSet;

/// Leftover bullets longer than this are not placed in secondary regions.
pub const SHORT_LEFTOVER_CHARS: usize = 120;

/// Subtitle used when there is nothing better to say.
pub const STATIC_SUBTITLE: &str = "An overview of the key points";

/// Secondary text used when there is no context to draw on.
pub const STATIC_SUPPLEMENT: &str = "Additional details";

/// A discrete piece of content placed into one placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ContentUnit {
    Title(String),
    /// Bullets in display order.
    Bullets(Vec<String>),
    Subtitle(String),
    /// Short secondary text.
    Text(String),
}

impl ContentUnit {
    /// Whether this unit is rendered as a title.
    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title(_))
    }
}

/// One placeholder paired with the content assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub placeholder: PlaceholderDescriptor,
    pub content: ContentUnit,
}

/// Per-slide record of consumed placeholders and bullets.
///
/// A ledger belongs to exactly one slide and is dropped once the slide is
/// filled.
#[derive(Debug, Clone, Default)]
pub struct AssignmentLedger {
    placeholders: BTreeSet<u32>,
    bullets: BTreeSet<usize>,
    title_used: bool,
    body_used: bool,
    subtitle_used: bool,
    leftover_taken: bool,
}

impl AssignmentLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the placeholder with `index` has been filled.
    pub fn is_placeholder_used(&self, index: u32) -> bool {
        self.placeholders.contains(&index)
    }

    /// Mark a placeholder as filled. Returns false if it already was.
    pub fn consume_placeholder(&mut self, index: u32) -> bool {
        self.placeholders.insert(index)
    }

    /// Whether the bullet at `index` has been placed.
    pub fn is_bullet_used(&self, index: usize) -> bool {
        self.bullets.contains(&index)
    }

    fn consume_bullet(&mut self, index: usize) {
        self.bullets.insert(index);
    }

    pub fn title_used(&self) -> bool {
        self.title_used
    }

    pub fn body_used(&self) -> bool {
        self.body_used
    }

    /// Indices of consumed placeholders, ascending.
    pub fn used_placeholders(&self) -> impl Iterator<Item = u32> + '_ {
        self.placeholders.iter().copied()
    }

    /// Indices of bullets not placed anywhere, ascending.
    pub fn unconsumed_bullets(&self, total: usize) -> Vec<usize> {
        (0..total).filter(|i| !self.is_bullet_used(*i)).collect()
    }
}

/// Assign the request's content to the layout's text placeholders.
///
/// Image-capable placeholders are left for the image pass. Content that
/// finds no placeholder is discarded; that is a layout constraint, not an
/// error.
pub fn assign(
    layout: &LayoutDescriptor,
    request: &SlideContentRequest,
    ledger: &mut AssignmentLedger,
) -> Vec<Assignment> {
    let mut assignments = Vec::new();

    for placeholder in &layout.placeholders {
        if ledger.is_placeholder_used(placeholder.index) {
            continue;
        }

        let content = match placeholder.role {
            role if role.is_image_capable() => None,
            PlaceholderRole::Title => assign_title(request, ledger),
            PlaceholderRole::Body => assign_body(request, ledger),
            PlaceholderRole::Subtitle => Some(assign_subtitle(request, ledger)),
            PlaceholderRole::SupplementalText | PlaceholderRole::Unknown(_) => {
                Some(assign_supplement(request, ledger))
            }
            _ => None,
        };

        if let Some(content) = content {
            ledger.consume_placeholder(placeholder.index);
            assignments.push(Assignment {
                placeholder: placeholder.clone(),
                content,
            });
        }
    }

    assignments
}

fn assign_title(request: &SlideContentRequest, ledger: &mut AssignmentLedger) -> Option<ContentUnit> {
    if ledger.title_used {
        return None;
    }
    let title = request.title_text()?;
    ledger.title_used = true;
    Some(ContentUnit::Title(title.to_string()))
}

fn assign_body(request: &SlideContentRequest, ledger: &mut AssignmentLedger) -> Option<ContentUnit> {
    if ledger.body_used {
        return None;
    }

    let remaining = ledger.unconsumed_bullets(request.bullets.len());
    if remaining.is_empty() {
        return None;
    }

    let bullets = remaining
        .iter()
        .map(|i| request.bullets[*i].clone())
        .collect();
    for i in remaining {
        ledger.consume_bullet(i);
    }
    ledger.body_used = true;
    Some(ContentUnit::Bullets(bullets))
}

fn assign_subtitle(request: &SlideContentRequest, ledger: &mut AssignmentLedger) -> ContentUnit {
    if !ledger.subtitle_used {
        if let Some(subtitle) = request.subtitle_text() {
            ledger.subtitle_used = true;
            return ContentUnit::Subtitle(subtitle.to_string());
        }
    }

    if !ledger.body_used {
        if let Some(first) = ledger.unconsumed_bullets(request.bullets.len()).first() {
            ledger.consume_bullet(*first);
            return ContentUnit::Subtitle(request.bullets[*first].clone());
        }
    }

    ContentUnit::Subtitle(STATIC_SUBTITLE.to_string())
}

fn assign_supplement(request: &SlideContentRequest, ledger: &mut AssignmentLedger) -> ContentUnit {
    if !ledger.leftover_taken {
        let leftover = ledger
            .unconsumed_bullets(request.bullets.len())
            .into_iter()
            .find(|i| request.bullets[*i].chars().count() <= SHORT_LEFTOVER_CHARS);

        if let Some(i) = leftover {
            ledger.consume_bullet(i);
            ledger.leftover_taken = true;
            return ContentUnit::Text(request.bullets[i].clone());
        }
    }

    ContentUnit::Text(context_sentence(request))
}

/// A short sentence drawn from the slide's context rather than its bullets.
fn context_sentence(request: &SlideContentRequest) -> String {
    if let Some(notes) = request.notes_text() {
        let first = notes.split(". ").next().unwrap_or(notes).trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }
    if let Some(description) = request
        .image_intent
        .as_ref()
        .and_then(|i| i.description.as_deref())
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        return description.to_string();
    }
    match request.title_text() {
        Some(title) => format!("More on {}", title),
        None => STATIC_SUPPLEMENT.to_string(),
    }
}
