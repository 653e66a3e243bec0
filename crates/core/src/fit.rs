//! Text fitting heuristics.
//!
//! There is no text measurement pass, so these estimates are deliberately
//! conservative: they prefer text that is smaller than necessary over any
//! chance of overflowing a placeholder.

use crate::geometry::{points_to_inches, Rect};

/// Smallest font size for titles, in points.
pub const MIN_TITLE_SIZE: f64 = 8.0;

/// Smallest font size for body text, in points.
pub const MIN_BODY_SIZE: f64 = 6.0;

/// Vertical space reserved inside a placeholder, in inches.
pub const BULLET_MARGIN: f64 = 0.3;

/// Estimated characters per rendered line.
const CHARS_PER_LINE: usize = 40;

/// Line height as a multiple of the font size.
const LINE_SPACING: f64 = 1.5;

/// Titles longer than this get an extra reduction.
const LONG_TITLE_CHARS: usize = 50;

/// Appended to text cut by [`limit_chars`].
pub const ELLIPSIS: &str = "...";

/// Length thresholds (inclusive lower bounds) and their multipliers.
const LENGTH_STEPS: &[(usize, f64)] = &[(150, 0.5), (100, 0.6), (50, 0.7), (30, 0.8)];

/// Area thresholds (exclusive upper bounds, square inches) and their multipliers.
const AREA_STEPS: &[(f64, f64)] = &[(5.0, 0.5), (10.0, 0.6), (20.0, 0.8)];

/// Character budgets by area (inclusive upper bounds, square inches).
const CHAR_BUDGETS: &[(f64, usize)] = &[(5.0, 50), (10.0, 100), (20.0, 200)];

/// Character budget for anything larger.
const MAX_CHAR_BUDGET: usize = 400;

fn length_multiplier(chars: usize) -> f64 {
    LENGTH_STEPS
        .iter()
        .find(|(threshold, _)| chars >= *threshold)
        .map(|(_, m)| *m)
        .unwrap_or(1.0)
}

fn area_multiplier(area: f64) -> f64 {
    AREA_STEPS
        .iter()
        .find(|(threshold, _)| area < *threshold)
        .map(|(_, m)| *m)
        .unwrap_or(1.0)
}

/// Pick a font size that should keep `text` inside `geometry`.
///
/// The length multiplier is chosen by the largest threshold crossed, then
/// combined with the area multiplier and, for long titles, a further 0.7.
pub fn fit_font(base_size: f64, text: &str, geometry: &Rect, is_title: bool) -> f64 {
    let chars = text.chars().count();

    let mut size = base_size * length_multiplier(chars) * area_multiplier(geometry.area());
    if is_title && chars > LONG_TITLE_CHARS {
        size *= 0.7;
    }

    let floor = if is_title { MIN_TITLE_SIZE } else { MIN_BODY_SIZE };
    size.max(floor)
}

/// Estimated rendered line count of one bullet.
pub fn estimated_lines(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_LINE).max(1)
}

/// Estimated height of one line, in inches.
pub fn line_height(font_size: f64) -> f64 {
    points_to_inches(font_size * LINE_SPACING)
}

/// How many leading bullets fit in `geometry` at `font_size`.
///
/// Bullets are accumulated until the running height would exceed the
/// placeholder height minus [`BULLET_MARGIN`]. When the list overflows, a
/// capacity above one is reduced by one more as a safety margin; a list
/// that fits entirely is kept whole.
pub fn max_bullets<S: AsRef<str>>(geometry: &Rect, font_size: f64, bullets: &[S]) -> usize {
    let available = geometry.height - BULLET_MARGIN;
    let line = line_height(font_size);

    let mut used = 0.0;
    let mut count = 0;
    for bullet in bullets {
        let needed = estimated_lines(bullet.as_ref()) as f64 * line;
        if used + needed > available {
            break;
        }
        used += needed;
        count += 1;
    }

    if count < bullets.len() && count > 1 {
        count - 1
    } else {
        count
    }
}

/// Character budget for a single string in `geometry`.
pub fn char_budget(geometry: &Rect) -> usize {
    let area = geometry.area();
    CHAR_BUDGETS
        .iter()
        .find(|(threshold, _)| area <= *threshold)
        .map(|(_, budget)| *budget)
        .unwrap_or(MAX_CHAR_BUDGET)
}

/// Cut `text` to the area budget of `geometry`, marking the cut with an
/// ellipsis. The result never exceeds the budget in characters.
pub fn limit_chars(text: &str, geometry: &Rect) -> String {
    let budget = char_budget(geometry);
    if text.chars().count() <= budget {
        return text.to_string();
    }

    let keep = budget.saturating_sub(ELLIPSIS.len());
    let cut: String = text.chars().take(keep).collect();
    log::debug!(
        "truncated {} chars to budget of {}",
        text.chars().count(),
        budget
    );
    format!("{}{}", cut.trim_end(), ELLIPSIS)
}
