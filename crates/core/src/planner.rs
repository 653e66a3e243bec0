//! Rule-based slide planning from raw text.
//!
//! Used when no external content generator produced a plan. Markdown
//! headings start new slides; plain prose is grouped into bullet slides.

use crate::plan::{SlideContentRequest, SlidePlan, DEFAULT_LAYOUT_HINT};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Markdown ATX heading: `#` to `######` followed by text.
static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*?)\s*#*\s*$").unwrap());

/// Leading list markers: `-`, `*`, `+`, `1.` or `1)`.
static LIST_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*+]|\d+[.)])\s+").unwrap());

/// Slide limit for normal guidance.
pub const MAX_SLIDES: usize = 18;

/// Slide limit when the guidance asks for a short deck.
pub const MAX_SLIDES_SHORT: usize = 12;

/// Bullets per generated slide.
pub const MAX_BULLETS_PER_SLIDE: usize = 4;

const MAX_TITLE_CHARS: usize = 90;
const MAX_BULLET_CHARS: usize = 180;
const LONG_PARAGRAPH_CHARS: usize = 200;

const OVERVIEW_TITLE: &str = "Overview";

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Slide under construction.
struct Draft {
    title: String,
    bullets: Vec<String>,
}

impl Draft {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bullets: Vec::new(),
        }
    }

    fn into_request(self) -> SlideContentRequest {
        SlideContentRequest::new(self.title)
            .with_bullets(self.bullets)
            .with_hint(DEFAULT_LAYOUT_HINT)
    }
}

/// Build a slide plan from raw text using heuristics only.
pub fn plan_from_text(text: &str, guidance: &str) -> SlidePlan {
    let text: String = text.nfc().collect();

    let mut slides = plan_from_markdown(&text);
    if slides.is_empty() {
        slides = plan_from_paragraphs(&text);
    }

    let limit = if guidance.to_lowercase().contains("short") {
        MAX_SLIDES_SHORT
    } else {
        MAX_SLIDES
    };
    slides.truncate(limit);

    SlidePlan::new(slides)
}

fn plan_from_markdown(text: &str) -> Vec<SlideContentRequest> {
    let mut slides = Vec::new();
    let mut current = Draft::new(OVERVIEW_TITLE);
    let mut saw_heading = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = HEADING_REGEX.captures(line) {
            let level = caps[1].len();
            let heading = caps[2].trim();
            if level <= 2 {
                saw_heading = true;
                if !current.bullets.is_empty() || current.title != OVERVIEW_TITLE {
                    slides.push(current.into_request());
                }
                current = Draft::new(truncate(heading, MAX_TITLE_CHARS));
                continue;
            }
            if !heading.is_empty() {
                push_bullet(&mut slides, &mut current, heading);
            }
            continue;
        }

        let item = LIST_MARKER_REGEX.replace(line, "");
        let item = item.trim();
        if !item.is_empty() {
            push_bullet(&mut slides, &mut current, item);
        }
    }

    if !saw_heading {
        return Vec::new();
    }
    if !current.bullets.is_empty() || current.title != OVERVIEW_TITLE {
        slides.push(current.into_request());
    }
    slides
}

/// Append a bullet, continuing on a new slide once the current one is full.
fn push_bullet(slides: &mut Vec<SlideContentRequest>, current: &mut Draft, text: &str) {
    if current.bullets.len() >= MAX_BULLETS_PER_SLIDE {
        let title = continued_title(&current.title);
        let full = std::mem::replace(current, Draft::new(title));
        slides.push(full.into_request());
    }
    current.bullets.push(truncate(text, MAX_BULLET_CHARS));
}

fn continued_title(title: &str) -> String {
    let base = title.trim_end_matches(" (cont.)");
    truncate(&format!("{} (cont.)", base), MAX_TITLE_CHARS)
}

fn plan_from_paragraphs(text: &str) -> Vec<SlideContentRequest> {
    let mut paragraphs: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if paragraphs.len() <= 1 {
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if lines.len() > paragraphs.len() {
            paragraphs = lines;
        }
    }

    let mut slides = Vec::new();
    let mut current = Draft::new("Introduction");
    let mut count = 1;

    for paragraph in paragraphs {
        if current.bullets.len() >= MAX_BULLETS_PER_SLIDE {
            count += 1;
            let next = Draft::new(format!("Key Points {}", count));
            slides.push(std::mem::replace(&mut current, next).into_request());
        }

        let paragraph = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
        if paragraph.chars().count() > LONG_PARAGRAPH_CHARS {
            for sentence in paragraph.split(". ").map(str::trim).filter(|s| !s.is_empty()) {
                current.bullets.push(truncate(sentence, MAX_BULLET_CHARS));
                if current.bullets.len() >= MAX_BULLETS_PER_SLIDE {
                    break;
                }
            }
        } else {
            current.bullets.push(truncate(&paragraph, MAX_BULLET_CHARS));
        }
    }

    if !current.bullets.is_empty() {
        slides.push(current.into_request());
    }

    if slides.is_empty() {
        let trimmed = text.trim();
        let bullet = if trimmed.is_empty() {
            "No content provided".to_string()
        } else {
            truncate(trimmed, MAX_BULLET_CHARS)
        };
        slides.push(Draft {
            title: "Content Overview".to_string(),
            bullets: vec![bullet],
        }
        .into_request());
    }

    slides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_headings_become_slides() {
        let text = "
            # Introduction
            This is the introduction section.

            # Main Content
            - First detail
            - Second detail

            # Conclusion
            This is the conclusion.
        ";

        let plan = plan_from_text(text, "");
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.slides[0].title.as_deref(), Some("Introduction"));
        assert_eq!(
            plan.slides[0].bullets,
            vec!["This is the introduction section."]
        );
        assert_eq!(plan.slides[1].bullets, vec!["First detail", "Second detail"]);
        assert!(plan.slides.iter().all(|s| s.layout_hint == "bullets"));
    }

    #[test]
    fn test_text_before_first_heading_is_overview() {
        let plan = plan_from_text("Opening remark\n## Details\nPoint", "");
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.slides[0].title.as_deref(), Some("Overview"));
        assert_eq!(plan.slides[0].bullets, vec!["Opening remark"]);
        assert_eq!(plan.slides[1].title.as_deref(), Some("Details"));
    }

    #[test]
    fn test_deep_headings_are_bullets() {
        let plan = plan_from_text("# Top\n### Detail heading\ntext", "");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.slides[0].bullets, vec!["Detail heading", "text"]);
    }

    #[test]
    fn test_full_slides_continue() {
        let text = "# Many\n- a\n- b\n- c\n- d\n- e\n- f";
        let plan = plan_from_text(text, "");
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.slides[0].bullets.len(), 4);
        assert_eq!(plan.slides[1].title.as_deref(), Some("Many (cont.)"));
        assert_eq!(plan.slides[1].bullets, vec!["e", "f"]);
    }

    #[test]
    fn test_list_without_top_headings_is_plain_text() {
        let plan = plan_from_text("- one\n- two\n### Deep\n- three", "");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.slides[0].title_text(), Some("Introduction"));
        assert_eq!(plan.slides[0].bullets, vec!["- one", "- two", "### Deep", "- three"]);
    }

    #[test]
    fn test_plain_text_paragraphs() {
        let text = "
            This is plain text without markdown headers.

            It has multiple paragraphs and should be converted into slides.

            Each paragraph might become a bullet point or slide.

            The algorithm should handle this gracefully.

            A fifth paragraph spills onto a second slide.
        ";

        let plan = plan_from_text(text, "");
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.slides[0].title.as_deref(), Some("Introduction"));
        assert_eq!(plan.slides[0].bullets.len(), 4);
        assert_eq!(plan.slides[1].title.as_deref(), Some("Key Points 2"));
    }

    #[test]
    fn test_long_paragraph_is_split_into_sentences() {
        let sentence = "This sentence is long enough to matter";
        let paragraph = vec![sentence; 8].join(". ");
        let plan = plan_from_text(&paragraph, "");
        assert_eq!(plan.slides[0].bullets.len(), 4);
        assert_eq!(plan.slides[0].bullets[0], sentence);
    }

    #[test]
    fn test_guidance_limits_slide_count() {
        let text = (0..120)
            .map(|i| format!("Paragraph number {}", i))
            .collect::<Vec<_>>()
            .join("\n\n");

        assert_eq!(plan_from_text(&text, "short presentation").len(), 12);
        assert_eq!(plan_from_text(&text, "detailed presentation").len(), 18);
    }

    #[test]
    fn test_empty_input() {
        let plan = plan_from_text("   ", "");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.slides[0].title.as_deref(), Some("Content Overview"));
        assert_eq!(plan.slides[0].bullets, vec!["No content provided"]);
    }

    #[test]
    fn test_titles_and_bullets_are_truncated() {
        let text = format!("# {}\n{}", "t".repeat(120), "b".repeat(300));
        let plan = plan_from_text(&text, "");
        assert_eq!(plan.slides[0].title.as_ref().unwrap().chars().count(), 90);
        assert_eq!(plan.slides[0].bullets[0].chars().count(), 180);
    }

    #[test]
    fn test_input_is_nfc_normalized() {
        // "e" followed by a combining acute accent
        let plan = plan_from_text("# Cafe\u{301}\nMenu", "");
        assert_eq!(plan.slides[0].title.as_deref(), Some("Caf\u{e9}"));
    }
}
