//! Inline `**bold**` and `*italic*` markers in slide text.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Bold takes precedence; italic markers inside a bold span stay literal.
static EMPHASIS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*|\*([^*]+?)\*").unwrap());

/// A span of text with uniform emphasis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl TextRun {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: false,
            italic: false,
        }
    }
}

/// Split `text` into runs. Unmatched markers are kept as literal text.
pub fn parse_runs(text: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut pos = 0;

    for caps in EMPHASIS_REGEX.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > pos {
            runs.push(TextRun::plain(&text[pos..whole.start()]));
        }
        if let Some(bold) = caps.get(1) {
            runs.push(TextRun {
                text: bold.as_str().to_string(),
                bold: true,
                italic: false,
            });
        } else if let Some(italic) = caps.get(2) {
            runs.push(TextRun {
                text: italic.as_str().to_string(),
                bold: false,
                italic: true,
            });
        }
        pos = whole.end();
    }

    if pos < text.len() {
        runs.push(TextRun::plain(&text[pos..]));
    }
    if runs.is_empty() {
        runs.push(TextRun::plain(text));
    }
    runs
}

/// The text as displayed, with emphasis markers removed.
pub fn plain_text(text: &str) -> String {
    parse_runs(text).into_iter().map(|r| r.text).collect()
}
