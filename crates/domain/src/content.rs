//! Markdown-fenced code extraction
//!
//! Splits message text into alternating plain-text and code segments so a
//! renderer can treat fenced blocks differently. Pure and deterministic.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Language tag used when a fence carries none
pub const DEFAULT_CODE_LANGUAGE: &str = "plaintext";

#[allow(clippy::expect_used)]
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(\w+)?\n(.*?)```").expect("code fence pattern is a valid literal")
});

/// One piece of a message's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentSegment {
    /// Plain text, passed through unchanged
    Text { content: String },
    /// A fenced code block with its (possibly defaulted) language tag
    Code { language: String, code: String },
}

impl ContentSegment {
    /// Create a text segment
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Create a code segment
    pub fn code(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Code {
            language: language.into(),
            code: code.into(),
        }
    }

    /// Whether this segment is a code block
    pub const fn is_code(&self) -> bool {
        matches!(self, Self::Code { .. })
    }

    /// The segment's content
    pub fn content(&self) -> &str {
        match self {
            Self::Text { content } => content,
            Self::Code { code, .. } => code,
        }
    }
}

/// Split `text` into ordered text and code segments
///
/// Code content is trimmed; text between fences is kept verbatim. Text
/// without any fence yields a single text segment; empty input yields none.
pub fn extract_segments(text: &str) -> Vec<ContentSegment> {
    let mut segments = Vec::new();
    let mut last_index = 0;

    for captures in CODE_FENCE.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };

        if whole.start() > last_index {
            segments.push(ContentSegment::text(&text[last_index..whole.start()]));
        }

        let language = captures
            .get(1)
            .map_or(DEFAULT_CODE_LANGUAGE, |m| m.as_str());
        let code = captures.get(2).map_or("", |m| m.as_str()).trim();
        segments.push(ContentSegment::code(language, code));

        last_index = whole.end();
    }

    if last_index < text.len() {
        segments.push(ContentSegment::text(&text[last_index..]));
    }

    segments
}
