//! Comment ranges and their Python rendering.
//!
//! Comments are scanner trivia. The scanner records a [`CommentRange`] for
//! every comment in front of a token; the parser turns the ranges it cares
//! about into comment nodes, and the compiler renders them with
//! [`to_python_comment`].

use serde::{Deserialize, Serialize};

/// A range representing a comment in the source text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRange {
    /// Start position (byte offset)
    pub pos: u32,
    /// End position (byte offset)
    pub end: u32,
    /// `/* ... */` rather than `// ...`
    pub is_multi_line: bool,
    /// Whether a line break follows the comment
    pub has_trailing_new_line: bool,
}

impl CommentRange {
    pub fn new(pos: u32, end: u32, is_multi_line: bool, has_trailing_new_line: bool) -> Self {
        CommentRange {
            pos,
            end,
            is_multi_line,
            has_trailing_new_line,
        }
    }

    /// Get the comment text from source.
    pub fn get_text<'a>(&self, source: &'a str) -> &'a str {
        let start = self.pos as usize;
        let end = self.end as usize;
        if end <= source.len() && start < end {
            &source[start..end]
        } else {
            ""
        }
    }

    /// A comment stands on its own if it ends a line or spans several.
    /// Inline comments between tokens of one line are not.
    pub fn stands_alone(&self, source: &str) -> bool {
        self.has_trailing_new_line || self.get_text(source).contains('\n')
    }
}

/// Render a TypeScript comment as Python `#` lines.
///
/// Comment markers and the leading `*` of doc-comment lines are removed.
/// Blank lines at the start and end of a block comment are dropped.
pub fn to_python_comment(text: &str) -> String {
    let body = if let Some(rest) = text.strip_prefix("//") {
        rest
    } else {
        let inner = text.strip_prefix("/**").or_else(|| text.strip_prefix("/*"));
        let inner = inner.unwrap_or(text);
        inner.strip_suffix("*/").unwrap_or(inner)
    };

    let mut lines: Vec<&str> = body
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line).trim_end()
        })
        .collect();
    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return "#".to_string();
    }

    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                "#".to_string()
            } else {
                format!("# {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "../tests/comments.rs"]
mod tests;
