//! Scanner state machine.
//!
//! `ScannerState` produces one token per [`ScannerState::scan`] call. Comments
//! and whitespace in front of a token are trivia: comments are collected as
//! [`CommentRange`]s and handed to the parser through
//! [`ScannerState::leading_comments`].

use std::sync::Arc;

use ts2py_common::CommentRange;
use ts2py_common::diagnostics::{Diagnostic, diagnostic_codes, diagnostic_messages, format_message};

use crate::SyntaxKind;

/// Everything needed to rewind the scanner to an earlier token.
#[derive(Clone, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    token: SyntaxKind,
    token_start: usize,
    token_end: usize,
    token_value: String,
    preceding_line_break: bool,
    leading_comments: Vec<CommentRange>,
    diagnostics_len: usize,
}

pub struct ScannerState {
    source: Arc<str>,
    file_name: String,
    pos: usize,
    token: SyntaxKind,
    token_start: usize,
    token_end: usize,
    token_value: String,
    preceding_line_break: bool,
    leading_comments: Vec<CommentRange>,
    diagnostics: Vec<Diagnostic>,
}

impl ScannerState {
    pub fn new(file_name: impl Into<String>, source: impl Into<Arc<str>>) -> Self {
        ScannerState {
            source: source.into(),
            file_name: file_name.into(),
            pos: 0,
            token: SyntaxKind::Unknown,
            token_start: 0,
            token_end: 0,
            token_value: String::new(),
            preceding_line_break: true,
            leading_comments: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_arc(&self) -> Arc<str> {
        Arc::clone(&self.source)
    }

    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    pub fn token_pos(&self) -> u32 {
        self.token_start as u32
    }

    pub fn token_end(&self) -> u32 {
        self.token_end as u32
    }

    /// Raw source text of the current token.
    pub fn token_text(&self) -> &str {
        &self.source[self.token_start..self.token_end]
    }

    /// Identifier name, numeric text or unquoted string content.
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    /// True when a line break separates this token from the previous one.
    pub fn has_preceding_line_break(&self) -> bool {
        self.preceding_line_break
    }

    /// Comments between the previous token and the current one.
    pub fn leading_comments(&self) -> &[CommentRange] {
        &self.leading_comments
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            token: self.token,
            token_start: self.token_start,
            token_end: self.token_end,
            token_value: self.token_value.clone(),
            preceding_line_break: self.preceding_line_break,
            leading_comments: self.leading_comments.clone(),
            diagnostics_len: self.diagnostics.len(),
        }
    }

    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.token = snapshot.token;
        self.token_start = snapshot.token_start;
        self.token_end = snapshot.token_end;
        self.token_value = snapshot.token_value;
        self.preceding_line_break = snapshot.preceding_line_break;
        self.leading_comments = snapshot.leading_comments;
        self.diagnostics.truncate(snapshot.diagnostics_len);
    }

    /// Advance to the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.preceding_line_break = self.pos == 0;
        self.leading_comments.clear();
        self.token_value.clear();
        self.skip_trivia();

        self.token_start = self.pos;
        let bytes = self.source.as_bytes();
        let Some(&ch) = bytes.get(self.pos) else {
            self.token_end = self.pos;
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        let peek = |offset: usize| bytes.get(self.pos + offset).copied();
        let (kind, len) = match ch {
            b'{' => (SyntaxKind::OpenBraceToken, 1),
            b'}' => (SyntaxKind::CloseBraceToken, 1),
            b'(' => (SyntaxKind::OpenParenToken, 1),
            b')' => (SyntaxKind::CloseParenToken, 1),
            b'[' => (SyntaxKind::OpenBracketToken, 1),
            b']' => (SyntaxKind::CloseBracketToken, 1),
            b'<' => (SyntaxKind::LessThanToken, 1),
            b'>' => (SyntaxKind::GreaterThanToken, 1),
            b',' => (SyntaxKind::CommaToken, 1),
            b';' => (SyntaxKind::SemicolonToken, 1),
            b':' => (SyntaxKind::ColonToken, 1),
            b'?' => (SyntaxKind::QuestionToken, 1),
            b'|' => (SyntaxKind::BarToken, 1),
            b'&' => (SyntaxKind::AmpersandToken, 1),
            b'*' => (SyntaxKind::AsteriskToken, 1),
            b'-' => (SyntaxKind::MinusToken, 1),
            b'=' if peek(1) == Some(b'>') => (SyntaxKind::EqualsGreaterThanToken, 2),
            b'=' => (SyntaxKind::EqualsToken, 1),
            b'.' if peek(1) == Some(b'.') && peek(2) == Some(b'.') => {
                (SyntaxKind::DotDotDotToken, 3)
            }
            b'.' => (SyntaxKind::DotToken, 1),
            b'"' | b'\'' => return self.scan_string(ch),
            b'0'..=b'9' => return self.scan_number(),
            _ => {
                let c = self.current_char();
                if is_identifier_start(c) {
                    return self.scan_identifier();
                }
                self.pos += c.len_utf8();
                self.token_end = self.pos;
                let message =
                    format_message(diagnostic_messages::INVALID_CHARACTER, &[&c.to_string()]);
                self.push_error(message, diagnostic_codes::INVALID_CHARACTER);
                self.token = SyntaxKind::Unknown;
                return self.token;
            }
        };
        self.pos += len;
        self.token_end = self.pos;
        self.token = kind;
        kind
    }

    fn current_char(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    fn push_error(&mut self, message: String, code: u32) {
        let length = (self.token_end - self.token_start) as u32;
        self.diagnostics.push(Diagnostic::error(
            self.file_name.clone(),
            self.token_start as u32,
            length,
            message,
            code,
        ));
    }

    fn skip_trivia(&mut self) {
        let source = Arc::clone(&self.source);
        let bytes = source.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\n' => {
                    self.preceding_line_break = true;
                    self.mark_comment_line_break();
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'/' if bytes.get(self.pos + 1) == Some(&b'/') => {
                    let start = self.pos;
                    let end = memchr::memchr(b'\n', &bytes[start..]).map_or(bytes.len(), |i| start + i);
                    let end = if end > start && bytes[end - 1] == b'\r' { end - 1 } else { end };
                    self.leading_comments.push(CommentRange::new(
                        start as u32,
                        end as u32,
                        false,
                        false,
                    ));
                    self.pos = end;
                }
                b'/' if bytes.get(self.pos + 1) == Some(&b'*') => {
                    let start = self.pos;
                    let body = &bytes[start + 2..];
                    let end = match memchr::memmem::find(body, b"*/") {
                        Some(i) => start + 2 + i + 2,
                        None => {
                            self.token_start = start;
                            self.token_end = bytes.len();
                            self.push_error(
                                diagnostic_messages::UNTERMINATED_COMMENT.to_string(),
                                diagnostic_codes::UNTERMINATED_COMMENT,
                            );
                            bytes.len()
                        }
                    };
                    if bytes[start..end].contains(&b'\n') {
                        self.preceding_line_break = true;
                    }
                    self.leading_comments.push(CommentRange::new(
                        start as u32,
                        end as u32,
                        true,
                        false,
                    ));
                    self.pos = end;
                }
                _ => {
                    let c = self.current_char();
                    if c.is_whitespace() {
                        self.pos += c.len_utf8();
                    } else {
                        break;
                    }
                }
            }
        }
    }

    /// The last comment is followed by a line break.
    fn mark_comment_line_break(&mut self) {
        if let Some(last) = self.leading_comments.last_mut()
            && !last.has_trailing_new_line
        {
            let between = &self.source[last.end as usize..self.pos];
            if between.trim().is_empty() {
                last.has_trailing_new_line = true;
            }
        }
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        for c in self.source[start..].chars() {
            if is_identifier_part(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        self.token_end = self.pos;
        self.token_value.push_str(&self.source[start..self.pos]);
        self.token = SyntaxKind::Identifier;
        self.token
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let bytes = self.source.as_bytes();
        let start = self.pos;
        let digits = |mut p: usize| {
            while p < bytes.len() && bytes[p].is_ascii_digit() {
                p += 1;
            }
            p
        };
        let mut end = digits(start);
        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            end = digits(end + 1);
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                end = digits(exp);
            }
        }
        self.pos = end;
        self.token_end = end;
        self.token_value.push_str(&self.source[start..end]);
        self.token = SyntaxKind::NumericLiteral;
        self.token
    }

    fn scan_string(&mut self, quote: u8) -> SyntaxKind {
        let bytes = self.source.as_bytes();
        let start = self.pos;
        let mut p = start + 1;
        let mut terminated = false;
        while p < bytes.len() {
            match bytes[p] {
                b'\\' => p += 2,
                b'\n' => break,
                b if b == quote => {
                    terminated = true;
                    break;
                }
                _ => p += 1,
            }
        }
        let p = p.min(bytes.len());
        let content_end = p;
        self.pos = if terminated { p + 1 } else { p };
        self.token_end = self.pos;
        self.token_value.push_str(&self.source[start + 1..content_end]);
        if !terminated {
            self.push_error(
                diagnostic_messages::UNTERMINATED_STRING_LITERAL.to_string(),
                diagnostic_codes::UNTERMINATED_STRING_LITERAL,
            );
        }
        self.token = SyntaxKind::StringLiteral;
        self.token
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

#[cfg(test)]
#[path = "../tests/scanner_tests.rs"]
mod tests;
