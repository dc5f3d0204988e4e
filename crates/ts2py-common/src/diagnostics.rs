//! Diagnostic types, severities and message templates.
//!
//! Every stage (scanner, parser, lowering, compiler, driver) reports through
//! the same [`Diagnostic`] record. A diagnostic carries both the byte span and
//! the resolved 1-based line/column so reports can be rendered without the
//! source text at hand.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::position::LineMap;

/// Diagnostic severity, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Notice,
    Warning,
    Error,
    /// No output is produced for a file with a fatal diagnostic.
    Fatal,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Notice => "Notice",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message produced while compiling one file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    /// 1-based line of `start`.
    pub line: u32,
    /// 1-based column of `start`.
    pub column: u32,
    pub severity: Severity,
    pub code: u32,
    pub message_text: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        severity: Severity,
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            file: file.into(),
            start,
            length,
            line: 0,
            column: 0,
            severity,
            code,
            message_text: message.into(),
        }
    }

    #[must_use]
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self::new(Severity::Error, file, start, length, message, code)
    }

    #[must_use]
    pub fn warning(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self::new(Severity::Warning, file, start, length, message, code)
    }

    #[must_use]
    pub fn fatal(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self::new(Severity::Fatal, file, start, length, message, code)
    }

    /// Resolve `line`/`column` from the byte offset.
    #[must_use]
    pub fn located(mut self, line_map: &LineMap) -> Self {
        let position = line_map.position_of(self.start);
        self.line = position.line + 1;
        self.column = position.character + 1;
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// `file:line:column: Severity (code): message`
    pub fn canonical(&self) -> String {
        format!(
            "{}:{}:{}: {} ({}): {}",
            self.file, self.line, self.column, self.severity, self.code, self.message_text
        )
    }
}

/// Highest severity in `diagnostics`, if any.
pub fn max_severity(diagnostics: &[Diagnostic]) -> Option<Severity> {
    diagnostics.iter().map(|d| d.severity).max()
}

/// Sort by position, keeping report order stable for equal positions.
pub fn sort_diagnostics(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by_key(|d| (d.start, d.severity));
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

pub mod diagnostic_codes {
    // Warnings (below 1000)
    pub const NOT_YET_IMPLEMENTED: u32 = 310;
    pub const UNSUPPORTED: u32 = 320;
    pub const REDEFINITION: u32 = 330;
    pub const UNKNOWN_SPECIAL_FUNCTION: u32 = 340;

    // Syntax errors
    pub const INVALID_CHARACTER: u32 = 1001;
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const UNTERMINATED_COMMENT: u32 = 1003;
    pub const MANDATORY_CONTINUATION: u32 = 1010;
    pub const DECLARATION_EXPECTED: u32 = 1020;

    // Fatal
    pub const MALFORMED_TREE: u32 = 1100;
    pub const RECURSION_LIMIT_EXCEEDED: u32 = 1200;
    pub const OUTPUT_OVERWRITES_SOURCE: u32 = 1300;
}

pub mod diagnostic_messages {
    pub const EXPECTED_BUT_FOUND: &str = "{0} expected, but found '{1}'.";
    pub const DECLARATION_EXPECTED: &str = "Declaration expected, but found '{0}'.";
    pub const INVALID_CHARACTER: &str = "Invalid character '{0}'.";
    pub const UNTERMINATED_STRING_LITERAL: &str = "Unterminated string literal.";
    pub const UNTERMINATED_COMMENT: &str = "'*/' expected.";
    pub const NESTED_TOO_DEEPLY: &str = "Declarations are nested too deeply.";
    pub const INTERSECTION_NOT_IMPLEMENTED: &str =
        "Type intersections are not yet implemented. Falling back to 'Any'.";
    pub const INDEXED_TYPE_UNSUPPORTED: &str =
        "Indexed types are not supported. Falling back to 'Any'.";
    pub const KEYOF_INDEX_UNSUPPORTED: &str =
        "Type keys (keyof) in index signatures are not supported. Falling back to 'Any'.";
    pub const MULTIPLE_AMBIENT_MODULES: &str = "Transpiling more than a single ambient module is not yet implemented. Only the first ambient module is transpiled.";
    pub const REDEFINITION: &str = "{0} '{1}' has already been defined earlier as {2}.";
    pub const UNKNOWN_SPECIAL_FUNCTION: &str = "Special function '{0}' is unknown.";
    pub const MALFORMED_TREE: &str = "Malformed tree: {0}.";
    pub const OUTPUT_OVERWRITES_SOURCE: &str =
        "Output file would overwrite the source file '{0}'.";
}

#[cfg(test)]
#[path = "../tests/diagnostics.rs"]
mod tests;
