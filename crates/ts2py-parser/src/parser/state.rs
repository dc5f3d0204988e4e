//! Parser state: token cursor, speculation, and error recovery.
//!
//! The grammar is a set of ordered alternatives. Each rule returns
//! [`ParseResult`]: `Err(ParseFailure::NoMatch)` lets the caller try the next
//! alternative after rewinding, while `Err(ParseFailure::Mandatory)` means an
//! error was already recorded past a commit point and unwinds to the nearest
//! list loop, which resynchronizes at the next top-level keyword.

use tracing::{debug, trace};
use ts2py_common::diagnostics::{
    Diagnostic, Severity, diagnostic_codes, diagnostic_messages, format_message, sort_diagnostics,
};
use ts2py_common::limits::MAX_PARSER_RECURSION_DEPTH;
use ts2py_common::{CommentRange, LineMap};
use ts2py_scanner::{ScannerState, SyntaxKind};

use super::base::NodeIndex;
use super::node::{NodeFlags, NodeKind};
use super::node_arena::NodeArena;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ParseFailure {
    /// The rule does not apply here; nothing was reported.
    NoMatch,
    /// A commit point failed and a diagnostic was recorded.
    Mandatory,
}

pub(crate) type ParseResult<T = NodeIndex> = Result<T, ParseFailure>;

/// Words that start a top-level construct. After an error the parser skips
/// ahead to the next one of these that begins a line.
const RESUME_KEYWORDS: &[&str] = &[
    "export",
    "interface",
    "class",
    "type",
    "enum",
    "namespace",
    "declare",
    "const",
    "function",
    "import",
];

pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub arena: NodeArena,
    pub(crate) file_name: String,
    diagnostics: Vec<Diagnostic>,
    recursion_depth: u32,
    last_error_pos: Option<u32>,
    last_token_end: u32,
    fatal: bool,
}

impl ParserState {
    pub fn new(file_name: String, source_text: String) -> ParserState {
        let capacity = source_text.len() / 8;
        ParserState {
            scanner: ScannerState::new(file_name.clone(), source_text),
            arena: NodeArena::with_capacity(capacity),
            file_name,
            diagnostics: Vec::new(),
            recursion_depth: 0,
            last_error_pos: None,
            last_token_end: 0,
            fatal: false,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn source_text(&self) -> &str {
        self.scanner.source()
    }

    /// Parse the whole file and return the `Document` root.
    pub fn parse_source_file(&mut self) -> NodeIndex {
        self.next_token();
        let children = self.parse_document_items(false);
        let end = self.scanner.token_end();
        let root = self.arena.add_node(NodeKind::Document, 0, end, children, None);

        let mut diagnostics = self.scanner.take_diagnostics();
        diagnostics.append(&mut self.diagnostics);
        sort_diagnostics(&mut diagnostics);
        let line_map = LineMap::build(self.scanner.source());
        self.diagnostics = diagnostics
            .into_iter()
            .map(|d| d.located(&line_map))
            .collect();
        debug!(
            file = %self.file_name,
            nodes = self.arena.len(),
            diagnostics = self.diagnostics.len(),
            "parsed declaration file"
        );
        root
    }

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_fatal_error(&self) -> bool {
        self.fatal
    }

    pub fn into_parts(self) -> (NodeArena, Vec<Diagnostic>) {
        (self.arena, self.diagnostics)
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.last_token_end = self.scanner.token_end();
        self.scanner.scan()
    }

    #[inline]
    pub(crate) fn token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.scanner.token() == kind
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.token_pos()
    }

    /// End of the last consumed token.
    #[inline]
    pub(crate) fn node_end(&self) -> u32 {
        self.last_token_end
    }

    pub(crate) fn is_keyword(&self, word: &str) -> bool {
        self.is_token(SyntaxKind::Identifier) && self.scanner.token_value() == word
    }

    /// Kind and text of the token after the current one.
    pub(crate) fn peek_token(&mut self) -> (SyntaxKind, String) {
        let snapshot = self.scanner.save_state();
        let saved_end = self.last_token_end;
        let kind = self.next_token();
        let value = self.scanner.token_value().to_string();
        self.scanner.restore_state(snapshot);
        self.last_token_end = saved_end;
        (kind, value)
    }

    pub(crate) fn next_is_identifier(&mut self) -> bool {
        self.peek_token().0 == SyntaxKind::Identifier
    }

    /// Consume the current token as a `Token` node.
    pub(crate) fn add_token_node(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let end = self.scanner.token_end();
        let text = self.scanner.token_text().to_string();
        let index = self.arena.add_leaf(NodeKind::Token, pos, end, text);
        self.next_token();
        index
    }

    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> ParseResult {
        if self.is_token(kind) {
            Ok(self.add_token_node())
        } else {
            Err(ParseFailure::NoMatch)
        }
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> Option<NodeIndex> {
        self.is_token(kind).then(|| self.add_token_node())
    }

    pub(crate) fn parse_keyword(&mut self, word: &str) -> ParseResult {
        if self.is_keyword(word) {
            Ok(self.add_token_node())
        } else {
            Err(ParseFailure::NoMatch)
        }
    }

    pub(crate) fn parse_optional_keyword(&mut self, word: &str) -> Option<NodeIndex> {
        self.is_keyword(word).then(|| self.add_token_node())
    }

    pub(crate) fn parse_identifier(&mut self) -> ParseResult {
        if !self.is_token(SyntaxKind::Identifier) {
            return Err(ParseFailure::NoMatch);
        }
        let pos = self.token_pos();
        let end = self.scanner.token_end();
        let text = self.scanner.token_value().to_string();
        self.next_token();
        Ok(self.arena.add_leaf(NodeKind::Identifier, pos, end, text))
    }

    // =========================================================================
    // Speculation and commit points
    // =========================================================================

    /// Run `rule`, rewinding scanner, arena and diagnostics if it does not match.
    pub(crate) fn try_parse<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let snapshot = self.scanner.save_state();
        let arena_len = self.arena.len();
        let diagnostics_len = self.diagnostics.len();
        let saved_end = self.last_token_end;
        let result = rule(self);
        if matches!(result, Err(ParseFailure::NoMatch)) {
            self.scanner.restore_state(snapshot);
            self.arena.truncate(arena_len);
            self.diagnostics.truncate(diagnostics_len);
            self.last_token_end = saved_end;
        }
        result
    }

    /// Turn a failed match past a commit point into a reported error.
    pub(crate) fn mandatory<T>(&mut self, result: ParseResult<T>, expected: &str) -> ParseResult<T> {
        match result {
            Err(ParseFailure::NoMatch) => {
                let found = self.current_token_description();
                let message =
                    format_message(diagnostic_messages::EXPECTED_BUT_FOUND, &[expected, &found]);
                self.parse_error_at_current_token(&message, diagnostic_codes::MANDATORY_CONTINUATION);
                Err(ParseFailure::Mandatory)
            }
            other => other,
        }
    }

    pub(crate) fn expect_token(&mut self, kind: SyntaxKind) -> ParseResult {
        let result = self.parse_expected(kind);
        let expected = format!("'{}'", kind.describe());
        self.mandatory(result, &expected)
    }

    fn current_token_description(&self) -> String {
        match self.token() {
            SyntaxKind::EndOfFileToken => "end of file".to_string(),
            _ => self.scanner.token_text().to_string(),
        }
    }

    pub(crate) fn parse_error_at_current_token(&mut self, message: &str, code: u32) {
        let pos = self.token_pos();
        // Suppress cascades reported at the same spot.
        if self.last_error_pos == Some(pos) {
            return;
        }
        self.last_error_pos = Some(pos);
        let length = self.scanner.token_end().saturating_sub(pos);
        trace!(pos, code, message, "syntax error");
        self.diagnostics.push(Diagnostic::error(
            self.file_name.clone(),
            pos,
            length,
            message,
            code,
        ));
    }

    pub(crate) fn enter_recursion(&mut self) -> ParseResult<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_PARSER_RECURSION_DEPTH {
            if !self.fatal {
                self.fatal = true;
                self.diagnostics.push(Diagnostic::new(
                    Severity::Fatal,
                    self.file_name.clone(),
                    self.token_pos(),
                    0,
                    diagnostic_messages::NESTED_TOO_DEEPLY,
                    diagnostic_codes::RECURSION_LIMIT_EXCEEDED,
                ));
            }
            self.recursion_depth -= 1;
            return Err(ParseFailure::Mandatory);
        }
        Ok(())
    }

    pub(crate) fn exit_recursion(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    /// Run `rule` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        self.enter_recursion()?;
        let result = rule(self);
        self.exit_recursion();
        result
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    pub(crate) fn is_at_resume_point(&self) -> bool {
        if self.is_token(SyntaxKind::EndOfFileToken) {
            return true;
        }
        self.is_token(SyntaxKind::Identifier)
            && self.scanner.has_preceding_line_break()
            && RESUME_KEYWORDS.contains(&self.scanner.token_value())
    }

    /// Skip to the next construct-introducing keyword at a line start.
    /// At least one token is skipped when `force_progress` is set.
    pub(crate) fn resync(&mut self, force_progress: bool) {
        let start = self.token_pos();
        if force_progress && !self.is_token(SyntaxKind::EndOfFileToken) {
            self.next_token();
        }
        while !self.is_at_resume_point() {
            self.next_token();
        }
        debug!(from = start, to = self.token_pos(), "resynchronized after syntax error");
    }

    /// Comment trivia in front of the current token as `Comment` nodes.
    pub(crate) fn collect_leading_comments(&mut self, into: &mut Vec<NodeIndex>) {
        let ranges: Vec<CommentRange> = self.scanner.leading_comments().to_vec();
        for range in ranges {
            let text = range.get_text(self.scanner.source()).to_string();
            let mut flags = NodeFlags::empty();
            if range.is_multi_line {
                flags |= NodeFlags::MULTI_LINE;
            }
            if range.stands_alone(self.scanner.source()) {
                flags |= NodeFlags::STANDS_ALONE;
            }
            let index = self
                .arena
                .add_leaf(NodeKind::Comment, range.pos, range.end, text);
            self.arena.set_flags(index, flags);
            into.push(index);
        }
    }

    pub(crate) fn finish_node(
        &mut self,
        kind: NodeKind,
        pos: u32,
        children: Vec<NodeIndex>,
    ) -> NodeIndex {
        let end = self.node_end().max(pos);
        self.arena.add_node(kind, pos, end, children, None)
    }
}
