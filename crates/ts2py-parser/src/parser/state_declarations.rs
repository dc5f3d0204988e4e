//! Top-level and member declarations.
//!
//! document, interface, type alias, namespace, enum, const, module, import,
//! function, declaration and declaration blocks.

use ts2py_common::diagnostics::{diagnostic_codes, diagnostic_messages, format_message};
use ts2py_scanner::SyntaxKind;

use super::base::NodeIndex;
use super::node::{NodeFlags, NodeKind};
use super::state::{ParseFailure, ParseResult, ParserState};

type Rule = fn(&mut ParserState) -> ParseResult;

/// Words that cannot name a field or function when another name follows.
const RESERVED_BEFORE_NAME: &[&str] = &["readonly", "function", "const", "public", "private", "protected"];

const QUALIFIERS: &[&str] = &["readonly", "static", "public", "protected", "private"];

impl ParserState {
    /// Items of a document or of an ambient module body.
    pub(crate) fn parse_document_items(&mut self, in_module: bool) -> Vec<NodeIndex> {
        let mut items = Vec::new();
        loop {
            self.collect_leading_comments(&mut items);
            if self.is_token(SyntaxKind::EndOfFileToken)
                || (in_module && self.is_token(SyntaxKind::CloseBraceToken))
            {
                break;
            }
            let start = self.token_pos();
            match self.parse_document_item() {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(ParseFailure::NoMatch) => {
                    let found = self.scanner.token_text().to_string();
                    let message = format_message(diagnostic_messages::DECLARATION_EXPECTED, &[&found]);
                    self.parse_error_at_current_token(&message, diagnostic_codes::DECLARATION_EXPECTED);
                    self.resync(true);
                }
                Err(ParseFailure::Mandatory) => {
                    if self.has_fatal_error() {
                        break;
                    }
                    let stuck = self.token_pos() == start;
                    self.resync(stuck);
                }
            }
        }
        items
    }

    /// `Ok(None)` for constructs that are parsed and dropped.
    fn parse_document_item(&mut self) -> ParseResult<Option<NodeIndex>> {
        const DECLARATIONS: [Rule; 6] = [
            ParserState::parse_interface,
            ParserState::parse_type_alias,
            ParserState::parse_namespace,
            ParserState::parse_enum,
            ParserState::parse_const,
            ParserState::parse_module,
        ];
        const MEMBERS: [Rule; 3] = [
            ParserState::parse_import,
            ParserState::parse_function,
            ParserState::parse_declaration,
        ];
        if let Some(item) = self.parse_first_of(&DECLARATIONS)? {
            return Ok(Some(item));
        }
        // `name = value;` and bare literals carry no type information.
        if self.try_parse(Self::parse_top_level_assignment).is_ok()
            || self.try_parse(Self::parse_literal).is_ok()
        {
            self.parse_optional(SyntaxKind::SemicolonToken);
            return Ok(None);
        }
        match self.parse_first_of(&MEMBERS)? {
            Some(item) => Ok(Some(item)),
            None => Err(ParseFailure::NoMatch),
        }
    }

    /// First matching rule, followed by an optional `;`.
    fn parse_first_of(&mut self, rules: &[Rule]) -> ParseResult<Option<NodeIndex>> {
        for &rule in rules {
            match self.try_parse(rule) {
                Ok(item) => {
                    self.parse_optional(SyntaxKind::SemicolonToken);
                    return Ok(Some(item));
                }
                Err(ParseFailure::NoMatch) => continue,
                Err(failure) => return Err(failure),
            }
        }
        Ok(None)
    }

    fn parse_top_level_assignment(&mut self) -> ParseResult {
        let ident = self.parse_identifier()?;
        self.parse_expected(SyntaxKind::EqualsToken)?;
        if self.try_parse(Self::parse_literal).is_err() {
            self.parse_identifier()?;
        }
        Ok(ident)
    }

    /// `export` / `declare` prefixes, consumed only when a name follows.
    fn parse_modifiers(&mut self, children: &mut Vec<NodeIndex>) -> NodeFlags {
        let mut flags = NodeFlags::empty();
        loop {
            if self.is_keyword("export") && self.next_is_identifier() {
                flags |= NodeFlags::EXPORTED;
            } else if !(self.is_keyword("declare") && self.next_is_identifier()) {
                break;
            }
            children.push(self.add_token_node());
        }
        flags
    }

    fn parse_qualifiers(&mut self) -> Option<NodeIndex> {
        let pos = self.token_pos();
        let mut children = Vec::new();
        while self.is_token(SyntaxKind::Identifier)
            && QUALIFIERS.contains(&self.scanner.token_value())
            && matches!(
                self.peek_token().0,
                SyntaxKind::Identifier | SyntaxKind::OpenBracketToken
            )
        {
            let kind = match self.scanner.token_value() {
                "readonly" => NodeKind::Readonly,
                "static" => NodeKind::Static,
                _ => NodeKind::Token,
            };
            let start = self.token_pos();
            let end = self.scanner.token_end();
            let text = self.scanner.token_value().to_string();
            self.next_token();
            children.push(self.arena.add_leaf(kind, start, end, text));
        }
        (!children.is_empty()).then(|| self.finish_node(NodeKind::Qualifiers, pos, children))
    }

    fn parse_optional_marker(&mut self) -> Option<NodeIndex> {
        if !self.is_token(SyntaxKind::QuestionToken) {
            return None;
        }
        let pos = self.token_pos();
        let end = self.scanner.token_end();
        self.next_token();
        Some(self.arena.add_leaf(NodeKind::Optional, pos, end, "?"))
    }

    /// A name that is not a reserved word in front of another name.
    fn parse_member_name(&mut self) -> ParseResult {
        if self.is_token(SyntaxKind::Identifier)
            && RESERVED_BEFORE_NAME.contains(&self.scanner.token_value())
            && self.next_is_identifier()
        {
            return Err(ParseFailure::NoMatch);
        }
        self.parse_identifier()
    }

    /// `"name"` or `name`, as an identifier node with the unquoted text.
    fn parse_quoted_identifier(&mut self) -> ParseResult {
        if self.is_token(SyntaxKind::StringLiteral) {
            let pos = self.token_pos();
            let end = self.scanner.token_end();
            let text = self.scanner.token_value().to_string();
            self.next_token();
            return Ok(self.arena.add_leaf(NodeKind::Identifier, pos, end, text));
        }
        self.parse_identifier()
    }

    // =========================================================================
    // Interfaces and classes
    // =========================================================================

    pub(crate) fn parse_interface(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        let flags = self.parse_modifiers(&mut children);
        if !(self.is_keyword("interface") || self.is_keyword("class")) {
            return Err(ParseFailure::NoMatch);
        }
        children.push(self.add_token_node());

        let name = self.parse_identifier();
        children.push(self.mandatory(name, "Identifier")?);
        if self.is_token(SyntaxKind::LessThanToken) {
            children.push(self.parse_type_parameters()?);
        }
        if self.is_keyword("extends") || self.is_keyword("implements") {
            children.push(self.parse_extends()?);
        }
        let block = self.parse_declarations_block();
        children.push(self.mandatory(block, "'{'")?);

        let node = self.finish_node(NodeKind::Interface, pos, children);
        self.arena.set_flags(node, flags);
        Ok(node)
    }

    fn parse_extends(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        while self.is_keyword("extends") || self.is_keyword("implements") {
            children.push(self.add_token_node());
            loop {
                let base = self.parse_type_reference();
                children.push(self.mandatory(base, "Base type")?);
                match self.parse_optional(SyntaxKind::CommaToken) {
                    Some(comma) => children.push(comma),
                    None => break,
                }
            }
        }
        Ok(self.finish_node(NodeKind::Extends, pos, children))
    }

    // =========================================================================
    // Type aliases
    // =========================================================================

    pub(crate) fn parse_type_alias(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        let flags = self.parse_modifiers(&mut children);
        // `type: string` is a field, not an alias.
        if !self.is_keyword("type") || !self.next_is_identifier() {
            return Err(ParseFailure::NoMatch);
        }
        children.push(self.add_token_node());
        children.push(self.parse_identifier()?);
        if self.is_token(SyntaxKind::LessThanToken) {
            children.push(self.parse_type_parameters()?);
        }
        children.push(self.expect_token(SyntaxKind::EqualsToken)?);
        let types = self.parse_types();
        children.push(self.mandatory(types, "Type")?);

        let node = self.finish_node(NodeKind::TypeAlias, pos, children);
        self.arena.set_flags(node, flags);
        Ok(node)
    }

    // =========================================================================
    // Namespaces and ambient modules
    // =========================================================================

    pub(crate) fn parse_namespace(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        let flags = self.parse_modifiers(&mut children);
        if !self.is_keyword("namespace") {
            return Err(ParseFailure::NoMatch);
        }
        children.push(self.add_token_node());
        let name = self.parse_identifier();
        children.push(self.mandatory(name, "Identifier")?);
        children.push(self.expect_token(SyntaxKind::OpenBraceToken)?);

        const MEMBERS: [Rule; 7] = [
            ParserState::parse_interface,
            ParserState::parse_type_alias,
            ParserState::parse_namespace,
            ParserState::parse_enum,
            ParserState::parse_const,
            ParserState::parse_function,
            ParserState::parse_declaration,
        ];
        let mut has_function = false;
        self.nested(|p| {
            'members: loop {
                p.collect_leading_comments(&mut children);
                if p.is_token(SyntaxKind::CloseBraceToken) || p.is_token(SyntaxKind::EndOfFileToken) {
                    break;
                }
                for rule in MEMBERS {
                    match p.try_parse(rule) {
                        Ok(member) => {
                            has_function |= p.arena.kind(member) == Some(NodeKind::Function);
                            children.push(member);
                            p.parse_optional(SyntaxKind::SemicolonToken);
                            continue 'members;
                        }
                        Err(ParseFailure::NoMatch) => {}
                        Err(failure) => return Err(failure),
                    }
                }
                break;
            }
            Ok(())
        })?;
        children.push(self.expect_token(SyntaxKind::CloseBraceToken)?);

        let kind = if has_function {
            NodeKind::Namespace
        } else {
            NodeKind::VirtualEnum
        };
        let node = self.finish_node(kind, pos, children);
        self.arena.set_flags(node, flags);
        Ok(node)
    }

    pub(crate) fn parse_module(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_keyword("declare")?];
        children.push(self.parse_keyword("module")?);
        children.push(self.parse_quoted_identifier()?);
        children.push(self.expect_token(SyntaxKind::OpenBraceToken)?);

        let doc_pos = self.token_pos();
        let items = self.nested(|p| Ok(p.parse_document_items(true)))?;
        let doc_end = self.node_end().max(doc_pos);
        children.push(
            self.arena
                .add_node(NodeKind::Document, doc_pos, doc_end, items, None),
        );
        children.push(self.expect_token(SyntaxKind::CloseBraceToken)?);
        Ok(self.finish_node(NodeKind::Module, pos, children))
    }

    pub(crate) fn parse_import(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        if !self.is_keyword("import")
            || !matches!(
                self.peek_token().0,
                SyntaxKind::Identifier
                    | SyntaxKind::AsteriskToken
                    | SyntaxKind::OpenBraceToken
                    | SyntaxKind::StringLiteral
            )
        {
            return Err(ParseFailure::NoMatch);
        }
        children.push(self.add_token_node());

        if !self.is_token(SyntaxKind::StringLiteral) {
            if let Some(star) = self.parse_optional(SyntaxKind::AsteriskToken) {
                children.push(star);
                let as_kw = self.parse_keyword("as");
                children.push(self.mandatory(as_kw, "'as'")?);
                let alias = self.parse_alias();
                children.push(self.mandatory(alias, "Identifier")?);
            } else if let Some(open) = self.parse_optional(SyntaxKind::OpenBraceToken) {
                children.push(open);
                while self.is_token(SyntaxKind::Identifier) {
                    children.push(self.parse_identifier()?);
                    if let Some(as_kw) = self.parse_optional_keyword("as") {
                        children.push(as_kw);
                        let alias = self.parse_alias();
                        children.push(self.mandatory(alias, "Identifier")?);
                    }
                    match self.parse_optional(SyntaxKind::CommaToken) {
                        Some(comma) => children.push(comma),
                        None => break,
                    }
                }
                children.push(self.expect_token(SyntaxKind::CloseBraceToken)?);
            } else {
                children.push(self.parse_identifier()?);
            }
            let from = self.parse_keyword("from");
            children.push(self.mandatory(from, "'from'")?);
        }

        if !self.is_token(SyntaxKind::StringLiteral) {
            let missing = Err(ParseFailure::NoMatch);
            return self.mandatory(missing, "Module specifier");
        }
        children.push(self.parse_string_leaf());
        Ok(self.finish_node(NodeKind::Import, pos, children))
    }

    fn parse_alias(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let name = self.parse_identifier()?;
        Ok(self.finish_node(NodeKind::Alias, pos, vec![name]))
    }

    // =========================================================================
    // Enums and constants
    // =========================================================================

    pub(crate) fn parse_enum(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        let flags = self.parse_modifiers(&mut children);
        if self.is_keyword("const") && self.peek_token().1 == "enum" {
            children.push(self.add_token_node());
        }
        if !self.is_keyword("enum") || !self.next_is_identifier() {
            return Err(ParseFailure::NoMatch);
        }
        children.push(self.add_token_node());
        children.push(self.parse_identifier()?);
        children.push(self.expect_token(SyntaxKind::OpenBraceToken)?);

        loop {
            self.collect_leading_comments(&mut children);
            if self.is_token(SyntaxKind::CloseBraceToken) {
                break;
            }
            let item = self.parse_enum_item();
            children.push(self.mandatory(item, "Enum member")?);
            match self.parse_optional(SyntaxKind::CommaToken) {
                Some(comma) => children.push(comma),
                None => {
                    self.collect_leading_comments(&mut children);
                    break;
                }
            }
        }
        children.push(self.expect_token(SyntaxKind::CloseBraceToken)?);

        let node = self.finish_node(NodeKind::Enum, pos, children);
        self.arena.set_flags(node, flags);
        Ok(node)
    }

    fn parse_enum_item(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_quoted_identifier()?];
        if let Some(eq) = self.parse_optional(SyntaxKind::EqualsToken) {
            children.push(eq);
            let value = self.parse_literal();
            children.push(self.mandatory(value, "Literal")?);
        }
        Ok(self.finish_node(NodeKind::EnumItem, pos, children))
    }

    pub(crate) fn parse_const(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        let flags = self.parse_modifiers(&mut children);
        if !self.is_keyword("const") || !self.next_is_identifier() {
            return Err(ParseFailure::NoMatch);
        }
        children.push(self.add_token_node());
        let declaration = self.parse_declaration();
        children.push(self.mandatory(declaration, "Declaration")?);
        if let Some(eq) = self.parse_optional(SyntaxKind::EqualsToken) {
            children.push(eq);
            let value = match self.try_parse(Self::parse_literal) {
                Err(ParseFailure::NoMatch) => self.parse_identifier(),
                other => other,
            };
            children.push(self.mandatory(value, "Literal or identifier")?);
        }

        let node = self.finish_node(NodeKind::Const, pos, children);
        self.arena.set_flags(node, flags);
        Ok(node)
    }

    // =========================================================================
    // Functions and declarations
    // =========================================================================

    pub(crate) fn parse_function(&mut self) -> ParseResult {
        if self.is_token(SyntaxKind::OpenBracketToken) {
            return self.parse_special();
        }
        let pos = self.token_pos();
        let mut children = Vec::new();
        if self.is_keyword("export") && self.next_is_identifier() {
            children.push(self.add_token_node());
        }
        if let Some(qualifiers) = self.parse_qualifiers() {
            children.push(qualifiers);
        }
        if self.is_keyword("function") && self.next_is_identifier() {
            children.push(self.add_token_node());
        }
        if self.is_token(SyntaxKind::Identifier) {
            children.push(self.parse_member_name()?);
            if let Some(optional) = self.parse_optional_marker() {
                children.push(optional);
            }
            if self.is_token(SyntaxKind::LessThanToken) {
                children.push(self.parse_type_parameters()?);
            }
        }
        children.push(self.parse_expected(SyntaxKind::OpenParenToken)?);
        self.parse_signature_tail(&mut children)?;
        Ok(self.finish_node(NodeKind::Function, pos, children))
    }

    /// `argList? ')' (':' types)?` after the opening parenthesis.
    fn parse_signature_tail(&mut self, children: &mut Vec<NodeIndex>) -> ParseResult<()> {
        if !self.is_token(SyntaxKind::CloseParenToken) {
            let args = self.parse_arg_list();
            children.push(self.mandatory(args, "Parameter")?);
        }
        children.push(self.expect_token(SyntaxKind::CloseParenToken)?);
        if let Some(colon) = self.parse_optional(SyntaxKind::ColonToken) {
            children.push(colon);
            let types = self.parse_types();
            children.push(self.mandatory(types, "Type")?);
        }
        Ok(())
    }

    /// `[Symbol.iterator](): T`
    fn parse_special(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_expected(SyntaxKind::OpenBracketToken)?];
        children.push(self.parse_type_name()?);
        children.push(self.parse_expected(SyntaxKind::CloseBracketToken)?);
        children.push(self.parse_expected(SyntaxKind::OpenParenToken)?);
        self.parse_signature_tail(&mut children)?;
        Ok(self.finish_node(NodeKind::Special, pos, children))
    }

    pub(crate) fn parse_declaration(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        if self.is_keyword("export") && self.next_is_identifier() {
            children.push(self.add_token_node());
        }
        if let Some(qualifiers) = self.parse_qualifiers() {
            children.push(qualifiers);
        }
        if (self.is_keyword("let") || self.is_keyword("var")) && self.next_is_identifier() {
            children.push(self.add_token_node());
        }
        children.push(self.parse_member_name()?);
        if let Some(optional) = self.parse_optional_marker() {
            children.push(optional);
        }
        if self.is_token(SyntaxKind::OpenParenToken) {
            return Err(ParseFailure::NoMatch);
        }
        if let Some(colon) = self.parse_optional(SyntaxKind::ColonToken) {
            children.push(colon);
            let types = self.parse_types();
            children.push(self.mandatory(types, "Type")?);
        }
        Ok(self.finish_node(NodeKind::Declaration, pos, children))
    }

    /// `{ member (; member)* }` where members are functions, declarations and
    /// index signatures.
    pub(crate) fn parse_declarations_block(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_expected(SyntaxKind::OpenBraceToken)?];
        self.nested(|p| {
            const MEMBERS: [Rule; 3] = [
                ParserState::parse_function,
                ParserState::parse_declaration,
                ParserState::parse_map_signature,
            ];
            'members: loop {
                p.collect_leading_comments(&mut children);
                if p.is_token(SyntaxKind::CloseBraceToken) || p.is_token(SyntaxKind::EndOfFileToken) {
                    break;
                }
                for rule in MEMBERS {
                    match p.try_parse(rule) {
                        Ok(member) => {
                            children.push(member);
                            if let Some(sep) = p
                                .parse_optional(SyntaxKind::SemicolonToken)
                                .or_else(|| p.parse_optional(SyntaxKind::CommaToken))
                            {
                                children.push(sep);
                            }
                            continue 'members;
                        }
                        Err(ParseFailure::NoMatch) => {}
                        Err(failure) => return Err(failure),
                    }
                }
                break;
            }
            Ok(())
        })?;
        children.push(self.expect_token(SyntaxKind::CloseBraceToken)?);
        Ok(self.finish_node(NodeKind::DeclarationsBlock, pos, children))
    }

    /// `[a: string, b?: number]`
    pub(crate) fn parse_declarations_tuple(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_expected(SyntaxKind::OpenBracketToken)?];
        loop {
            children.push(self.parse_declaration()?);
            match self.parse_optional(SyntaxKind::CommaToken) {
                Some(comma) => children.push(comma),
                None => break,
            }
        }
        children.push(self.parse_expected(SyntaxKind::CloseBracketToken)?);
        Ok(self.finish_node(NodeKind::DeclarationsTuple, pos, children))
    }
}
