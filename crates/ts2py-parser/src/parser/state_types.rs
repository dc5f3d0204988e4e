//! Type expressions and literals.

use ts2py_scanner::SyntaxKind;

use super::base::NodeIndex;
use super::node::NodeKind;
use super::state::{ParseFailure, ParseResult, ParserState};

const BASIC_TYPES: &[&str] = &[
    "object", "array", "string", "number", "boolean", "null", "integer", "uinteger", "decimal",
    "unknown", "any", "void",
];

impl ParserState {
    /// `'|'? type ('|' type)*`
    pub(crate) fn parse_types(&mut self) -> ParseResult {
        self.nested(|p| p.parse_union(NodeKind::Types, Self::parse_union_member))
    }

    fn parse_union(
        &mut self,
        kind: NodeKind,
        member: fn(&mut ParserState) -> ParseResult,
    ) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        let leading_bar = self.parse_optional(SyntaxKind::BarToken);
        let first = member(self);
        match leading_bar {
            Some(bar) => {
                children.push(bar);
                children.push(self.mandatory(first, "Type")?);
            }
            None => children.push(first?),
        }
        while let Some(bar) = self.parse_optional(SyntaxKind::BarToken) {
            children.push(bar);
            let next = member(self);
            children.push(self.mandatory(next, "Type")?);
        }
        Ok(self.finish_node(kind, pos, children))
    }

    fn parse_union_member(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let first = self.parse_type()?;
        if !self.is_token(SyntaxKind::AmpersandToken) {
            return Ok(first);
        }
        let mut children = vec![first];
        while let Some(amp) = self.parse_optional(SyntaxKind::AmpersandToken) {
            children.push(amp);
            let next = self.parse_type();
            children.push(self.mandatory(next, "Type")?);
        }
        Ok(self.finish_node(NodeKind::Intersection, pos, children))
    }

    /// `readonly? primary ('[' ']')*`
    pub(crate) fn parse_type(&mut self) -> ParseResult {
        self.nested(|p| {
            let pos = p.token_pos();
            let mut children = Vec::new();
            if let Some(readonly) = p.parse_readonly_modifier() {
                children.push(readonly);
                let core = p.parse_type_core();
                children.push(p.mandatory(core, "Type")?);
            } else {
                children.push(p.parse_type_core()?);
            }
            Ok(p.finish_node(NodeKind::Type, pos, children))
        })
    }

    fn parse_readonly_modifier(&mut self) -> Option<NodeIndex> {
        if !self.is_keyword("readonly")
            || !matches!(
                self.peek_token().0,
                SyntaxKind::Identifier
                    | SyntaxKind::OpenBracketToken
                    | SyntaxKind::OpenParenToken
                    | SyntaxKind::OpenBraceToken
            )
        {
            return None;
        }
        let pos = self.token_pos();
        let end = self.scanner.token_end();
        self.next_token();
        Some(self.arena.add_leaf(NodeKind::Readonly, pos, end, "readonly"))
    }

    /// A primary type followed by any number of `[]` suffixes.
    pub(crate) fn parse_type_core(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut current = self.parse_primary_type()?;
        while self.is_token(SyntaxKind::OpenBracketToken)
            && self.peek_token().0 == SyntaxKind::CloseBracketToken
        {
            let open = self.add_token_node();
            let close = self.add_token_node();
            current = self.finish_node(NodeKind::ArrayOf, pos, vec![current, open, close]);
        }
        Ok(current)
    }

    fn parse_primary_type(&mut self) -> ParseResult {
        match self.token() {
            SyntaxKind::Identifier => {
                let word = self.scanner.token_value().to_string();
                if word == "true" || word == "false" {
                    return self.parse_literal();
                }
                if word == "new" && self.peek_token().0 == SyntaxKind::OpenParenToken {
                    return self.try_parse(Self::parse_func_type);
                }
                if BASIC_TYPES.contains(&word.as_str()) {
                    let pos = self.token_pos();
                    let end = self.scanner.token_end();
                    self.next_token();
                    return Ok(self.arena.add_leaf(NodeKind::BasicType, pos, end, word));
                }
                self.parse_type_reference()
            }
            SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral | SyntaxKind::MinusToken => {
                self.parse_literal()
            }
            SyntaxKind::OpenParenToken => match self.try_parse(Self::parse_parenthesized) {
                Err(ParseFailure::NoMatch) => self.try_parse(Self::parse_func_type),
                other => other,
            },
            SyntaxKind::OpenBraceToken => match self.try_parse(Self::parse_mapped_type) {
                Err(ParseFailure::NoMatch) => self.parse_declarations_block(),
                other => other,
            },
            SyntaxKind::OpenBracketToken => match self.try_parse(Self::parse_type_tuple) {
                Err(ParseFailure::NoMatch) => self.try_parse(Self::parse_declarations_tuple),
                other => other,
            },
            _ => Err(ParseFailure::NoMatch),
        }
    }

    /// `(types)` that is not the parameter list of a function type.
    fn parse_parenthesized(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let open = self.parse_expected(SyntaxKind::OpenParenToken)?;
        let inner = self.parse_types()?;
        let close = self.parse_expected(SyntaxKind::CloseParenToken)?;
        if self.is_token(SyntaxKind::EqualsGreaterThanToken) {
            return Err(ParseFailure::NoMatch);
        }
        Ok(self.finish_node(NodeKind::Parenthesized, pos, vec![open, inner, close]))
    }

    /// Dotted name: `Foo` or `ns.Foo`.
    pub(crate) fn parse_type_name(&mut self) -> ParseResult {
        if !self.is_token(SyntaxKind::Identifier) {
            return Err(ParseFailure::NoMatch);
        }
        let pos = self.token_pos();
        let mut name = self.scanner.token_value().to_string();
        self.next_token();
        while self.is_token(SyntaxKind::DotToken) && self.next_is_identifier() {
            self.next_token();
            name.push('.');
            name.push_str(self.scanner.token_value());
            self.next_token();
        }
        let end = self.node_end();
        Ok(self.arena.add_leaf(NodeKind::TypeName, pos, end, name))
    }

    /// `Name`, `Name<args>` or `Name["key"]`.
    pub(crate) fn parse_type_reference(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let name = self.parse_type_name()?;
        if self.is_token(SyntaxKind::LessThanToken) {
            let params = self.parse_type_parameters()?;
            return Ok(self.finish_node(NodeKind::GenericType, pos, vec![name, params]));
        }
        if self.is_token(SyntaxKind::OpenBracketToken)
            && self.peek_token().0 != SyntaxKind::CloseBracketToken
        {
            let index = self.try_parse(|p| {
                let open = p.parse_expected(SyntaxKind::OpenBracketToken)?;
                let key = match p.parse_type_name() {
                    Err(ParseFailure::NoMatch) => p.parse_literal()?,
                    other => other?,
                };
                let close = p.parse_expected(SyntaxKind::CloseBracketToken)?;
                Ok([open, key, close])
            });
            if let Ok([open, key, close]) = index {
                return Ok(self.finish_node(
                    NodeKind::IndexedType,
                    pos,
                    vec![name, open, key, close],
                ));
            }
        }
        Ok(name)
    }

    /// `<` parameter_types (`,` parameter_types)* `>`
    pub(crate) fn parse_type_parameters(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_expected(SyntaxKind::LessThanToken)?];
        self.nested(|p| {
            loop {
                let param = p.parse_union(NodeKind::ParameterTypes, Self::parse_parameter_type);
                children.push(p.mandatory(param, "Type parameter")?);
                match p.parse_optional(SyntaxKind::CommaToken) {
                    Some(comma) => children.push(comma),
                    None => break,
                }
            }
            Ok(())
        })?;
        children.push(self.expect_token(SyntaxKind::GreaterThanToken)?);
        Ok(self.finish_node(NodeKind::TypeParameters, pos, children))
    }

    /// A type argument or parameter with optional `extends` bound and default.
    fn parse_parameter_type(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        if let Some(readonly) = self.parse_readonly_modifier() {
            children.push(readonly);
            let core = self.parse_type_core();
            children.push(self.mandatory(core, "Type")?);
        } else {
            children.push(self.parse_type_core()?);
        }

        if self.is_keyword("extends") {
            let ext_pos = self.token_pos();
            let mut bound = vec![self.add_token_node()];
            if self.is_keyword("keyof") {
                bound.push(self.parse_keyof());
            }
            let core = self.parse_type_core();
            bound.push(self.mandatory(core, "Type")?);
            children.push(self.finish_node(NodeKind::ExtendsType, ext_pos, bound));
        }
        if self.is_token(SyntaxKind::EqualsToken) {
            let eq_pos = self.token_pos();
            let mut default = vec![self.add_token_node()];
            let core = self.parse_type_core();
            default.push(self.mandatory(core, "Type")?);
            children.push(self.finish_node(NodeKind::EqualsType, eq_pos, default));
        }
        Ok(self.finish_node(NodeKind::ParameterType, pos, children))
    }

    fn parse_keyof(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let end = self.scanner.token_end();
        self.next_token();
        self.arena.add_leaf(NodeKind::KeyOf, pos, end, "keyof")
    }

    // =========================================================================
    // Object-like types
    // =========================================================================

    /// `{ [key in Keys]: T }`
    fn parse_mapped_type(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_expected(SyntaxKind::OpenBraceToken)?];
        children.push(self.parse_map_signature()?);
        if let Some(semi) = self.parse_optional(SyntaxKind::SemicolonToken) {
            children.push(semi);
        }
        children.push(self.parse_expected(SyntaxKind::CloseBraceToken)?);
        Ok(self.finish_node(NodeKind::MappedType, pos, children))
    }

    /// `index_signature ':' types`
    pub(crate) fn parse_map_signature(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let signature = self.parse_index_signature()?;
        let colon = self.parse_expected(SyntaxKind::ColonToken)?;
        let types = self.parse_types();
        let types = self.mandatory(types, "Type")?;
        Ok(self.finish_node(NodeKind::MapSignature, pos, vec![signature, colon, types]))
    }

    /// `readonly? '[' name (':' | 'in' keyof? | keyof) type ']' '?'?`
    fn parse_index_signature(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        if self.is_keyword("readonly") && self.peek_token().0 == SyntaxKind::OpenBracketToken {
            children.push(self.add_token_node());
        }
        children.push(self.parse_expected(SyntaxKind::OpenBracketToken)?);
        children.push(self.parse_identifier()?);
        if let Some(colon) = self.parse_optional(SyntaxKind::ColonToken) {
            children.push(colon);
        } else if let Some(in_kw) = self.parse_optional_keyword("in") {
            children.push(in_kw);
            if self.is_keyword("keyof") {
                children.push(self.parse_keyof());
            }
        } else if self.is_keyword("keyof") {
            children.push(self.parse_keyof());
        } else {
            return Err(ParseFailure::NoMatch);
        }
        children.push(self.parse_type()?);
        children.push(self.parse_expected(SyntaxKind::CloseBracketToken)?);
        if self.is_token(SyntaxKind::QuestionToken) {
            let q_pos = self.token_pos();
            let q_end = self.scanner.token_end();
            self.next_token();
            children.push(self.arena.add_leaf(NodeKind::Optional, q_pos, q_end, "?"));
        }
        Ok(self.finish_node(NodeKind::IndexSignature, pos, children))
    }

    /// `[T, U]` or the empty tuple `[]`.
    fn parse_type_tuple(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_expected(SyntaxKind::OpenBracketToken)?];
        if !self.is_token(SyntaxKind::CloseBracketToken) {
            loop {
                children.push(self.parse_type()?);
                match self.parse_optional(SyntaxKind::CommaToken) {
                    Some(comma) => children.push(comma),
                    None => break,
                }
                if self.is_token(SyntaxKind::CloseBracketToken) {
                    break;
                }
            }
        }
        children.push(self.parse_expected(SyntaxKind::CloseBracketToken)?);
        Ok(self.finish_node(NodeKind::TypeTuple, pos, children))
    }

    // =========================================================================
    // Function types and parameter lists
    // =========================================================================

    /// `new? '(' argList? ')' '=>' types`
    fn parse_func_type(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        if let Some(new_kw) = self.parse_optional_keyword("new") {
            children.push(new_kw);
        }
        children.push(self.parse_expected(SyntaxKind::OpenParenToken)?);
        if !self.is_token(SyntaxKind::CloseParenToken) {
            children.push(self.parse_arg_list()?);
        }
        children.push(self.parse_expected(SyntaxKind::CloseParenToken)?);
        children.push(self.parse_expected(SyntaxKind::EqualsGreaterThanToken)?);
        let result = self.parse_types();
        children.push(self.mandatory(result, "Type")?);
        Ok(self.finish_node(NodeKind::FuncType, pos, children))
    }

    /// `argument (',' argument)* (',' arg_tail)?` or a lone `arg_tail`.
    pub(crate) fn parse_arg_list(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = Vec::new();
        loop {
            if self.is_token(SyntaxKind::DotDotDotToken) {
                children.push(self.parse_arg_tail()?);
                break;
            }
            match self.parse_argument() {
                Ok(arg) => children.push(arg),
                Err(ParseFailure::NoMatch) if !children.is_empty() => break,
                Err(failure) => return Err(failure),
            }
            match self.parse_optional(SyntaxKind::CommaToken) {
                Some(comma) => children.push(comma),
                None => break,
            }
            if self.is_token(SyntaxKind::CloseParenToken) {
                break;
            }
        }
        Ok(self.finish_node(NodeKind::ArgList, pos, children))
    }

    /// `name '?'? (':' types)?`
    fn parse_argument(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_identifier()?];
        if self.is_token(SyntaxKind::QuestionToken) {
            let q_pos = self.token_pos();
            let q_end = self.scanner.token_end();
            self.next_token();
            children.push(self.arena.add_leaf(NodeKind::Optional, q_pos, q_end, "?"));
        }
        if let Some(colon) = self.parse_optional(SyntaxKind::ColonToken) {
            children.push(colon);
            let types = self.parse_types();
            children.push(self.mandatory(types, "Type")?);
        }
        Ok(self.finish_node(NodeKind::Argument, pos, children))
    }

    /// `'...' name (':' type)?`
    fn parse_arg_tail(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_expected(SyntaxKind::DotDotDotToken)?];
        let name = self.parse_identifier();
        children.push(self.mandatory(name, "Identifier")?);
        if let Some(colon) = self.parse_optional(SyntaxKind::ColonToken) {
            children.push(colon);
            let core = self.parse_type_core();
            children.push(self.mandatory(core, "Type")?);
        }
        Ok(self.finish_node(NodeKind::ArgTail, pos, children))
    }

    // =========================================================================
    // Literals
    // =========================================================================

    pub(crate) fn parse_literal(&mut self) -> ParseResult {
        self.nested(|p| {
            let pos = p.token_pos();
            let value = p.parse_literal_value()?;
            Ok(p.finish_node(NodeKind::Literal, pos, vec![value]))
        })
    }

    fn parse_literal_value(&mut self) -> ParseResult {
        let pos = self.token_pos();
        match self.token() {
            SyntaxKind::MinusToken => {
                if self.peek_token().0 != SyntaxKind::NumericLiteral {
                    return Err(ParseFailure::NoMatch);
                }
                self.next_token();
                let digits = format!("-{}", self.scanner.token_value());
                Ok(self.add_number_leaf(pos, digits))
            }
            SyntaxKind::NumericLiteral => {
                let digits = self.scanner.token_value().to_string();
                Ok(self.add_number_leaf(pos, digits))
            }
            SyntaxKind::StringLiteral => Ok(self.parse_string_leaf()),
            SyntaxKind::Identifier
                if matches!(self.scanner.token_value(), "true" | "false") =>
            {
                let end = self.scanner.token_end();
                let text = self.scanner.token_value().to_string();
                self.next_token();
                Ok(self.arena.add_leaf(NodeKind::Boolean, pos, end, text))
            }
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            _ => Err(ParseFailure::NoMatch),
        }
    }

    fn add_number_leaf(&mut self, pos: u32, digits: String) -> NodeIndex {
        let end = self.scanner.token_end();
        self.next_token();
        let kind = if digits.contains(['.', 'e', 'E']) {
            NodeKind::Number
        } else {
            NodeKind::Integer
        };
        self.arena.add_leaf(kind, pos, end, digits)
    }

    /// String literal leaf keeping its quotes.
    pub(crate) fn parse_string_leaf(&mut self) -> NodeIndex {
        let pos = self.token_pos();
        let end = self.scanner.token_end();
        let text = self.scanner.token_text().to_string();
        self.next_token();
        self.arena.add_leaf(NodeKind::String, pos, end, text)
    }

    fn parse_array_literal(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_expected(SyntaxKind::OpenBracketToken)?];
        while !self.is_token(SyntaxKind::CloseBracketToken) {
            children.push(self.parse_literal()?);
            match self.parse_optional(SyntaxKind::CommaToken) {
                Some(comma) => children.push(comma),
                None => break,
            }
        }
        children.push(self.parse_expected(SyntaxKind::CloseBracketToken)?);
        Ok(self.finish_node(NodeKind::Array, pos, children))
    }

    fn parse_object_literal(&mut self) -> ParseResult {
        let pos = self.token_pos();
        let mut children = vec![self.parse_expected(SyntaxKind::OpenBraceToken)?];
        while !self.is_token(SyntaxKind::CloseBraceToken) {
            let assoc_pos = self.token_pos();
            let key = if self.is_token(SyntaxKind::StringLiteral) {
                let end = self.scanner.token_end();
                let text = self.scanner.token_value().to_string();
                self.next_token();
                self.arena.add_leaf(NodeKind::Identifier, assoc_pos, end, text)
            } else {
                self.parse_identifier()?
            };
            let colon = self.parse_expected(SyntaxKind::ColonToken)?;
            let value = self.parse_literal()?;
            children.push(self.finish_node(NodeKind::Association, assoc_pos, vec![key, colon, value]));
            match self.parse_optional(SyntaxKind::CommaToken) {
                Some(comma) => children.push(comma),
                None => break,
            }
        }
        children.push(self.parse_expected(SyntaxKind::CloseBraceToken)?);
        Ok(self.finish_node(NodeKind::Object, pos, children))
    }
}
