use serde::Serialize;

/// Token kinds produced by [`crate::ScannerState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxKind {
    Unknown,
    EndOfFileToken,
    Identifier,
    NumericLiteral,
    StringLiteral,
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    LessThanToken,
    GreaterThanToken,
    CommaToken,
    SemicolonToken,
    ColonToken,
    QuestionToken,
    BarToken,
    AmpersandToken,
    EqualsToken,
    EqualsGreaterThanToken,
    DotToken,
    DotDotDotToken,
    AsteriskToken,
    MinusToken,
}

impl SyntaxKind {
    /// Source text of a punctuation token, or a description for the rest.
    pub const fn describe(self) -> &'static str {
        match self {
            SyntaxKind::Unknown => "unknown token",
            SyntaxKind::EndOfFileToken => "end of file",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::NumericLiteral => "number",
            SyntaxKind::StringLiteral => "string",
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::OpenBracketToken => "[",
            SyntaxKind::CloseBracketToken => "]",
            SyntaxKind::LessThanToken => "<",
            SyntaxKind::GreaterThanToken => ">",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::SemicolonToken => ";",
            SyntaxKind::ColonToken => ":",
            SyntaxKind::QuestionToken => "?",
            SyntaxKind::BarToken => "|",
            SyntaxKind::AmpersandToken => "&",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::EqualsGreaterThanToken => "=>",
            SyntaxKind::DotToken => ".",
            SyntaxKind::DotDotDotToken => "...",
            SyntaxKind::AsteriskToken => "*",
            SyntaxKind::MinusToken => "-",
        }
    }

    pub const fn is_punctuation(self) -> bool {
        !matches!(
            self,
            SyntaxKind::Unknown
                | SyntaxKind::EndOfFileToken
                | SyntaxKind::Identifier
                | SyntaxKind::NumericLiteral
                | SyntaxKind::StringLiteral
        )
    }
}
