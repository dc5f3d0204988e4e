//! Tokenizer for TypeScript declaration files.
//!
//! This crate provides the lexical analysis phase:
//! - `SyntaxKind` - Token types
//! - `ScannerState` - Tokenizer state machine with lookahead snapshots
//!
//! Keywords are not distinguished from identifiers here. Declaration files
//! freely use words like `type` or `interface` as field names, so the parser
//! decides from context.

pub mod scanner;
pub use scanner::{ScannerSnapshot, ScannerState};

pub mod syntax_kind;
pub use syntax_kind::SyntaxKind;
