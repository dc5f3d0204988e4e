//! Centralized limits for the parser and compiler.

/// Maximum nesting depth of recursive parse rules.
///
/// Each nested type (`{ a: { b: { ... } } }`, `Array<Array<...>>`, parenthesized
/// unions) adds a few frames to the recursive-descent parser. Exceeding this
/// depth is reported as a fatal diagnostic instead of overflowing the stack.
pub const MAX_PARSER_RECURSION_DEPTH: u32 = 200;

/// Upper bound on nodes pre-allocated for one file.
pub const MAX_NODE_PREALLOC: usize = 1_000_000;

/// Maximum number of consecutive blank lines kept in generated output.
pub const MAX_BLANK_LINES: usize = 2;
