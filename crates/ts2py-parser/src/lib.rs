//! Declaration grammar, syntax tree and CST-to-AST lowering for ts2py.
//!
//! - `parser` - node arena and the recursive-descent `ParserState`
//! - `syntax` - the lowering pass that turns the concrete tree into the
//!   abstract tree consumed by the compiler

pub mod parser;
pub use parser::{Node, NodeArena, NodeFlags, NodeIndex, NodeKind, NodeList, ParserState};

pub mod syntax;
pub use syntax::lowering::{LowerOptions, LoweredTree, lower};
