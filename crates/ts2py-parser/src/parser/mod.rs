//! Parser module: node types, arena, and the declaration grammar.

pub mod base;
pub use base::{NodeIndex, NodeList};

pub mod node;
pub use node::{Node, NodeFlags, NodeKind};

mod node_arena;
pub use node_arena::NodeArena;

mod state;
pub use state::ParserState;

mod state_declarations;
mod state_types;

#[cfg(test)]
#[path = "../../tests/parser_tests.rs"]
mod tests;
