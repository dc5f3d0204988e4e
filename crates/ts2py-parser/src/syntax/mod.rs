//! Syntax tree passes.

pub mod lowering;
