//! Python code generation for ts2py.
//!
//! - `options` - compatibility flags and the Python version they require
//! - `compiler` - AST to Python text, one [`compiler::Compiler`] per file
//! - `py_type` - type expressions as a tree, rendered with or without quotes
//! - `context` - scope stacks and symbol tables of one compilation
//! - `names` - TypeScript to Python name mapping

pub mod options;
pub use options::{Compatibility, ConfigError, PythonVersion, RenderAnonymous, Requirement};

pub mod error;
pub use error::TreeError;

pub mod py_type;
pub use py_type::PyType;

pub mod names;

pub mod context;
pub use context::{CompilerContext, ScopeKind, SymbolKind};

pub mod compiler;
pub use compiler::{CompiledModule, Compiler, compile_tree};
