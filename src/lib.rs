//! ts2py: compiles TypeScript declaration files into Python modules of
//! `TypedDict` records, enumerations and type aliases.
//!
//! The pipeline is split across the workspace crates:
//! - `ts2py-scanner` tokenizes declaration text
//! - `ts2py-parser` builds the syntax tree and lowers it to the AST
//! - `ts2py-emitter` compiles the AST to Python text
//!
//! This crate drives files through that pipeline (`cli::driver`), loads the
//! configuration (`cli::config`) and renders diagnostics (`cli::reporter`).

pub use ts2py_common as common;
pub use ts2py_common::{Diagnostic, Severity};
pub use ts2py_emitter::{Compatibility, ConfigError, PythonVersion, RenderAnonymous};

pub mod cli;
pub use cli::driver::{
    CompileOutcome, FileReport, FileStatus, batch_process, compile_source, process_file,
};

// Tracing subscriber setup (TS2PY_LOG / TS2PY_LOG_TREE)
pub mod tracing_config;
