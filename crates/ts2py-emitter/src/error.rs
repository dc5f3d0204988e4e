//! Errors that abort the compilation of a single file.

use thiserror::Error;
use ts2py_parser::NodeKind;

/// The abstract tree does not have the shape the grammar guarantees.
///
/// Only reachable through hand-built or corrupted trees; the driver reports it
/// as a fatal diagnostic and produces no output for the file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("{kind:?} at offset {pos} lacks its {missing} child")]
    MissingChild {
        kind: NodeKind,
        pos: u32,
        missing: &'static str,
    },
    #[error("unexpected {found:?} at offset {pos} in {context}")]
    UnexpectedNode {
        found: NodeKind,
        pos: u32,
        context: &'static str,
    },
    #[error("node index {0} does not exist")]
    DanglingIndex(u32),
}

impl TreeError {
    /// Source offset to report the error at.
    pub fn pos(&self) -> u32 {
        match self {
            TreeError::MissingChild { pos, .. } | TreeError::UnexpectedNode { pos, .. } => *pos,
            TreeError::DanglingIndex(_) => 0,
        }
    }
}

pub type CompileResult<T> = Result<T, TreeError>;
