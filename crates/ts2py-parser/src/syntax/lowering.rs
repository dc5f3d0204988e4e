//! CST to AST lowering.
//!
//! A single pass that copies the concrete tree into a fresh arena:
//!
//! - `Token` nodes are dropped,
//! - transparent wrappers (`Parenthesized`, `Alias`, `Qualifiers`) are replaced
//!   by their children and vanish when empty,
//! - computed members such as `[Symbol.iterator]()` become plain functions
//!   named after the matching Python dunder,
//! - comments survive only when kept and standing on their own line.
//!
//! The pass knows nothing about symbols; it never fails.

use tracing::debug;
use ts2py_common::diagnostics::{Diagnostic, diagnostic_codes, diagnostic_messages, format_message};

use crate::parser::{NodeArena, NodeFlags, NodeIndex, NodeKind};

/// Computed member names with a Python counterpart.
const SPECIAL_FUNCTIONS: &[(&str, &str)] = &[("Symbol.iterator", "__iter__")];

const UNKNOWN_SPECIAL: &str = "__unknown__";

#[derive(Clone, Copy, Debug, Default)]
pub struct LowerOptions {
    /// Keep stand-alone comments in the abstract tree.
    pub keep_comments: bool,
}

pub struct LoweredTree {
    pub arena: NodeArena,
    pub root: NodeIndex,
    /// Unlocated; positions refer to the original source.
    pub diagnostics: Vec<Diagnostic>,
}

struct Lowering<'a> {
    cst: &'a NodeArena,
    ast: NodeArena,
    file_name: &'a str,
    options: LowerOptions,
    diagnostics: Vec<Diagnostic>,
}

/// Lower the concrete tree rooted at `root` into a new arena.
pub fn lower(cst: &NodeArena, root: NodeIndex, file_name: &str, options: LowerOptions) -> LoweredTree {
    let mut lowering = Lowering {
        cst,
        ast: NodeArena::with_capacity(cst.len()),
        file_name,
        options,
        diagnostics: Vec::new(),
    };
    let lowered = lowering.lower_node(root);
    let new_root = match lowered.as_slice() {
        [single] if lowering.ast.kind(*single) == Some(NodeKind::Document) => *single,
        _ => {
            // Only happens for a root that is not a document.
            let (pos, end) = cst.get(root).map_or((0, 0), |n| (n.pos, n.end));
            lowering
                .ast
                .add_node(NodeKind::Document, pos, end, lowered, None)
        }
    };
    if options.keep_comments {
        lowering.ast.set_flags(new_root, NodeFlags::KEEP_COMMENTS);
    }
    debug!(
        cst_nodes = cst.len(),
        ast_nodes = lowering.ast.len(),
        "lowered syntax tree"
    );
    LoweredTree {
        arena: lowering.ast,
        root: new_root,
        diagnostics: lowering.diagnostics,
    }
}

impl Lowering<'_> {
    /// Zero or more AST nodes standing in for one CST node.
    fn lower_node(&mut self, index: NodeIndex) -> Vec<NodeIndex> {
        let cst = self.cst;
        let Some(node) = cst.get(index) else {
            return Vec::new();
        };
        match node.kind {
            NodeKind::Token => Vec::new(),
            NodeKind::Comment => {
                if self.options.keep_comments && node.has_flag(NodeFlags::STANDS_ALONE) {
                    let copy = self
                        .ast
                        .add_node(node.kind, node.pos, node.end, Vec::new(), node.text.clone());
                    self.ast.set_flags(copy, node.flags);
                    vec![copy]
                } else {
                    Vec::new()
                }
            }
            kind if kind.is_transparent() => self.lower_children(index),
            NodeKind::Special => vec![self.lower_special(index)],
            kind => {
                let children = self.lower_children(index);
                let copy = self
                    .ast
                    .add_node(kind, node.pos, node.end, children, node.text.clone());
                self.ast.set_flags(copy, node.flags);
                vec![copy]
            }
        }
    }

    fn lower_children(&mut self, index: NodeIndex) -> Vec<NodeIndex> {
        let cst = self.cst;
        let mut out = Vec::new();
        for &child in cst.children(index) {
            out.extend(self.lower_node(child));
        }
        out
    }

    fn lower_special(&mut self, index: NodeIndex) -> NodeIndex {
        let (pos, end) = self.cst.get(index).map_or((0, 0), |n| (n.pos, n.end));
        let mut children = self.lower_children(index);

        let name_slot = children
            .iter()
            .position(|&c| self.ast.kind(c) == Some(NodeKind::TypeName));
        if let Some(slot) = name_slot {
            let name_node = children[slot];
            let (name_pos, name_end) = self.ast.get(name_node).map_or((pos, pos), |n| (n.pos, n.end));
            let name = self.ast.text(name_node).to_string();
            let dunder = match SPECIAL_FUNCTIONS.iter().find(|(ts, _)| *ts == name) {
                Some((_, py)) => *py,
                None => {
                    let message =
                        format_message(diagnostic_messages::UNKNOWN_SPECIAL_FUNCTION, &[&name]);
                    self.diagnostics.push(Diagnostic::warning(
                        self.file_name,
                        name_pos,
                        name_end.saturating_sub(name_pos),
                        message,
                        diagnostic_codes::UNKNOWN_SPECIAL_FUNCTION,
                    ));
                    UNKNOWN_SPECIAL
                }
            };
            children[slot] = self
                .ast
                .add_leaf(NodeKind::Identifier, name_pos, name_end, dunder);
        }
        self.ast.add_node(NodeKind::Function, pos, end, children, None)
    }
}

#[cfg(test)]
#[path = "../../tests/lowering_tests.rs"]
mod tests;
