//! NodeArena creation and access methods.

use ts2py_common::limits::MAX_NODE_PREALLOC;

use super::base::{NodeIndex, NodeList};
use super::node::{Node, NodeFlags, NodeKind};

/// Flat storage for one syntax tree. Parents are always pushed after their
/// children, so truncating the arena discards whole subtrees.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    pub fn with_capacity(capacity: usize) -> NodeArena {
        NodeArena {
            nodes: Vec::with_capacity(capacity.min(MAX_NODE_PREALLOC)),
        }
    }

    pub fn add_node(
        &mut self,
        kind: NodeKind,
        pos: u32,
        end: u32,
        children: Vec<NodeIndex>,
        text: Option<String>,
    ) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            pos,
            end,
            flags: NodeFlags::empty(),
            children: NodeList::new(children),
            text,
        });
        index
    }

    pub fn add_leaf(&mut self, kind: NodeKind, pos: u32, end: u32, text: impl Into<String>) -> NodeIndex {
        self.add_node(kind, pos, end, Vec::new(), Some(text.into()))
    }

    pub fn set_flags(&mut self, index: NodeIndex, flags: NodeFlags) {
        if let Some(node) = self.nodes.get_mut(index.0 as usize) {
            node.flags |= flags;
        }
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node pushed after the arena had `len` nodes.
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    pub fn kind(&self, index: NodeIndex) -> Option<NodeKind> {
        self.get(index).map(|n| n.kind)
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        self.get(index).map_or(&[], |n| n.children.nodes.as_slice())
    }

    pub fn text(&self, index: NodeIndex) -> &str {
        self.get(index).map_or("", |n| n.text())
    }

    pub fn first_child_of_kind(&self, index: NodeIndex, kind: NodeKind) -> Option<NodeIndex> {
        self.children(index)
            .iter()
            .copied()
            .find(|&c| self.kind(c) == Some(kind))
    }

    pub fn children_of_kind(
        &self,
        index: NodeIndex,
        kind: NodeKind,
    ) -> impl Iterator<Item = NodeIndex> + '_ {
        self.children(index)
            .iter()
            .copied()
            .filter(move |&c| self.kind(c) == Some(kind))
    }

    pub fn has_child_of_kind(&self, index: NodeIndex, kind: NodeKind) -> bool {
        self.first_child_of_kind(index, kind).is_some()
    }

    /// Depth-first search for any descendant of `kind`.
    pub fn contains_kind(&self, index: NodeIndex, kind: NodeKind) -> bool {
        self.children(index)
            .iter()
            .any(|&c| self.kind(c) == Some(kind) || self.contains_kind(c, kind))
    }

    /// Indented `Kind "text"` listing, one node per line.
    pub fn dump(&self, index: NodeIndex) -> String {
        let mut out = String::new();
        self.dump_into(index, 0, &mut out);
        out
    }

    fn dump_into(&self, index: NodeIndex, depth: usize, out: &mut String) {
        let Some(node) = self.get(index) else {
            return;
        };
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{:?}", node.kind));
        if let Some(text) = &node.text {
            out.push_str(&format!(" {text:?}"));
        }
        out.push('\n');
        for &child in &node.children.nodes {
            self.dump_into(child, depth + 1, out);
        }
    }
}
