use super::*;
use crate::parser::ParserState;
use ts2py_common::diagnostics::diagnostic_codes;

fn lower_source(source: &str) -> LoweredTree {
    let mut parser = ParserState::new("test.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    let (arena, _) = parser.into_parts();
    lower(&arena, root, "test.ts", LowerOptions::default())
}

fn find_kind(arena: &NodeArena, index: NodeIndex, kind: NodeKind) -> Option<NodeIndex> {
    if arena.kind(index) == Some(kind) {
        return Some(index);
    }
    arena
        .children(index)
        .iter()
        .find_map(|&c| find_kind(arena, c, kind))
}

#[test]
fn symbol_iterator_becomes_dunder_iter() {
    let tree = lower_source("interface I { [Symbol.iterator](): Iterator<string>; }");
    assert!(tree.diagnostics.is_empty());
    let function = find_kind(&tree.arena, tree.root, NodeKind::Function);
    let function = function.expect("function node");
    let name = tree.arena.children(function)[0];
    assert_eq!(tree.arena.kind(name), Some(NodeKind::Identifier));
    assert_eq!(tree.arena.text(name), "__iter__");
    assert!(find_kind(&tree.arena, tree.root, NodeKind::Special).is_none());
}

#[test]
fn unknown_special_function_warns() {
    let tree = lower_source("interface I { [Symbol.asyncIterator](): void; }");
    assert_eq!(tree.diagnostics.len(), 1);
    assert_eq!(
        tree.diagnostics[0].code,
        diagnostic_codes::UNKNOWN_SPECIAL_FUNCTION
    );
    let function = find_kind(&tree.arena, tree.root, NodeKind::Function).expect("function node");
    assert_eq!(tree.arena.text(tree.arena.children(function)[0]), "__unknown__");
}

#[test]
fn tokens_and_wrappers_are_removed() {
    let tree = lower_source("type P = (string | number);");
    assert!(find_kind(&tree.arena, tree.root, NodeKind::Token).is_none());
    assert!(find_kind(&tree.arena, tree.root, NodeKind::Parenthesized).is_none());
    let alias = tree.arena.children(tree.root)[0];
    let types = tree.arena.children(alias)[1];
    let ty = tree.arena.children(types)[0];
    // The parenthesized union collapses into the inner `Types`.
    let inner = tree.arena.children(ty)[0];
    assert_eq!(tree.arena.kind(inner), Some(NodeKind::Types));
    assert_eq!(tree.arena.children(inner).len(), 2);
}

#[test]
fn comments_dropped_by_default() {
    let tree = lower_source("// note\ninterface A {}\n");
    assert!(find_kind(&tree.arena, tree.root, NodeKind::Comment).is_none());
    assert!(
        tree.arena
            .get(tree.root)
            .is_some_and(|n| !n.has_flag(NodeFlags::KEEP_COMMENTS))
    );
}
