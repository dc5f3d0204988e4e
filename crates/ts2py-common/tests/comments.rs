use super::*;

#[test]
fn line_comment_becomes_hash_comment() {
    assert_eq!(to_python_comment("// hello world"), "# hello world");
}

#[test]
fn doc_comment_drops_markers_and_stars() {
    let text = "/**\n * The line.\n *\n * Second paragraph.\n */";
    assert_eq!(
        to_python_comment(text),
        "# The line.\n#\n# Second paragraph."
    );
}

#[test]
fn empty_block_comment_is_bare_hash() {
    assert_eq!(to_python_comment("/**/"), "#");
}

#[test]
fn inline_comment_does_not_stand_alone() {
    let source = "a /* x */ b";
    let range = CommentRange::new(2, 9, true, false);
    assert_eq!(range.get_text(source), "/* x */");
    assert!(!range.stands_alone(source));
}

#[test]
fn comment_with_trailing_newline_stands_alone() {
    let source = "// note\nx";
    let range = CommentRange::new(0, 7, false, true);
    assert!(range.stands_alone(source));
}
