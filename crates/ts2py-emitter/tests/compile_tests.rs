use ts2py_common::diagnostics::diagnostic_codes;
use ts2py_emitter::compiler::{BEGIN_MARKER, END_MARKER};
use ts2py_emitter::{CompiledModule, Compatibility, PythonVersion, RenderAnonymous, compile_tree};
use ts2py_parser::{LowerOptions, ParserState, lower};

const HASH: &str = "0123456789abcdef";

fn compile_with(source: &str, compat: &Compatibility) -> CompiledModule {
    let mut parser = ParserState::new("test.ts".to_string(), source.to_string());
    let root = parser.parse_source_file();
    let (arena, diagnostics) = parser.into_parts();
    assert!(diagnostics.is_empty(), "syntax errors: {diagnostics:?}");
    let tree = lower(&arena, root, "test.ts", LowerOptions::default());
    compile_tree(&tree.arena, tree.root, "test.ts", compat, HASH).expect("well-formed tree")
}

fn compile(source: &str) -> CompiledModule {
    compile_with(source, &Compatibility::default())
}

fn with_literals() -> Compatibility {
    Compatibility {
        use_literal_type: true,
        ..Compatibility::default()
    }
}

// =============================================================================
// Records
// =============================================================================

#[test]
fn interface_becomes_total_typed_dict() {
    let module = compile("interface Position { line: number; character: number; }");
    assert_eq!(
        module.code,
        "class Position(TypedDict):\n    line: float\n    character: float"
    );
    assert!(module.diagnostics.is_empty());
}

#[test]
fn integer_types_map_to_int() {
    let module = compile("interface Range { start: integer; count: uinteger; }");
    assert_eq!(
        module.code,
        "class Range(TypedDict):\n    start: int\n    count: int"
    );
}

#[test]
fn optional_field_with_not_required() {
    let compat = Compatibility {
        use_not_required: true,
        ..Compatibility::default()
    };
    let module = compile_with("interface P { x?: number; }", &compat);
    assert_eq!(module.code, "class P(TypedDict):\n    x: NotRequired[float]");
}

#[test]
fn optional_field_without_not_required_makes_record_partial() {
    let module = compile("interface P { x?: number; }");
    assert_eq!(module.code, "class P(TypedDict, total=False):\n    x: float");
}

#[test]
fn empty_interface_gets_pass() {
    let module = compile("interface Empty {}");
    assert_eq!(module.code, "class Empty(TypedDict):\n    pass");
}

#[test]
fn generic_interface_without_native_type_parameters() {
    let module = compile("interface Box<T> { value: T; }");
    assert_eq!(
        module.code,
        "T = TypeVar('T')\n\n\nclass Box(Generic[T], GenericTypedDict):\n    value: T"
    );
}

#[test]
fn generic_interface_with_native_type_parameters() {
    let compat = Compatibility::for_python_version(PythonVersion::new(3, 12)).unwrap();
    let module = compile_with("interface Box<T> { value: T; }", &compat);
    assert_eq!(module.code, "class Box[T](TypedDict):\n    value: T");
}

#[test]
fn interface_with_methods_is_a_plain_class() {
    let module = compile("interface Shape { name: string; area(): number; }");
    assert_eq!(
        module.code,
        "class Shape:\n    name: str\n\n    def area(self) -> float:\n        pass"
    );
}

#[test]
fn constructor_is_hoisted_before_the_class() {
    let module = compile("interface Foo { constructor(x: number); bar: string; }");
    assert_eq!(
        module.code,
        "def FooConstructor(x: float) -> Any:\n    pass\n\n\nclass Foo:\n    bar: str"
    );
}

// =============================================================================
// Forward references
// =============================================================================

#[test]
fn forward_references_are_quoted() {
    let source = "interface A { b: B; }\ninterface B { x: string; }";
    let module = compile(source);
    assert!(module.code.contains("    b: 'B'"), "{}", module.code);

    let postponed = Compatibility {
        use_postponed_evaluation: true,
        ..Compatibility::default()
    };
    let module = compile_with(source, &postponed);
    assert!(module.code.contains("    b: B\n"), "{}", module.code);
    assert!(module.text.contains("from __future__ import annotations"));
}

#[test]
fn earlier_definitions_are_not_quoted() {
    let module = compile("interface B { x: string; }\ninterface A { b: B[]; }");
    assert!(module.code.contains("    b: List[B]"), "{}", module.code);
}

// =============================================================================
// Type aliases and unions
// =============================================================================

#[test]
fn literal_union_becomes_literal() {
    let module = compile_with("type Severity = 1 | 2 | 3;", &with_literals());
    assert_eq!(module.code, "Severity = Literal[1, 2, 3]");
}

#[test]
fn literals_degrade_without_literal_types() {
    let module = compile("type Severity = 1 | 2 | 3;");
    assert_eq!(module.code, "Severity = int");
}

#[test]
fn duplicate_union_members_collapse() {
    let module = compile("type T = string | string;");
    assert_eq!(module.code, "T = str");
}

#[test]
fn mixed_union_groups_literals_and_names_records() {
    let source = "interface R { kind: \"a\" | \"b\" | { id: number } | null; }";
    let module = compile_with(source, &with_literals());
    assert!(
        module
            .code
            .contains("    class Kind_2(TypedDict):\n        id: float"),
        "{}",
        module.code
    );
    assert!(
        module
            .code
            .contains("    kind: Union[Literal[\"a\", \"b\"], Kind_2, None]"),
        "{}",
        module.code
    );
}

#[test]
fn duplicate_members_do_not_advance_record_ordinals() {
    let source = "interface R { kind: string | string | { id: number }; }";
    let module = compile(source);
    assert!(
        module.code.contains("    class Kind_1(TypedDict):\n        id: float"),
        "{}",
        module.code
    );
    assert!(module.code.contains("    kind: Union[str, Kind_1]"), "{}", module.code);
    assert!(!module.code.contains("Kind_2"), "{}", module.code);
}

#[test]
fn literal_and_record_members_in_any_order() {
    let cases = [
        ("\"a\" | { id: number }", "Union[Literal[\"a\"], Kind_1]", "Kind_1"),
        ("{ id: number } | \"a\"", "Union[Kind_0, Literal[\"a\"]]", "Kind_0"),
        (
            "\"a\" | { id: number } | \"b\"",
            "Union[Literal[\"a\"], Kind_1, Literal[\"b\"]]",
            "Kind_1",
        ),
        (
            "\"a\" | \"a\" | { id: number }",
            "Union[Literal[\"a\"], Kind_1]",
            "Kind_1",
        ),
        (
            "{ id: number } | \"a\" | \"b\" | null",
            "Union[Kind_0, Literal[\"a\", \"b\"], None]",
            "Kind_0",
        ),
    ];
    for (union, expected, class) in cases {
        let source = format!("interface R {{ kind: {union}; }}");
        let module = compile_with(&source, &with_literals());
        assert!(
            module.code.contains(&format!("    kind: {expected}")),
            "{union}:\n{}",
            module.code
        );
        assert!(
            module
                .code
                .contains(&format!("    class {class}(TypedDict):\n        id: float")),
            "{union}:\n{}",
            module.code
        );
        assert!(module.diagnostics.is_empty(), "{union}");
    }
}

#[test]
fn forward_union_with_both_quote_kinds_is_escaped() {
    let compat = Compatibility {
        use_literal_type: true,
        use_type_union: true,
        ..Compatibility::default()
    };
    let module = compile_with(r#"type Q = Foo | 'it\'s' | "x"; interface Foo {}"#, &compat);
    assert!(
        module
            .code
            .starts_with(r#"Q = 'Foo | Literal[\'it\\\'s\', "x"]'"#),
        "{}",
        module.code
    );
}

#[test]
fn pipe_unions_with_type_union_flag() {
    let compat = Compatibility {
        use_type_union: true,
        ..Compatibility::default()
    };
    let module = compile_with("type Id = string | number;", &compat);
    assert_eq!(module.code, "Id = str | float");
}

#[test]
fn functional_and_type_rendering_of_anonymous_records() {
    let source = "interface R { a: { b: string; c?: number }; }";
    let functional = Compatibility {
        render_anonymous: RenderAnonymous::Functional,
        ..Compatibility::default()
    };
    let module = compile_with(source, &functional);
    assert_eq!(
        module.code,
        "class R(TypedDict):\n    a: TypedDict(\"A_0\", {\"b\": str, \"c\": float}, total=False)"
    );

    let inline = Compatibility {
        render_anonymous: RenderAnonymous::Type,
        use_not_required: true,
        ..Compatibility::default()
    };
    let module = compile_with(source, &inline);
    assert_eq!(
        module.code,
        "class R(TypedDict):\n    a: TypedDict[{\"b\": str, \"c\": NotRequired[float]}]"
    );
}

#[test]
fn toplevel_rendering_hoists_anonymous_records() {
    let compat = Compatibility {
        render_anonymous: RenderAnonymous::Toplevel,
        ..Compatibility::default()
    };
    let module = compile_with("interface R { a: { b: string }; }", &compat);
    assert_eq!(
        module.code,
        "class R_A_0(TypedDict):\n    b: str\n\n\nclass R(TypedDict):\n    a: R_A_0"
    );
}

// =============================================================================
// Enumerations and namespaces
// =============================================================================

#[test]
fn constant_namespace_becomes_int_enum() {
    let module = compile("namespace Color { export const Red = 1; export const Blue = 2; }");
    assert_eq!(module.code, "class Color(IntEnum):\n    Red = 1\n    Blue = 2");
}

#[test]
fn enum_members_without_value_use_auto() {
    let module = compile("enum Direction { Up = 1, Down }");
    assert_eq!(
        module.code,
        "class Direction(IntEnum):\n    Up = 1\n    Down = auto()"
    );
}

#[test]
fn string_enum_derives_from_enum() {
    let module = compile("enum Kind { A = \"a\", B = \"b\" }");
    assert_eq!(module.code, "class Kind(Enum):\n    A = \"a\"\n    B = \"b\"");
}

#[test]
fn alias_after_enumeration_is_commented_out() {
    let module = compile("enum Kind { A = 1 }\ntype Kind = number;");
    assert!(
        module.code.ends_with(
            "# commented out, because there is already an enumeration with the same name\n# Kind = float"
        ),
        "{}",
        module.code
    );
}

#[test]
fn namespace_with_functions_is_a_plain_class() {
    let module = compile("namespace Util { function helper(x: number): string; }");
    assert_eq!(
        module.code,
        "class Util:\n    def helper(x: float) -> str:\n        pass"
    );
}

// =============================================================================
// Overloads
// =============================================================================

#[test]
fn overloaded_methods_use_single_dispatch() {
    let source = "interface Api {\n    f(x: string): void;\n    f(x: number): void;\n}";
    let module = compile(source);
    assert_eq!(module.code.matches("@singledispatchmethod").count(), 1);
    assert_eq!(module.code.matches("@f.register").count(), 2);
    assert!(module.code.contains(
        "raise TypeError(f'First argument {arg1} of single-dispatch function/method f has illegal type {type(arg1)}')"
    ));
    assert!(module.code.contains("def _(self, x: str) -> None:"));
    assert!(module.code.contains("def _(self, x: float) -> None:"));
    assert!(module.text.contains("singledispatch_shim"));
}

#[test]
fn overloaded_namespace_functions_use_single_dispatch_method() {
    let source = "namespace Util {\n    function f(x: string): void;\n    function f(x: number): void;\n}";
    let module = compile(source);
    assert!(
        module
            .code
            .starts_with("class Util:\n    @singledispatchmethod\n    def f(arg1) -> None:"),
        "{}",
        module.code
    );
    assert_eq!(module.code.matches("@f.register").count(), 2);
    assert!(module.code.contains("    def _(x: str) -> None:"));
    assert!(!module.code.contains("@singledispatch\n"));
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn intersections_fall_back_to_any() {
    let module = compile("type X = A & B;");
    assert_eq!(module.code, "X = Any");
    assert_eq!(module.diagnostics.len(), 1);
    assert_eq!(
        module.diagnostics[0].code,
        diagnostic_codes::NOT_YET_IMPLEMENTED
    );
}

#[test]
fn indexed_types_fall_back_to_any() {
    let module = compile("type Y = Foo[\"bar\"];");
    assert_eq!(module.code, "Y = Any");
    assert_eq!(module.diagnostics.len(), 1);
    assert_eq!(module.diagnostics[0].code, diagnostic_codes::UNSUPPORTED);
}

#[test]
fn redefinition_warns() {
    let module = compile("interface A { x: string; }\ninterface A { y: string; }");
    assert_eq!(module.diagnostics.len(), 1);
    assert_eq!(module.diagnostics[0].code, diagnostic_codes::REDEFINITION);
}

// =============================================================================
// Module layout
// =============================================================================

#[test]
fn module_has_header_hash_and_markers() {
    let module = compile("type T = string;");
    assert!(module.text.starts_with("# Generated by ts2py version "));
    assert!(
        module
            .text
            .contains("# compatibility level: Python 3.7 and above")
    );
    let hash = module
        .text
        .find(&format!("source_hash__ = \"{HASH}\""))
        .expect("hash line");
    let begin = module.text.find(BEGIN_MARKER).expect("begin marker");
    let code = module.text.find("T = str").expect("code");
    let end = module.text.find(END_MARKER).expect("end marker");
    assert!(hash < begin && begin < code && code < end);
    assert!(!module.text.contains("\n\n\n\n"));
}
