//! Name mapping between TypeScript and Python.

/// Python substitutes for TypeScript basic and library type names.
pub fn substitute(type_name: &str) -> Option<&'static str> {
    let python = match type_name {
        "object" => "Dict",
        "array" => "List",
        "string" => "str",
        "number" | "decimal" => "float",
        "integer" | "uinteger" => "int",
        "boolean" => "bool",
        "null" | "undefined" | "void" => "None",
        "unknown" | "any" => "Any",
        "PromiseLike" => "PromiseLike",
        "IterableIterator" => "Iterator",
        "Array" | "ReadonlyArray" => "List",
        "Record" => "Dict",
        "Uint32Array" => "List[int]",
        "Error" => "Exception",
        "RegExp" => "str",
        _ => return None,
    };
    Some(python)
}

/// Names every generated module can use without defining them.
pub const BUILTIN_NAMES: &[&str] = &[
    "Union", "List", "Tuple", "Optional", "Dict", "Set", "Any", "Generic", "Coroutine", "list",
    "tuple", "dict", "set", "frozenset", "int", "float", "str", "None",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

pub fn is_python_keyword(name: &str) -> bool {
    PYTHON_KEYWORDS.contains(&name)
}

/// Identifier usable in Python: keywords get a trailing `_`.
pub fn py_identifier(name: &str) -> String {
    if is_python_keyword(name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// [`py_identifier`] applied to every segment of a dotted name.
pub fn py_dotted_name(name: &str) -> String {
    name.split('.').map(py_identifier).collect::<Vec<_>>().join(".")
}

pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Class name for an anonymous type held by the variable `name`.
pub fn to_typename(name: &str) -> String {
    format!("{}_", capitalize(name))
}

/// Drop a trailing bracketed parameter list: `Mapping_0[K, V[T]]` gives
/// `Mapping_0`.
pub fn strip_type_parameters(name: &str) -> &str {
    if !name.ends_with(']') {
        return name;
    }
    let mut depth = 0usize;
    for (i, c) in name.char_indices().rev() {
        match c {
            ']' => depth += 1,
            '[' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &name[..i];
                }
            }
            _ => {}
        }
    }
    name
}

/// `Foo` for `Foo_`, `Foo_3` and `Foo_3[T]`; other names are returned as is.
pub fn strip_name_index(stub: &str) -> &str {
    let Some(n) = stub.rfind('_') else {
        return stub;
    };
    let ending = strip_type_parameters(stub).get(n + 1..).unwrap_or("");
    if ending.chars().all(|c| c.is_ascii_digit()) {
        &stub[..n]
    } else {
        stub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_basic_and_library_types() {
        assert_eq!(substitute("number"), Some("float"));
        assert_eq!(substitute("integer"), Some("int"));
        assert_eq!(substitute("ReadonlyArray"), Some("List"));
        assert_eq!(substitute("Uint32Array"), Some("List[int]"));
        assert_eq!(substitute("Position"), None);
    }

    #[test]
    fn keywords_get_trailing_underscore() {
        assert_eq!(py_identifier("from"), "from_");
        assert_eq!(py_identifier("range"), "range");
        assert_eq!(py_dotted_name("ns.class.Item"), "ns.class_.Item");
    }

    #[test]
    fn strips_nested_type_parameters() {
        assert_eq!(strip_type_parameters("Mapping_0[K, V]"), "Mapping_0");
        assert_eq!(strip_type_parameters("Mapping_0[K[X, Y], V]"), "Mapping_0");
        assert_eq!(strip_type_parameters("Mapping_0[K, V[T[A, B]]]"), "Mapping_0");
        assert_eq!(strip_type_parameters("Plain"), "Plain");
    }

    #[test]
    fn strips_synthesized_indices() {
        assert_eq!(strip_name_index("Foo_"), "Foo");
        assert_eq!(strip_name_index("Foo_12"), "Foo");
        assert_eq!(strip_name_index("Foo_1[T]"), "Foo");
        assert_eq!(strip_name_index("Foo_bar"), "Foo_bar");
        assert_eq!(strip_name_index("Foo"), "Foo");
        assert_eq!(to_typename("item"), "Item_");
    }
}
