//! Python type expressions.
//!
//! The compiler builds a [`PyType`] tree for every TypeScript type and turns
//! it into text only where the expression is used. Whether unresolved names
//! are quoted depends on that place (annotation, alias value, base class), so
//! rendering takes the quoting decision as an argument.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PyType {
    /// A name known at the point of use.
    Name(String),
    /// A name defined later or never; quoted where evaluation is eager.
    Forward(String),
    /// Literal value text, e.g. `1`, `'a'` or `True`.
    Value(String),
    Subscript { base: Box<PyType>, args: Vec<PyType> },
    /// Bracketed argument list of `Callable`.
    Params(Vec<PyType>),
    Ellipsis,
    Union { members: Vec<PyType>, pipe: bool },
    /// `TypedDict("Name", {...})`
    TypedDictCall {
        name: String,
        fields: Vec<(String, PyType)>,
        total: bool,
    },
    /// `TypedDict[{...}]`
    TypedDictLiteral { fields: Vec<(String, PyType)> },
}

impl PyType {
    pub fn name(name: impl Into<String>) -> PyType {
        PyType::Name(name.into())
    }

    pub fn any() -> PyType {
        PyType::name("Any")
    }

    pub fn subscript(base: &str, args: Vec<PyType>) -> PyType {
        PyType::Subscript {
            base: Box::new(PyType::name(base)),
            args,
        }
    }

    /// `wrapper[inner]`
    pub fn wrap(wrapper: &str, inner: PyType) -> PyType {
        PyType::subscript(wrapper, vec![inner])
    }

    /// Name at the head of the expression, `List` for `List[int]`.
    pub fn base_name(&self) -> Option<&str> {
        match self {
            PyType::Name(name) | PyType::Forward(name) => Some(name),
            PyType::Subscript { base, .. } => base.base_name(),
            _ => None,
        }
    }

    /// Starts with a forward reference, so quoting covers the whole expression.
    pub fn is_forward(&self) -> bool {
        match self {
            PyType::Forward(_) => true,
            PyType::Subscript { base, .. } => base.is_forward(),
            _ => false,
        }
    }

    pub fn render(&self, quote: bool) -> String {
        let mut out = String::new();
        self.write(quote, &mut out);
        out
    }

    fn write(&self, quote: bool, out: &mut String) {
        match self {
            PyType::Name(text) | PyType::Value(text) => out.push_str(text),
            PyType::Forward(name) => {
                if quote {
                    out.push('\'');
                    out.push_str(name);
                    out.push('\'');
                } else {
                    out.push_str(name);
                }
            }
            PyType::Subscript { base, args } => {
                if quote && base.is_forward() {
                    out.push_str(&quote_whole(&self.render(false)));
                    return;
                }
                base.write(quote, out);
                out.push('[');
                if args.is_empty() {
                    out.push_str("()");
                } else {
                    write_list(args, quote, ", ", out);
                }
                out.push(']');
            }
            PyType::Params(items) => {
                out.push('[');
                write_list(items, quote, ", ", out);
                out.push(']');
            }
            PyType::Ellipsis => out.push_str("..."),
            PyType::Union { members, pipe } => match members.as_slice() {
                [single] => single.write(quote, out),
                _ if *pipe => {
                    // `int | 'Foo'` fails at runtime, `'int | Foo'` does not.
                    if quote && members.iter().any(PyType::is_forward) {
                        let mut plain = String::new();
                        write_list(members, false, " | ", &mut plain);
                        out.push_str(&quote_whole(&plain));
                    } else {
                        write_list(members, quote, " | ", out);
                    }
                }
                _ => {
                    out.push_str("Union[");
                    write_list(members, quote, ", ", out);
                    out.push(']');
                }
            },
            PyType::TypedDictCall {
                name,
                fields,
                total,
            } => {
                out.push_str("TypedDict(\"");
                out.push_str(name);
                out.push_str("\", ");
                write_fields(fields, quote, out);
                if !total {
                    out.push_str(", total=False");
                }
                out.push(')');
            }
            PyType::TypedDictLiteral { fields } => {
                out.push_str("TypedDict[");
                write_fields(fields, quote, out);
                out.push(']');
            }
        }
    }
}

fn write_list(items: &[PyType], quote: bool, separator: &str, out: &mut String) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        item.write(quote, out);
    }
}

fn write_fields(fields: &[(String, PyType)], quote: bool, out: &mut String) {
    out.push('{');
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push('"');
        out.push_str(key);
        out.push_str("\": ");
        value.write(quote, out);
    }
    out.push('}');
}

/// One string literal around a whole expression. The literal evaluates back
/// to `text`, whatever quotes and escapes the expression itself contains.
fn quote_whole(text: &str) -> String {
    let text = text.replace('\\', "\\\\");
    match (text.contains('\''), text.contains('"')) {
        (false, _) => format!("'{text}'"),
        (true, false) => format!("\"{text}\""),
        (true, true) => format!("'{}'", text.replace('\'', "\\'")),
    }
}

#[cfg(test)]
#[path = "../tests/py_type_tests.rs"]
mod tests;
