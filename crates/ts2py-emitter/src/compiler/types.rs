use tracing::trace;
use ts2py_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use ts2py_parser::{NodeIndex, NodeKind};

use super::Compiler;
use crate::context::SymbolKind;
use crate::error::CompileResult;
use crate::names::{capitalize, py_dotted_name, strip_name_index, substitute};
use crate::py_type::PyType;

/// Stand-in for an undeclared `PromiseLike<T>` with native type parameters.
const PROMISE_LIKE_CLASS: &str = "class PromiseLike[T]:
    def then(self, onfulfilled: Callable, onrejected: Callable) -> Self:
        pass";

/// Stand-in for an undeclared `PromiseLike<T>` otherwise.
const PROMISE_LIKE_ALIAS: &str = "PromiseLike = Iterable";

impl<'a> Compiler<'a> {
    // =========================================================================
    // Unions
    // =========================================================================

    /// Compile a `Types` or `ParameterTypes` union. Every member is compiled
    /// under its own synthesized name so that anonymous records in different
    /// members get distinct classes.
    pub(super) fn compile_types(&mut self, types: NodeIndex) -> CompileResult<PyType> {
        let original = self.ctx.current_name().to_string();
        let stub = if self.ctx.is_toplevel() {
            String::new()
        } else {
            strip_name_index(&original).to_string()
        };
        let func_name = std::mem::take(&mut self.ctx.func_name);
        let fname = capitalize(&func_name);
        let ftps = std::mem::take(&mut self.ctx.func_type_parameters);

        let mut members: Vec<(PyType, bool)> = Vec::new();
        let mut result = Ok(());
        for &member in self.children(types).iter() {
            // Duplicates do not advance the ordinal.
            let ordinal = members.len();
            self.ctx.set_current_name(format!("{fname}{stub}_{ordinal}{ftps}"));
            match self.compile_union_member(member) {
                Ok(compiled) => {
                    if !members.contains(&compiled) {
                        members.push(compiled);
                    }
                }
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        self.ctx.set_current_name(original);
        self.ctx.func_name = func_name;
        self.ctx.func_type_parameters = ftps;
        result?;

        if members.is_empty() {
            return Err(self.unexpected(types, "empty union"));
        }
        Ok(self.make_union(self.group_literals(members)))
    }

    /// Collect literal members into `Literal[...]`: all of them when the union
    /// holds nothing else, otherwise each run of adjacent literals.
    fn group_literals(&self, members: Vec<(PyType, bool)>) -> Vec<PyType> {
        if members.iter().all(|(_, literal)| *literal) {
            let values = members.into_iter().map(|(ty, _)| ty).collect();
            return vec![PyType::subscript("Literal", values)];
        }
        let mut grouped = Vec::new();
        let mut run: Vec<PyType> = Vec::new();
        for (ty, literal) in members {
            if literal {
                run.push(ty);
                continue;
            }
            if !run.is_empty() {
                grouped.push(PyType::subscript("Literal", std::mem::take(&mut run)));
            }
            grouped.push(ty);
        }
        if !run.is_empty() {
            grouped.push(PyType::subscript("Literal", run));
        }
        grouped
    }

    fn make_union(&self, mut members: Vec<PyType>) -> PyType {
        if members.len() == 1 {
            return members.remove(0);
        }
        PyType::Union {
            members,
            pipe: self.compat.use_type_union,
        }
    }

    /// A union member and whether it is a bare literal value.
    fn compile_union_member(&mut self, member: NodeIndex) -> CompileResult<(PyType, bool)> {
        match self.kind(member)? {
            NodeKind::Type | NodeKind::ParameterType => {
                if let Some(core) = self.core_of(member)
                    && self.kind(core)? == NodeKind::Literal
                    && let Some(value) = self.literal_value(core)?
                {
                    return Ok((PyType::Value(value), true));
                }
                let ty = if self.kind(member)? == NodeKind::Type {
                    self.compile_type(member)?
                } else {
                    self.compile_parameter_type(member)?
                };
                Ok((ty, false))
            }
            NodeKind::Intersection => {
                self.warn(
                    member,
                    diagnostic_messages::INTERSECTION_NOT_IMPLEMENTED,
                    diagnostic_codes::NOT_YET_IMPLEMENTED,
                );
                Ok((PyType::any(), false))
            }
            _ => Err(self.unexpected(member, "union")),
        }
    }

    /// The type expression of a `Type` or `ParameterType`, skipping modifiers,
    /// bounds and defaults.
    fn core_of(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.children(idx).iter().copied().find(|&c| {
            !matches!(
                self.arena.kind(c),
                Some(NodeKind::Readonly | NodeKind::ExtendsType | NodeKind::EqualsType)
            )
        })
    }

    // =========================================================================
    // Single types
    // =========================================================================

    pub(super) fn compile_type(&mut self, idx: NodeIndex) -> CompileResult<PyType> {
        let core = self.core_of(idx).ok_or_else(|| self.missing(idx, "type"))?;
        let ty = self.compile_primary(core)?;
        let read_only = self.has_child(idx, NodeKind::Readonly)
            || ty.base_name().is_some_and(|name| self.ctx.is_read_only_parameter(name));
        if read_only && self.compat.allow_read_only {
            Ok(PyType::wrap("ReadOnly", ty))
        } else {
            Ok(ty)
        }
    }

    fn compile_parameter_type(&mut self, idx: NodeIndex) -> CompileResult<PyType> {
        let core = self.core_of(idx).ok_or_else(|| self.missing(idx, "type"))?;
        let ty = self.compile_primary(core)?;
        if self.compat.allow_read_only && self.has_child(idx, NodeKind::Readonly) {
            Ok(PyType::wrap("ReadOnly", ty))
        } else {
            Ok(ty)
        }
    }

    pub(super) fn compile_primary(&mut self, idx: NodeIndex) -> CompileResult<PyType> {
        match self.kind(idx)? {
            NodeKind::BasicType => {
                let text = self.text(idx);
                Ok(PyType::name(substitute(text).unwrap_or(text)))
            }
            NodeKind::TypeName => Ok(self.resolve_type_name(self.text(idx))),
            NodeKind::GenericType => self.compile_generic_type(idx),
            NodeKind::ArrayOf => Ok(PyType::wrap("List", self.compile_array_element(idx)?)),
            NodeKind::TypeTuple => {
                let mut items = Vec::new();
                for &item in self.children(idx) {
                    items.push(self.compile_type(item)?);
                }
                Ok(PyType::subscript("Tuple", items))
            }
            NodeKind::IndexedType => {
                self.warn(
                    idx,
                    diagnostic_messages::INDEXED_TYPE_UNSUPPORTED,
                    diagnostic_codes::UNSUPPORTED,
                );
                Ok(PyType::any())
            }
            NodeKind::MappedType => {
                let signature = self.required_child(idx, NodeKind::MapSignature, "map signature")?;
                self.compile_map_signature(signature)
            }
            NodeKind::FuncType => self.compile_func_type(idx),
            NodeKind::Types => self.compile_types(idx),
            NodeKind::Type => self.compile_type(idx),
            NodeKind::Literal => self.compile_literal_type(idx),
            NodeKind::DeclarationsBlock | NodeKind::DeclarationsTuple => {
                self.compile_anonymous_record(idx)
            }
            _ => Err(self.unexpected(idx, "type")),
        }
    }

    /// Python name for a type reference. Names with a Python substitute and
    /// names already defined resolve directly; anything else is a forward
    /// reference.
    fn resolve_type_name(&self, name: &str) -> PyType {
        if let Some(python) = substitute(name) {
            return PyType::name(python);
        }
        let dotted = py_dotted_name(name);
        let first = dotted.split('.').next().unwrap_or(&dotted);
        if self.ctx.is_known(&dotted) || self.ctx.is_known(first) {
            PyType::Name(dotted)
        } else {
            PyType::Forward(dotted)
        }
    }

    fn compile_generic_type(&mut self, idx: NodeIndex) -> CompileResult<PyType> {
        let name_node = self.required_child(idx, NodeKind::TypeName, "type name")?;
        let params = self.required_child(idx, NodeKind::TypeParameters, "type arguments")?;
        let name = self.text(name_node);

        if name == "PromiseLike"
            && !self.ctx.is_known(name)
            && !self.ctx.name_stack.iter().any(|n| n == name)
        {
            self.define_promise_like();
        }

        let arguments = self.children(params);
        if let [only] = arguments
            && self.is_void(*only)
        {
            return Ok(self.resolve_type_name(name));
        }

        let base = self.resolve_type_name(name);
        let mut args = Vec::with_capacity(arguments.len());
        for &argument in arguments {
            args.push(self.compile_types(argument)?);
        }
        Ok(PyType::Subscript {
            base: Box::new(base),
            args,
        })
    }

    /// `ParameterTypes` holding nothing but `void`.
    fn is_void(&self, argument: NodeIndex) -> bool {
        match self.children(argument) {
            [param] => self.core_of(*param).is_some_and(|core| {
                self.arena.kind(core) == Some(NodeKind::BasicType) && self.text(core) == "void"
            }),
            _ => false,
        }
    }

    fn define_promise_like(&mut self) {
        trace!("defining PromiseLike stand-in");
        let definition = if self.compat.use_type_parameters {
            PROMISE_LIKE_CLASS
        } else {
            PROMISE_LIKE_ALIAS
        };
        if let Some(frame) = self.ctx.local_classes.first_mut() {
            frame.push(definition.to_string());
        }
        self.ctx.declare_module_wide("PromiseLike", SymbolKind::Hoisted);
    }

    /// Element type of `T[]`.
    pub(super) fn compile_array_element(&mut self, array: NodeIndex) -> CompileResult<PyType> {
        let inner = self
            .children(array)
            .first()
            .copied()
            .ok_or_else(|| self.missing(array, "element type"))?;
        self.compile_primary(inner)
    }

    /// `{ [key: K]: V }` gives `Dict[K, V]`.
    fn compile_map_signature(&mut self, signature: NodeIndex) -> CompileResult<PyType> {
        let index = self.required_child(signature, NodeKind::IndexSignature, "index signature")?;
        let key = if self.has_child(index, NodeKind::KeyOf) {
            self.warn(
                index,
                diagnostic_messages::KEYOF_INDEX_UNSUPPORTED,
                diagnostic_codes::UNSUPPORTED,
            );
            PyType::any()
        } else {
            let key_type = self.required_child(index, NodeKind::Type, "key type")?;
            self.compile_type(key_type)?
        };
        let value_types = self.required_child(signature, NodeKind::Types, "value type")?;
        let mut value = self.compile_types(value_types)?;
        if self.has_child(index, NodeKind::Optional) {
            value = PyType::wrap("Optional", value);
        }
        Ok(PyType::subscript("Dict", vec![key, value]))
    }

    /// `(a: A, b: B) => R` gives `Callable[[A, B], R]`. Optional and rest
    /// parameters cannot be expressed, so their signatures use `...`.
    fn compile_func_type(&mut self, idx: NodeIndex) -> CompileResult<PyType> {
        let params = match self.child(idx, NodeKind::ArgList) {
            Some(list) => {
                let arguments = self.children(list);
                let variadic = arguments.iter().any(|&arg| {
                    self.arena.kind(arg) == Some(NodeKind::ArgTail)
                        || self.has_child(arg, NodeKind::Optional)
                });
                if variadic {
                    PyType::Ellipsis
                } else {
                    let mut types = Vec::with_capacity(arguments.len());
                    for &arg in arguments {
                        types.push(match self.child(arg, NodeKind::Types) {
                            Some(arg_types) => self.compile_types(arg_types)?,
                            None => PyType::any(),
                        });
                    }
                    PyType::Params(types)
                }
            }
            None => PyType::Params(Vec::new()),
        };
        let result_types = self.required_child(idx, NodeKind::Types, "return type")?;
        let result = self.compile_types(result_types)?;
        Ok(PyType::subscript("Callable", vec![params, result]))
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn literal_value_node(&self, literal: NodeIndex) -> CompileResult<NodeIndex> {
        self.children(literal)
            .first()
            .copied()
            .ok_or_else(|| self.missing(literal, "literal value"))
    }

    /// Text of a scalar literal usable inside `Literal[...]`, if literal types
    /// are enabled.
    fn literal_value(&self, literal: NodeIndex) -> CompileResult<Option<String>> {
        if !self.compat.use_literal_type {
            return Ok(None);
        }
        let value = self.literal_value_node(literal)?;
        match self.kind(value)? {
            NodeKind::Array | NodeKind::Object => Ok(None),
            _ => self.literal_text(literal).map(Some),
        }
    }

    fn compile_literal_type(&mut self, literal: NodeIndex) -> CompileResult<PyType> {
        if let Some(value) = self.literal_value(literal)? {
            return Ok(PyType::wrap("Literal", PyType::Value(value)));
        }
        let value = self.literal_value_node(literal)?;
        let degraded = match self.kind(value)? {
            NodeKind::Integer => "int",
            NodeKind::Number => "float",
            NodeKind::String => "str",
            NodeKind::Boolean => "bool",
            NodeKind::Array => "List",
            NodeKind::Object => "Dict",
            _ => return Err(self.unexpected(value, "literal")),
        };
        Ok(PyType::name(degraded))
    }

    /// Python source text of a literal value.
    pub(super) fn literal_text(&self, literal: NodeIndex) -> CompileResult<String> {
        let value = self.literal_value_node(literal)?;
        match self.kind(value)? {
            NodeKind::Integer | NodeKind::Number | NodeKind::String => {
                Ok(self.text(value).to_string())
            }
            NodeKind::Boolean => Ok(if self.text(value) == "true" {
                "True".to_string()
            } else {
                "False".to_string()
            }),
            NodeKind::Array => {
                let items = self
                    .children(value)
                    .iter()
                    .map(|&item| self.literal_text(item))
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(format!("[{}]", items.join(", ")))
            }
            NodeKind::Object => {
                let mut entries = Vec::new();
                for &association in self.children(value) {
                    let key = self.required_child(association, NodeKind::Identifier, "key")?;
                    let item = self.required_child(association, NodeKind::Literal, "value")?;
                    entries.push(format!("\"{}\": {}", self.text(key), self.literal_text(item)?));
                }
                Ok(format!("{{{}}}", entries.join(", ")))
            }
            _ => Err(self.unexpected(value, "literal")),
        }
    }
}
