use tracing::trace;
use ts2py_parser::{NodeIndex, NodeKind};

use super::{Compiler, class_body, indent, join_block};
use crate::context::{Decorator, ScopeKind, SymbolKind};
use crate::error::CompileResult;
use crate::names::{py_dotted_name, py_identifier, strip_type_parameters, to_typename};
use crate::options::RenderAnonymous;
use crate::py_type::PyType;

/// How optional fields of a record are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum FieldStyle {
    /// Ordinary class: `Optional[T]`.
    Plain,
    /// `TypedDict` class or call: `NotRequired[T]` or a non-total record.
    TypedDict,
    /// `TypedDict[{...}]`: always `NotRequired[T]`.
    Inline,
}

pub(super) struct Field {
    pub name: String,
    pub ty: PyType,
    pub optional: bool,
}

pub(super) enum Member {
    Field(Field),
    Function(String),
    Comment(String),
}

impl<'a> Compiler<'a> {
    // =========================================================================
    // Interfaces
    // =========================================================================

    pub(super) fn compile_interface(&mut self, idx: NodeIndex) -> CompileResult<String> {
        let name = self.identifier(idx)?;
        let block = self.required_child(idx, NodeKind::DeclarationsBlock, "declarations block")?;
        let has_functions = self.has_child(block, NodeKind::Function);
        let use_tp = self.compat.use_type_parameters;
        trace!(name = %name, has_functions, "compile interface");

        self.ctx.name_stack.push(name.clone());
        self.ctx.scope_kinds.push(ScopeKind::Interface);
        self.ctx.push_record_frames();
        self.ctx.hoisted.push(Vec::new());
        if use_tp {
            self.ctx.push_known_frame();
        }
        let (tps, type_vars) = self.process_type_parameters(idx)?;
        if !use_tp {
            self.ctx.push_known_frame();
        }

        let mut bases = Vec::new();
        let mut base_list = String::new();
        let mut base_prefaces = Vec::new();
        if let Some(extends) = self.child(idx, NodeKind::Extends) {
            for &base in self.children(extends) {
                bases.push(self.compile_primary(base)?.render(false));
            }
            base_prefaces = self.ctx.take_local_classes();
            base_list = bases.join(", ");
            if !tps.is_empty() && !self.compat.use_variadic_generics {
                base_list.push_str(&format!(", Generic{tps}"));
            }
        } else if !tps.is_empty()
            && !use_tp
            && (!self.compat.use_variadic_generics || has_functions)
        {
            base_list = format!("Generic{tps}");
        }

        let plain = has_functions
            || bases
                .iter()
                .any(|b| !self.ctx.typed_dicts.contains(strip_type_parameters(b)));
        if !plain {
            self.ctx.typed_dicts.insert(name.clone());
        }
        let saved_mode = self.ctx.render_anonymous;
        if plain {
            self.ctx.render_anonymous = RenderAnonymous::Local;
        }

        let members = self.compile_members(block)?;
        let style = if plain {
            FieldStyle::Plain
        } else {
            FieldStyle::TypedDict
        };
        let body = self.render_members(&members, style);
        let header = self.render_class_header(
            &name,
            &base_list,
            plain,
            self.ctx.has_optional_keys(),
            &tps,
        );
        let local = self.ctx.take_local_classes();
        let class = if !plain && self.ctx.render_anonymous == RenderAnonymous::Toplevel {
            let mut sections = local;
            sections.push(format!("{header}\n{}", indent(&body)));
            sections.join("\n\n\n")
        } else {
            let mut parts = local;
            parts.push(body);
            format!("{header}\n{}", indent(&join_block(&parts)))
        };
        self.ctx.render_anonymous = saved_mode;

        self.ctx.pop_known_frame();
        self.ctx.pop_record_frames();
        self.ctx.scope_kinds.pop();
        self.ctx.name_stack.pop();
        let hoisted = self.ctx.hoisted.pop().unwrap_or_default();
        self.ctx.base_classes.insert(name.clone(), bases);
        let (pos, end) = self.span(idx);
        self.ctx.declare(&name, SymbolKind::Interface, pos, end);

        let mut sections = Vec::new();
        if !type_vars.is_empty() {
            sections.push(type_vars.trim_end().to_string());
        }
        sections.extend(base_prefaces);
        sections.extend(hoisted);
        sections.push(class);
        Ok(sections.join("\n\n\n"))
    }

    /// `class Name[T](bases, TypedDict, total=False):` and its plain variants.
    pub(super) fn render_class_header(
        &self,
        name: &str,
        bases: &str,
        plain: bool,
        has_optional: bool,
        tps: &str,
    ) -> String {
        let tps = if self.compat.use_type_parameters { tps } else { "" };
        if plain {
            return if bases.is_empty() {
                format!("class {name}{tps}:")
            } else {
                format!("class {name}{tps}({bases}):")
            };
        }
        let total = !has_optional || self.compat.use_not_required;
        let typed_dict = if !self.compat.use_variadic_generics && bases.contains("Generic[") {
            "GenericTypedDict"
        } else {
            "TypedDict"
        };
        let mut parents = if bases.is_empty() {
            typed_dict.to_string()
        } else {
            format!("{bases}, {typed_dict}")
        };
        if !total {
            parents.push_str(", total=False");
        }
        format!("class {name}{tps}({parents}):")
    }

    // =========================================================================
    // Record members
    // =========================================================================

    pub(super) fn compile_members(&mut self, block: NodeIndex) -> CompileResult<Vec<Member>> {
        let method = matches!(self.ctx.scope(), ScopeKind::Interface | ScopeKind::Namespace);
        self.mark_overloads(block, method);
        let has_functions = self.has_child(block, NodeKind::Function);
        let mut members = Vec::new();
        for &child in self.children(block) {
            match self.kind(child)? {
                NodeKind::Declaration => {
                    members.push(Member::Field(self.compile_field(child, has_functions)?));
                }
                NodeKind::Function => {
                    let function = self.compile_function(child)?;
                    if !function.is_empty() {
                        members.push(Member::Function(function));
                    }
                }
                NodeKind::Comment => members.push(Member::Comment(self.compile_comment(child))),
                // Index signatures of records have no TypedDict counterpart.
                NodeKind::MapSignature => {}
                _ => return Err(self.unexpected(child, "declarations block")),
            }
        }
        Ok(members)
    }

    /// `name?: types`. `readonly` is honored only in records without methods.
    pub(super) fn compile_field(
        &mut self,
        decl: NodeIndex,
        in_class_with_methods: bool,
    ) -> CompileResult<Field> {
        let name = self.identifier(decl)?;
        let ty = match self.child(decl, NodeKind::Types) {
            Some(types) => {
                self.ctx.name_stack.push(to_typename(&name));
                let ty = self.compile_types(types);
                self.ctx.name_stack.pop();
                ty?
            }
            None => PyType::any(),
        };
        let optional = self.has_child(decl, NodeKind::Optional);
        if optional {
            self.ctx.add_optional_key(&name);
        }
        let read_only = self.compat.allow_read_only
            && !in_class_with_methods
            && self.has_child(decl, NodeKind::Readonly);
        let ty = if read_only {
            PyType::wrap("ReadOnly", ty)
        } else {
            ty
        };
        Ok(Field { name, ty, optional })
    }

    /// Field outside a record, e.g. a variable in a namespace.
    pub(super) fn compile_variable(&mut self, decl: NodeIndex) -> CompileResult<String> {
        let field = self.compile_field(decl, false)?;
        Ok(self.render_field(&field, FieldStyle::Plain))
    }

    pub(super) fn field_type(&self, field: &Field, style: FieldStyle) -> PyType {
        if !field.optional {
            return field.ty.clone();
        }
        match style {
            FieldStyle::Plain => PyType::wrap("Optional", field.ty.clone()),
            FieldStyle::TypedDict if !self.compat.use_not_required => field.ty.clone(),
            FieldStyle::TypedDict | FieldStyle::Inline => {
                PyType::wrap("NotRequired", field.ty.clone())
            }
        }
    }

    pub(super) fn render_field(&self, field: &Field, style: FieldStyle) -> String {
        let ty = self.field_type(field, style);
        format!("{}: {}", field.name, ty.render(self.quote_annotations()))
    }

    pub(super) fn render_members(&self, members: &[Member], style: FieldStyle) -> String {
        let parts: Vec<String> = members
            .iter()
            .map(|member| match member {
                Member::Field(field) => self.render_field(field, style),
                Member::Function(text) | Member::Comment(text) => text.clone(),
            })
            .collect();
        class_body(&parts)
    }

    // =========================================================================
    // Anonymous records
    // =========================================================================

    /// `{ a: T; ... }` used as a type. Named after the innermost entry of the
    /// name stack; records with methods are always local plain classes.
    pub(super) fn compile_anonymous_record(&mut self, block: NodeIndex) -> CompileResult<PyType> {
        let plain = self.has_child(block, NodeKind::Function);
        let mode = if plain {
            RenderAnonymous::Local
        } else {
            self.ctx.render_anonymous
        };

        self.ctx.push_record_frames();
        let members = self.compile_members(block)?;
        let has_optional = self.ctx.has_optional_keys();
        let (nested, _) = self.ctx.pop_record_frames();
        let name = self.ctx.current_name().to_string();
        trace!(name = %name, ?mode, "anonymous record");

        match mode {
            RenderAnonymous::Local => {
                let style = if plain {
                    FieldStyle::Plain
                } else {
                    FieldStyle::TypedDict
                };
                let header = self.render_class_header(&name, "", plain, has_optional, "");
                let mut parts = nested;
                parts.push(self.render_members(&members, style));
                let class = format!("{header}\n{}", indent(&join_block(&parts)));
                self.ctx.queue_local_class(class);
                Ok(PyType::name(strip_type_parameters(&name)))
            }
            RenderAnonymous::Toplevel => {
                let stack = &self.ctx.name_stack;
                let enclosing = stack.len().saturating_sub(1);
                let mut parts: Vec<&str> = stack
                    .iter()
                    .take(enclosing)
                    .skip(1)
                    .map(|n| strip_type_parameters(n))
                    .collect();
                parts.push(&name);
                let class_name = parts.join("_");
                let header = self.render_class_header(&class_name, "", false, has_optional, "");
                let body = self.render_members(&members, FieldStyle::TypedDict);
                let mut sections = nested;
                sections.push(format!("{header}\n{}", indent(&body)));
                self.ctx.queue_local_class(sections.join("\n\n\n"));
                Ok(PyType::name(strip_type_parameters(&class_name)))
            }
            RenderAnonymous::Functional => {
                for class in nested {
                    self.ctx.queue_local_class(class);
                }
                Ok(PyType::TypedDictCall {
                    name: strip_type_parameters(&name).to_string(),
                    fields: self.record_fields(&members, FieldStyle::TypedDict),
                    total: !has_optional || self.compat.use_not_required,
                })
            }
            RenderAnonymous::Type => {
                for class in nested {
                    self.ctx.queue_local_class(class);
                }
                Ok(PyType::TypedDictLiteral {
                    fields: self.record_fields(&members, FieldStyle::Inline),
                })
            }
        }
    }

    fn record_fields(&self, members: &[Member], style: FieldStyle) -> Vec<(String, PyType)> {
        members
            .iter()
            .filter_map(|member| match member {
                Member::Field(field) => Some((field.name.clone(), self.field_type(field, style))),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // Functions
    // =========================================================================

    pub(super) fn compile_function(&mut self, idx: NodeIndex) -> CompileResult<String> {
        let scope = self.ctx.scope();
        let (name, is_constructor) = match self.child(idx, NodeKind::Identifier) {
            Some(ident) => {
                let name = py_identifier(self.text(ident));
                self.ctx.func_name = name.clone();
                if name == "constructor" && scope == ScopeKind::Interface {
                    (format!("{}Constructor", self.ctx.current_name()), true)
                } else {
                    (name, false)
                }
            }
            None => ("__call__".to_string(), false),
        };
        let use_tp = self.compat.use_type_parameters;
        if use_tp {
            self.ctx.push_known_frame();
        }
        let (tps, mut preface) = self.process_type_parameters(idx)?;
        if !preface.is_empty() && !self.ctx.is_toplevel() {
            if let Some(frame) = self.ctx.local_classes.last_mut() {
                frame.insert(0, preface.trim_end().to_string());
            }
            preface.clear();
        }
        let tps = if use_tp { tps } else { String::new() };
        self.ctx.func_type_parameters = tps.clone();

        let mut arguments = match self.child(idx, NodeKind::ArgList) {
            Some(list) => self.compile_arg_list(list)?,
            None => Vec::new(),
        };
        if scope == ScopeKind::Interface && !is_constructor {
            arguments.insert(0, "self".to_string());
        }
        let arguments = arguments.join(", ");
        let return_type = match self.child(idx, NodeKind::Types) {
            Some(types) => self.compile_types(types)?.render(self.quote_annotations()),
            None => "Any".to_string(),
        };
        if use_tp {
            self.ctx.pop_known_frame();
        }
        self.ctx.func_name.clear();
        self.ctx.func_type_parameters.clear();

        let text = match self.ctx.decorators.get(&idx).copied() {
            None => format!("{preface}def {name}{tps}({arguments}) -> {return_type}:\n    pass"),
            Some(decorator) => {
                let register = format!(
                    "@{name}.register\ndef _{tps}({arguments}) -> {return_type}:\n    pass"
                );
                match decorator {
                    Decorator::Register => format!("{preface}{register}"),
                    Decorator::Dispatcher { method } => {
                        // Namespace members take no `self`; `singledispatchmethod`
                        // still dispatches on the first argument of `N.f(x)`.
                        let (dispatch, params) = match (method && !is_constructor, scope) {
                            (true, ScopeKind::Interface) => ("singledispatchmethod", "self, arg1"),
                            (true, _) => ("singledispatchmethod", "arg1"),
                            (false, _) => ("singledispatch", "arg1"),
                        };
                        format!(
                            "{preface}@{dispatch}\ndef {name}{tps}({params}) -> {return_type}:\n    \
                             raise TypeError(f'First argument {{arg1}} of single-dispatch \
                             function/method {name} has illegal type {{type(arg1)}}')\n\n{register}"
                        )
                    }
                }
            }
        };

        if is_constructor && let Some(hoisted) = self.ctx.hoisted.last_mut() {
            hoisted.push(text);
            return Ok(String::new());
        }
        Ok(text)
    }

    fn compile_arg_list(&mut self, list: NodeIndex) -> CompileResult<Vec<String>> {
        let quote = self.quote_annotations();
        let mut arguments = Vec::new();
        for &arg in self.children(list) {
            let name = self.identifier(arg)?;
            let rendered = match self.kind(arg)? {
                NodeKind::Argument => {
                    let optional = self.has_child(arg, NodeKind::Optional);
                    match self.child(arg, NodeKind::Types) {
                        Some(types) => {
                            self.ctx.name_stack.push(to_typename(&name));
                            let ty = self.compile_types(types);
                            self.ctx.name_stack.pop();
                            let ty = ty?;
                            if optional {
                                let ty = PyType::wrap("Optional", ty);
                                format!("{name}: {} = None", ty.render(quote))
                            } else {
                                format!("{name}: {}", ty.render(quote))
                            }
                        }
                        None if optional => format!("{name} = None"),
                        None => name,
                    }
                }
                NodeKind::ArgTail => match self.child(arg, NodeKind::ArrayOf) {
                    Some(array) => {
                        self.ctx.name_stack.push(to_typename(&name));
                        let element = self.compile_array_element(array);
                        self.ctx.name_stack.pop();
                        format!("*{name}: {}", element?.render(quote))
                    }
                    None => format!("*{name}"),
                },
                _ => return Err(self.unexpected(arg, "argument list")),
            };
            arguments.push(rendered);
        }
        Ok(arguments)
    }

    // =========================================================================
    // Type parameters
    // =========================================================================

    /// Declare the type parameters of `owner`. Returns the bracketed list
    /// (`[K, V]`, empty without parameters) and the `TypeVar` definitions
    /// needed when native type parameters are off.
    pub(super) fn process_type_parameters(
        &mut self,
        owner: NodeIndex,
    ) -> CompileResult<(String, String)> {
        let Some(params) = self.child(owner, NodeKind::TypeParameters) else {
            return Ok((String::new(), String::new()));
        };
        let mut names = Vec::new();
        for &alternatives in self.children(params) {
            let Some(param) = self.child(alternatives, NodeKind::ParameterType) else {
                continue;
            };
            let read_only = self.has_child(param, NodeKind::Readonly);
            // Bounds and defaults have no TypeVar counterpart here.
            if let Some(type_name) = self.child(param, NodeKind::TypeName) {
                names.push((py_dotted_name(self.text(type_name)), read_only, type_name));
            }
        }
        if names.is_empty() {
            return Ok((String::new(), String::new()));
        }

        let tps = format!(
            "[{}]",
            names
                .iter()
                .map(|(name, _, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut preface = String::new();
        if !self.compat.use_type_parameters {
            for (name, _, _) in &names {
                if !self.ctx.is_known(name) {
                    preface.push_str(&format!("{name} = TypeVar('{name}')\n"));
                }
            }
        }
        for (name, read_only, node) in names {
            let (pos, end) = self.span(node);
            self.ctx
                .declare(&name, SymbolKind::TypeParameter { read_only }, pos, end);
        }
        Ok((tps, preface))
    }
}
