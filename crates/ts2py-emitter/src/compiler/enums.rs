use tracing::trace;
use ts2py_parser::{NodeIndex, NodeKind};

use super::declarations::FieldStyle;
use super::{Compiler, class_body, indent, join_block};
use crate::context::{ScopeKind, SymbolKind};
use crate::error::CompileResult;
use crate::names::py_identifier;
use crate::options::RenderAnonymous;

impl<'a> Compiler<'a> {
    // =========================================================================
    // Enumerations
    // =========================================================================

    pub(super) fn compile_enum(&mut self, idx: NodeIndex) -> CompileResult<String> {
        let name = self.identifier(idx)?;
        let mut items = Vec::new();
        let mut all_integers = true;
        for &child in self.children(idx) {
            match self.kind(child)? {
                NodeKind::Identifier => {}
                NodeKind::Comment => items.push(self.compile_comment(child)),
                NodeKind::EnumItem => {
                    let item = self.identifier(child)?;
                    match self.child(child, NodeKind::Literal) {
                        Some(literal) => {
                            all_integers &= self.is_integer_literal(literal);
                            items.push(format!("{item} = {}", self.literal_text(literal)?));
                        }
                        None if self.compat.use_enum => items.push(format!("{item} = auto()")),
                        None => items.push(format!("{item} = '{item}'")),
                    }
                }
                _ => return Err(self.unexpected(child, "enum")),
            }
        }
        let (pos, end) = self.span(idx);
        self.ctx.declare(&name, SymbolKind::Enum, pos, end);

        let header = if !self.compat.use_enum {
            format!("class {name}:")
        } else if all_integers {
            format!("class {name}(IntEnum):")
        } else {
            format!("class {name}(Enum):")
        };
        Ok(format!("{header}\n{}", indent(&class_body(&items))))
    }

    fn is_integer_literal(&self, literal: NodeIndex) -> bool {
        self.children(literal)
            .first()
            .is_some_and(|&value| self.arena.kind(value) == Some(NodeKind::Integer))
    }

    /// `const name: T = value;`
    pub(super) fn compile_const(&mut self, idx: NodeIndex) -> CompileResult<String> {
        let decl = self.required_child(idx, NodeKind::Declaration, "declaration")?;
        let value = self
            .children(idx)
            .iter()
            .copied()
            .skip_while(|&c| c != decl)
            .nth(1);
        let field = self.compile_field(decl, false)?;
        let Some(value) = value else {
            return Ok(self.render_field(&field, FieldStyle::Plain));
        };
        let text = match self.kind(value)? {
            NodeKind::Literal => self.literal_text(value)?,
            NodeKind::Identifier => py_identifier(self.text(value)),
            _ => return Err(self.unexpected(value, "constant value")),
        };
        if self.ctx.strip_const_types || !self.has_child(decl, NodeKind::Types) {
            Ok(format!("{} = {text}", field.name))
        } else {
            let ty = self.field_type(&field, FieldStyle::Plain);
            Ok(format!(
                "{}: {} = {text}",
                field.name,
                ty.render(self.quote_annotations())
            ))
        }
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    /// A namespace holding only constants becomes an enumeration; anything
    /// else a plain class.
    pub(super) fn compile_virtual_enum(&mut self, idx: NodeIndex) -> CompileResult<String> {
        let name = self.identifier(idx)?;
        let (pos, end) = self.span(idx);
        if self.ctx.lookup_local(&name) == Some(SymbolKind::TypeAlias) {
            self.ctx.overwrite(&name, SymbolKind::VirtualEnum);
        } else {
            self.ctx.declare(&name, SymbolKind::VirtualEnum, pos, end);
        }

        let members: Vec<NodeIndex> = self
            .children(idx)
            .iter()
            .copied()
            .filter(|&c| !matches!(self.arena.kind(c), Some(NodeKind::Identifier | NodeKind::Comment)))
            .collect();
        let all_consts = !members.is_empty()
            && members
                .iter()
                .all(|&m| self.arena.kind(m) == Some(NodeKind::Const));
        if !self.compat.use_enum || !all_consts {
            return self.compile_class_scope(idx, &name);
        }

        trace!(name = %name, "virtual enum");
        let all_integers = members.iter().all(|&m| {
            self.child(m, NodeKind::Literal)
                .is_none_or(|literal| self.is_integer_literal(literal))
        });
        let base = if all_integers { "IntEnum" } else { "Enum" };
        let saved = std::mem::replace(&mut self.ctx.strip_const_types, true);
        self.ctx.name_stack.push(name.clone());
        let body = self.compile_scope_items(idx);
        self.ctx.name_stack.pop();
        self.ctx.strip_const_types = saved;
        Ok(format!("class {name}({base}):\n{}", indent(&class_body(&body?))))
    }

    pub(super) fn compile_namespace(&mut self, idx: NodeIndex) -> CompileResult<String> {
        let name = self.identifier(idx)?;
        let (pos, end) = self.span(idx);
        if self.ctx.lookup_local(&name) != Some(SymbolKind::Namespace) {
            self.ctx.declare(&name, SymbolKind::Namespace, pos, end);
        }
        self.mark_overloads(idx, true);
        self.compile_class_scope(idx, &name)
    }

    /// Namespace body as a plain class with nested declarations.
    fn compile_class_scope(&mut self, idx: NodeIndex, name: &str) -> CompileResult<String> {
        self.ctx.name_stack.push(name.to_string());
        self.ctx.scope_kinds.push(ScopeKind::Namespace);
        self.ctx.push_record_frames();
        self.ctx.push_known_frame();

        let body = self.compile_scope_items(idx);

        self.ctx.pop_known_frame();
        let (local, _) = self.ctx.pop_record_frames();
        self.ctx.scope_kinds.pop();
        self.ctx.name_stack.pop();
        let body = body?;

        let header = format!("class {name}:");
        if self.ctx.render_anonymous == RenderAnonymous::Toplevel {
            let mut sections = local;
            sections.push(format!("{header}\n{}", indent(&class_body(&body))));
            Ok(sections.join("\n\n\n"))
        } else {
            let mut parts = local;
            parts.extend(body);
            Ok(format!("{header}\n{}", indent(&class_body(&parts))))
        }
    }

    /// Compiled members of a namespace, each preceded by the classes its
    /// types required.
    fn compile_scope_items(&mut self, idx: NodeIndex) -> CompileResult<Vec<String>> {
        let mut items = Vec::new();
        for &child in self.children(idx) {
            if self.kind(child)? == NodeKind::Identifier {
                continue;
            }
            let item = self.compile_item(child)?;
            let mut pending = if self.ctx.render_anonymous == RenderAnonymous::Toplevel {
                Vec::new()
            } else {
                self.ctx.take_local_classes()
            };
            if !item.is_empty() {
                pending.push(item);
            }
            if !pending.is_empty() {
                items.push(join_block(&pending));
            }
        }
        Ok(items)
    }

    // =========================================================================
    // Type aliases
    // =========================================================================

    pub(super) fn compile_type_alias(&mut self, idx: NodeIndex) -> CompileResult<String> {
        let name = self.identifier(idx)?;
        if self.ctx.overloaded_type_names.contains(&name) {
            return Ok(String::new());
        }
        let shadowed = self
            .ctx
            .lookup_local(&name)
            .is_some_and(SymbolKind::is_enumeration);
        if !shadowed {
            let (pos, end) = self.span(idx);
            self.ctx.declare(&name, SymbolKind::TypeAlias, pos, end);
        }

        let use_tp = self.compat.use_type_parameters;
        if use_tp {
            self.ctx.push_known_frame();
        }
        let (tps, type_vars) = self.process_type_parameters(idx)?;
        let types = self.required_child(idx, NodeKind::Types, "aliased type")?;
        self.ctx.name_stack.push(name.clone());
        self.ctx.push_record_frames();
        let value = self.compile_types(types);
        let (local, _) = self.ctx.pop_record_frames();
        self.ctx.name_stack.pop();
        if use_tp {
            self.ctx.pop_known_frame();
        }
        let value = value?.render(!use_tp);

        let definition = if use_tp {
            format!("type {name}{tps} = {value}")
        } else if self.compat.use_explicit_type_alias {
            format!("{name}: TypeAlias = {value}")
        } else {
            format!("{name} = {value}")
        };
        if !use_tp && (value.starts_with('\'') || value.starts_with('"')) && !shadowed {
            self.ctx.forget_local(&name);
        }

        let mut sections = Vec::new();
        if !type_vars.is_empty() {
            sections.push(type_vars.trim_end().to_string());
        }
        sections.extend(local);
        sections.push(definition);
        let text = sections.join("\n\n\n");
        if shadowed {
            let commented = text
                .lines()
                .map(|line| format!("# {line}").trim_end().to_string())
                .collect::<Vec<_>>()
                .join("\n");
            return Ok(format!(
                "# commented out, because there is already an enumeration with the same name\n{commented}"
            ));
        }
        Ok(text)
    }
}
