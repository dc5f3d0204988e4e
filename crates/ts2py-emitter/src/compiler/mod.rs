//! AST to Python compiler.
//!
//! One [`Compiler`] per file walks the abstract tree depth-first. Type
//! expressions become [`PyType`](crate::PyType) trees; declarations become text right away.
//! Classes synthesized for anonymous records are queued in the innermost
//! `local_classes` frame and placed by the declaration that owns the frame.
//!
//! The implementation is split by concern:
//! - `declarations` - interfaces, records, fields, functions, type parameters
//! - `types` - unions, literals, generics, callables, mapped types
//! - `enums` - enums, namespaces, type aliases and constants
//! - `header` - import blocks and final module layout

mod declarations;
mod enums;
pub mod header;
mod types;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use ts2py_common::comments::to_python_comment;
use ts2py_common::diagnostics::{Diagnostic, diagnostic_codes, diagnostic_messages};
use ts2py_parser::{Node, NodeArena, NodeIndex, NodeKind};

use crate::context::{CompilerContext, Decorator};
use crate::error::{CompileResult, TreeError};
use crate::names::py_identifier;
use crate::options::Compatibility;

pub use header::{BEGIN_MARKER, COMPILER_VERSION, END_MARKER, SOURCE_HASH_PREFIX};

/// Result of compiling one file.
#[derive(Clone, Debug)]
pub struct CompiledModule {
    /// Complete module: header, imports, hash line and code between markers.
    pub text: String,
    /// The generated declarations alone.
    pub code: String,
    /// Unlocated warnings raised while compiling.
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile the document at `root` into a Python module.
pub fn compile_tree(
    arena: &NodeArena,
    root: NodeIndex,
    file_name: &str,
    compat: &Compatibility,
    source_hash: &str,
) -> CompileResult<CompiledModule> {
    let mut compiler = Compiler::new(arena, file_name, compat);
    let code = compiler.compile_document(root)?;
    let text = header::assemble_module(
        &code,
        &compiler.compat,
        compiler.ctx.require_singledispatch,
        source_hash,
    );
    Ok(CompiledModule {
        text,
        code,
        diagnostics: compiler.ctx.take_diagnostics(),
    })
}

pub struct Compiler<'a> {
    arena: &'a NodeArena,
    compat: Compatibility,
    ctx: CompilerContext,
}

impl<'a> Compiler<'a> {
    pub fn new(arena: &'a NodeArena, file_name: &str, compat: &Compatibility) -> Compiler<'a> {
        let compat = compat.effective();
        let ctx = CompilerContext::new(file_name, compat.render_anonymous);
        Compiler { arena, compat, ctx }
    }

    pub fn context(&self) -> &CompilerContext {
        &self.ctx
    }

    /// Forward references in annotations need quotes unless evaluation is
    /// postponed or deferred.
    fn quote_annotations(&self) -> bool {
        !(self.compat.use_postponed_evaluation || self.compat.assume_deferred_evaluation)
    }

    // =========================================================================
    // Tree access
    // =========================================================================

    fn node(&self, idx: NodeIndex) -> CompileResult<&'a Node> {
        self.arena.get(idx).ok_or(TreeError::DanglingIndex(idx.0))
    }

    fn kind(&self, idx: NodeIndex) -> CompileResult<NodeKind> {
        self.node(idx).map(|n| n.kind)
    }

    fn children(&self, idx: NodeIndex) -> &'a [NodeIndex] {
        self.arena.children(idx)
    }

    fn text(&self, idx: NodeIndex) -> &'a str {
        self.arena.text(idx)
    }

    fn child(&self, idx: NodeIndex, kind: NodeKind) -> Option<NodeIndex> {
        self.arena.first_child_of_kind(idx, kind)
    }

    fn has_child(&self, idx: NodeIndex, kind: NodeKind) -> bool {
        self.arena.has_child_of_kind(idx, kind)
    }

    fn required_child(
        &self,
        idx: NodeIndex,
        kind: NodeKind,
        missing: &'static str,
    ) -> CompileResult<NodeIndex> {
        self.child(idx, kind).ok_or_else(|| self.missing(idx, missing))
    }

    fn missing(&self, idx: NodeIndex, missing: &'static str) -> TreeError {
        match self.arena.get(idx) {
            Some(node) => TreeError::MissingChild {
                kind: node.kind,
                pos: node.pos,
                missing,
            },
            None => TreeError::DanglingIndex(idx.0),
        }
    }

    /// Python name of the declaration's identifier.
    fn identifier(&self, idx: NodeIndex) -> CompileResult<String> {
        let ident = self.required_child(idx, NodeKind::Identifier, "identifier")?;
        Ok(py_identifier(self.text(ident)))
    }

    fn span(&self, idx: NodeIndex) -> (u32, u32) {
        self.arena.get(idx).map_or((0, 0), |n| (n.pos, n.end))
    }

    fn unexpected(&self, idx: NodeIndex, context: &'static str) -> TreeError {
        match self.arena.get(idx) {
            Some(node) => TreeError::UnexpectedNode {
                found: node.kind,
                pos: node.pos,
                context,
            },
            None => TreeError::DanglingIndex(idx.0),
        }
    }

    fn warn(&mut self, idx: NodeIndex, message: &str, code: u32) {
        let (pos, end) = self.span(idx);
        self.ctx.warn(pos, end, message.to_string(), code);
    }

    // =========================================================================
    // Documents
    // =========================================================================

    pub fn compile_document(&mut self, doc: NodeIndex) -> CompileResult<String> {
        let arena = self.arena;
        let modules: Vec<NodeIndex> = arena.children_of_kind(doc, NodeKind::Module).collect();
        if let [first, second, ..] = modules.as_slice() {
            self.warn(
                *second,
                diagnostic_messages::MULTIPLE_AMBIENT_MODULES,
                diagnostic_codes::NOT_YET_IMPLEMENTED,
            );
            let inner = self.required_child(*first, NodeKind::Document, "document")?;
            return self.compile_document(inner);
        }

        let overloaded = self.overloaded_type_names(doc);
        let saved = std::mem::replace(&mut self.ctx.overloaded_type_names, overloaded);
        self.mark_overloads(doc, false);

        let mut items = Vec::new();
        for &child in self.children(doc) {
            let item = match self.kind(child)? {
                // Top-level variables carry no type information of their own.
                NodeKind::Declaration | NodeKind::Import => continue,
                NodeKind::Module => {
                    let inner = self.required_child(child, NodeKind::Document, "document")?;
                    self.compile_document(inner)?
                }
                _ => self.compile_item(child)?,
            };
            let mut sections = self.ctx.take_local_classes();
            sections.push(item);
            let text = sections
                .iter()
                .map(|s| s.trim_matches('\n'))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n\n");
            if !text.is_empty() {
                items.push(text);
            }
        }
        self.ctx.overloaded_type_names = saved;
        debug!(items = items.len(), "compiled document");
        Ok(items.join("\n\n\n"))
    }

    /// A declaration that can stand in a document or a namespace body.
    fn compile_item(&mut self, idx: NodeIndex) -> CompileResult<String> {
        match self.kind(idx)? {
            NodeKind::Interface => self.compile_interface(idx),
            NodeKind::TypeAlias => self.compile_type_alias(idx),
            NodeKind::Namespace => self.compile_namespace(idx),
            NodeKind::VirtualEnum => self.compile_virtual_enum(idx),
            NodeKind::Enum => self.compile_enum(idx),
            NodeKind::Const => self.compile_const(idx),
            NodeKind::Function => self.compile_function(idx),
            NodeKind::Declaration => self.compile_variable(idx),
            NodeKind::Comment => Ok(self.compile_comment(idx)),
            NodeKind::Import => Ok(String::new()),
            _ => Err(self.unexpected(idx, "declaration list")),
        }
    }

    fn compile_comment(&self, idx: NodeIndex) -> String {
        to_python_comment(self.text(idx))
    }

    /// Type aliases that share their name with a namespace of `doc`.
    fn overloaded_type_names(&self, doc: NodeIndex) -> FxHashSet<String> {
        let names_of = |kind: NodeKind| -> FxHashSet<String> {
            self.arena
                .children_of_kind(doc, kind)
                .filter_map(|n| self.child(n, NodeKind::Identifier))
                .map(|ident| py_identifier(self.text(ident)))
                .collect()
        };
        let aliases = names_of(NodeKind::TypeAlias);
        let namespaces = names_of(NodeKind::Namespace);
        aliases.intersection(&namespaces).cloned().collect()
    }

    /// Turn functions declared more than once in `scope` into single-dispatch
    /// registrations.
    fn mark_overloads(&mut self, scope: NodeIndex, method: bool) {
        let arena = self.arena;
        let mut first_use: FxHashMap<String, NodeIndex> = FxHashMap::default();
        for function in arena.children_of_kind(scope, NodeKind::Function) {
            let name = match self.child(function, NodeKind::Identifier) {
                Some(ident) => py_identifier(self.text(ident)),
                None => "__call__".to_string(),
            };
            match first_use.get(&name) {
                Some(&first) => {
                    self.ctx
                        .decorators
                        .insert(first, Decorator::Dispatcher { method });
                    self.ctx.decorators.insert(function, Decorator::Register);
                    self.ctx.require_singledispatch = true;
                }
                None => {
                    first_use.insert(name, function);
                }
            }
        }
    }
}

/// Indent every non-empty line by one level.
pub(crate) fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("    {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Members of a class body: multi-line members are set off by a blank line.
pub(crate) fn join_block(parts: &[String]) -> String {
    let is_block = |part: &str| part.contains('\n') && !part.starts_with('#');
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push('\n');
            if is_block(part) || is_block(&parts[i - 1]) {
                out.push('\n');
            }
        }
        out.push_str(part);
    }
    out
}

/// Class body text, `pass` when empty.
pub(crate) fn class_body(parts: &[String]) -> String {
    if parts.is_empty() {
        "pass".to_string()
    } else {
        join_block(parts)
    }
}
