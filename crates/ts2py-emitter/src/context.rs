//! Per-file compiler state.
//!
//! All scope stacks are pushed and popped in pairs by the compiler. The bottom
//! frame of each stack belongs to the module and is never popped; symbols
//! additionally keep a frame of builtins below it.

use rustc_hash::{FxHashMap, FxHashSet};
use ts2py_common::diagnostics::{Diagnostic, diagnostic_codes, diagnostic_messages, format_message};
use ts2py_parser::NodeIndex;

use crate::names::{BUILTIN_NAMES, strip_type_parameters};
use crate::options::RenderAnonymous;

pub const TOPLEVEL: &str = "TOPLEVEL_";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Builtin,
    Interface,
    TypeAlias,
    Enum,
    VirtualEnum,
    Namespace,
    TypeParameter { read_only: bool },
    /// Stand-in definitions the compiler emits itself.
    Hoisted,
}

impl SymbolKind {
    pub const fn label(self) -> &'static str {
        match self {
            SymbolKind::Builtin => "builtin",
            SymbolKind::Interface => "interface",
            SymbolKind::TypeAlias => "type alias",
            SymbolKind::Enum => "enum",
            SymbolKind::VirtualEnum => "virtual enum",
            SymbolKind::Namespace => "namespace",
            SymbolKind::TypeParameter { .. } => "type parameter",
            SymbolKind::Hoisted => "hoisted definition",
        }
    }

    /// Enumeration-like definitions that shadow a later type alias.
    pub const fn is_enumeration(self) -> bool {
        matches!(
            self,
            SymbolKind::Enum | SymbolKind::VirtualEnum | SymbolKind::Namespace
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Toplevel,
    Interface,
    Namespace,
}

/// How an overloaded function is emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decorator {
    /// First declaration: emits the single-dispatch fallback, then registers.
    Dispatcher { method: bool },
    Register,
}

pub struct CompilerContext {
    file_name: String,
    known_types: Vec<FxHashMap<String, SymbolKind>>,
    pub local_classes: Vec<Vec<String>>,
    pub optional_keys: Vec<Vec<String>>,
    pub name_stack: Vec<String>,
    pub scope_kinds: Vec<ScopeKind>,
    pub base_classes: FxHashMap<String, Vec<String>>,
    pub typed_dicts: FxHashSet<String>,
    pub overloaded_type_names: FxHashSet<String>,
    pub decorators: FxHashMap<NodeIndex, Decorator>,
    /// Constructor functions of the interfaces being compiled.
    pub hoisted: Vec<Vec<String>>,
    pub func_name: String,
    pub func_type_parameters: String,
    pub strip_const_types: bool,
    pub require_singledispatch: bool,
    pub render_anonymous: RenderAnonymous,
    diagnostics: Vec<Diagnostic>,
}

impl CompilerContext {
    pub fn new(file_name: &str, render_anonymous: RenderAnonymous) -> CompilerContext {
        let builtins = BUILTIN_NAMES
            .iter()
            .map(|name| (name.to_string(), SymbolKind::Builtin))
            .collect();
        let mut typed_dicts = FxHashSet::default();
        typed_dicts.insert("TypedDict".to_string());
        CompilerContext {
            file_name: file_name.to_string(),
            known_types: vec![builtins, FxHashMap::default()],
            local_classes: vec![Vec::new()],
            optional_keys: vec![Vec::new()],
            name_stack: vec![TOPLEVEL.to_string()],
            scope_kinds: vec![ScopeKind::Toplevel],
            base_classes: FxHashMap::default(),
            typed_dicts,
            overloaded_type_names: FxHashSet::default(),
            decorators: FxHashMap::default(),
            hoisted: Vec::new(),
            func_name: String::new(),
            func_type_parameters: String::new(),
            strip_const_types: false,
            require_singledispatch: false,
            render_anonymous,
            diagnostics: Vec::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    // =========================================================================
    // Symbols
    // =========================================================================

    pub fn push_known_frame(&mut self) {
        self.known_types.push(FxHashMap::default());
    }

    pub fn pop_known_frame(&mut self) {
        if self.known_types.len() > 2 {
            self.known_types.pop();
        }
    }

    /// Innermost definition of `name`; `List[str]` is looked up as `List`.
    pub fn lookup(&self, name: &str) -> Option<SymbolKind> {
        let name = strip_type_parameters(name);
        self.known_types
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Definition of `name` in the innermost frame only.
    pub fn lookup_local(&self, name: &str) -> Option<SymbolKind> {
        self.known_types
            .last()
            .and_then(|frame| frame.get(name).copied())
    }

    /// Record a definition in the innermost frame. Redefining a name of that
    /// frame warns, except for type parameters.
    pub fn declare(&mut self, name: &str, kind: SymbolKind, pos: u32, end: u32) {
        if let Some(previous) = self.lookup_local(name)
            && !matches!(kind, SymbolKind::TypeParameter { .. })
        {
            let message = format_message(
                diagnostic_messages::REDEFINITION,
                &[kind.label(), name, previous.label()],
            );
            self.warn(pos, end, message, diagnostic_codes::REDEFINITION);
        }
        self.overwrite(name, kind);
    }

    /// Record a definition without checking for an earlier one.
    pub fn overwrite(&mut self, name: &str, kind: SymbolKind) {
        if let Some(frame) = self.known_types.last_mut() {
            frame.insert(name.to_string(), kind);
        }
    }

    /// Record a definition visible in every scope of the module.
    pub fn declare_module_wide(&mut self, name: &str, kind: SymbolKind) {
        if let Some(frame) = self.known_types.get_mut(1) {
            frame.insert(name.to_string(), kind);
        }
    }

    pub fn forget_local(&mut self, name: &str) {
        if let Some(frame) = self.known_types.last_mut() {
            frame.remove(name);
        }
    }

    pub fn is_read_only_parameter(&self, name: &str) -> bool {
        matches!(
            self.lookup(name),
            Some(SymbolKind::TypeParameter { read_only: true })
        )
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// No named declaration is open.
    pub fn is_toplevel(&self) -> bool {
        self.name_stack.len() == 1 && self.name_stack[0] == TOPLEVEL
    }

    pub fn scope(&self) -> ScopeKind {
        self.scope_kinds.last().copied().unwrap_or(ScopeKind::Toplevel)
    }

    pub fn current_name(&self) -> &str {
        self.name_stack.last().map_or(TOPLEVEL, String::as_str)
    }

    pub fn set_current_name(&mut self, name: String) {
        if let Some(last) = self.name_stack.last_mut() {
            *last = name;
        }
    }

    /// Open a frame for pending classes and optional keys of one record.
    pub fn push_record_frames(&mut self) {
        self.local_classes.push(Vec::new());
        self.optional_keys.push(Vec::new());
    }

    /// Close the innermost record frames, returning pending classes and the
    /// optional keys collected.
    pub fn pop_record_frames(&mut self) -> (Vec<String>, Vec<String>) {
        let classes = if self.local_classes.len() > 1 {
            self.local_classes.pop().unwrap_or_default()
        } else {
            std::mem::take(&mut self.local_classes[0])
        };
        let keys = if self.optional_keys.len() > 1 {
            self.optional_keys.pop().unwrap_or_default()
        } else {
            std::mem::take(&mut self.optional_keys[0])
        };
        (classes, keys)
    }

    pub fn queue_local_class(&mut self, class: String) {
        if let Some(frame) = self.local_classes.last_mut() {
            frame.push(class);
        }
    }

    /// Take the classes queued in the innermost frame.
    pub fn take_local_classes(&mut self) -> Vec<String> {
        self.local_classes
            .last_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn add_optional_key(&mut self, key: &str) {
        if let Some(frame) = self.optional_keys.last_mut() {
            frame.push(key.to_string());
        }
    }

    pub fn has_optional_keys(&self) -> bool {
        self.optional_keys.last().is_some_and(|keys| !keys.is_empty())
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub fn warn(&mut self, pos: u32, end: u32, message: String, code: u32) {
        self.diagnostics.push(Diagnostic::warning(
            self.file_name.clone(),
            pos,
            end.saturating_sub(pos),
            message,
            code,
        ));
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_known_and_frames_shadow() {
        let mut ctx = CompilerContext::new("a.ts", RenderAnonymous::Local);
        assert!(ctx.is_known("Dict[str, int]"));
        assert!(!ctx.is_known("Position"));

        ctx.push_known_frame();
        ctx.declare("T", SymbolKind::TypeParameter { read_only: true }, 0, 1);
        assert!(ctx.is_read_only_parameter("T"));
        ctx.pop_known_frame();
        assert!(!ctx.is_known("T"));
        assert!(ctx.take_diagnostics().is_empty());
    }

    #[test]
    fn redefinition_warns_once_per_duplicate() {
        let mut ctx = CompilerContext::new("a.ts", RenderAnonymous::Local);
        ctx.declare("Color", SymbolKind::Enum, 0, 5);
        ctx.declare("Color", SymbolKind::Interface, 10, 15);
        let diagnostics = ctx.take_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, diagnostic_codes::REDEFINITION);
        assert_eq!(
            diagnostics[0].message_text,
            "interface 'Color' has already been defined earlier as enum."
        );
        assert_eq!(ctx.lookup("Color"), Some(SymbolKind::Interface));
    }

    #[test]
    fn bottom_record_frame_is_never_popped() {
        let mut ctx = CompilerContext::new("a.ts", RenderAnonymous::Local);
        ctx.queue_local_class("class A:\n    pass".to_string());
        let (classes, keys) = ctx.pop_record_frames();
        assert_eq!(classes.len(), 1);
        assert!(keys.is_empty());
        assert_eq!(ctx.local_classes.len(), 1);
        assert!(ctx.is_toplevel());
    }
}
