//! Module header, import blocks and final layout of a generated file.

use ts2py_common::limits::MAX_BLANK_LINES;

use crate::options::{Compatibility, PythonVersion, Requirement};

pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const BEGIN_MARKER: &str = "##### BEGIN OF ts2py generated code";
pub const END_MARKER: &str = "##### END OF ts2py generated code";

/// Start of the fingerprint line; the driver reads it back from existing output.
pub const SOURCE_HASH_PREFIX: &str = "source_hash__ = \"";

const GENERAL_IMPORTS: &str = "import sys
from enum import Enum, IntEnum, auto";

const TYPE_IMPORTS_37: &str = "from typing import Union, Optional, Any, Generic, TypeVar, Callable, List, \\
    Iterable, Iterator, Tuple, Dict, Awaitable";

const TYPEDDICT_IMPORTS_37: &str = "try:
    from ts2python.typeddict_shim import TypedDict, GenericTypedDict, NotRequired, Literal, \\
        ReadOnly, TypeAlias
except ImportError:
    print(\"Module ts2python.typeddict_shim not found. Only coarse-grained \"
          \"runtime type-validation of TypedDicts possible\")
    try:
        from typing import TypedDict, Literal
    except ImportError:
        from typing_extensions import TypedDict, Literal
    try:
        from typing_extensions import NotRequired, ReadOnly, TypeAlias
    except ImportError:
        NotRequired = Optional
        ReadOnly = Union
        TypeAlias = Any
    GenericMeta = type
    class _GenericTypedDictMeta(GenericMeta):
        def __new__(cls, name, bases, ns, total=True):
            return type.__new__(_GenericTypedDictMeta, name, (dict,), ns)
        __call__ = dict
    GenericTypedDict = _GenericTypedDictMeta('TypedDict', (dict,), {})
    GenericTypedDict.__module__ = __name__";

const TYPE_IMPORTS_311: &str = "from typing import Union, Optional, Any, Generic, TypeVar, Callable, List, \\
    Iterable, Iterator, Tuple, Dict, TypedDict, NotRequired, Literal, TypeAlias, \\
    Awaitable, Self
try:
    from typing import ReadOnly
except ImportError:
    ReadOnly = Union";

const TYPE_IMPORTS_313: &str = "from typing import Union, Optional, Any, Generic, TypeVar, Callable, List, \\
    Iterable, Iterator, Tuple, Dict, TypedDict, NotRequired, Literal, ReadOnly, TypeAlias, \\
    Awaitable, Self";

const FUNCTOOLS_IMPORTS: &str = "try:
    from ts2python.singledispatch_shim import singledispatch, singledispatchmethod
except ImportError:
    print(\"ts2python.singledispatch_shim not found! @singledispatch-annotation\"
          \" imported from functools may cause NameErrors on forward-referenced\"
          \" types.\")
    from functools import singledispatch, singledispatchmethod";

/// Import blocks for a compatibility level.
fn type_imports(level: PythonVersion) -> &'static [&'static str] {
    if level >= PythonVersion::new(3, 13) {
        &[TYPE_IMPORTS_313]
    } else if level >= PythonVersion::new(3, 11) {
        &[TYPE_IMPORTS_311]
    } else {
        &[TYPE_IMPORTS_37, TYPEDDICT_IMPORTS_37]
    }
}

/// Wrap generated declarations into a complete module.
pub fn assemble_module(
    code: &str,
    compat: &Compatibility,
    require_singledispatch: bool,
    source_hash: &str,
) -> String {
    let level = compat.required_python_version(Requirement::Compatibility);
    let mut blocks = vec![format!(
        "# Generated by ts2py version {COMPILER_VERSION}\n# compatibility level: Python {level} and above"
    )];
    if compat.use_postponed_evaluation {
        blocks.push("from __future__ import annotations".to_string());
    }
    blocks.push(GENERAL_IMPORTS.to_string());
    blocks.extend(type_imports(level).iter().map(|block| block.to_string()));
    if require_singledispatch {
        blocks.push(FUNCTOOLS_IMPORTS.to_string());
    }
    blocks.push(format!("{SOURCE_HASH_PREFIX}{source_hash}\""));
    blocks.push(format!("\n{BEGIN_MARKER}\n"));
    blocks.push(code.to_string());
    blocks.push(format!("\n{END_MARKER}"));
    tidy(&blocks.join("\n\n"))
}

/// Strip trailing spaces, cap runs of blank lines and end with one newline.
pub fn tidy(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    let mut blank_run = 0usize;
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > MAX_BLANK_LINES {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    while out.ends_with("\n\n") {
        out.pop();
    }
    out
}

/// Fingerprint recorded in a generated module, if any.
pub fn recorded_source_hash(module: &str) -> Option<&str> {
    module.lines().find_map(|line| {
        line.trim()
            .strip_prefix(SOURCE_HASH_PREFIX)
            .and_then(|rest| rest.strip_suffix('"'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tidy_caps_blank_lines_and_trailing_spaces() {
        let text = "a  \n\n\n\n\nb\t\n\n";
        assert_eq!(tidy(text), "a\n\n\nb\n");
    }

    #[test]
    fn import_blocks_follow_compatibility_level() {
        let baseline = assemble_module("X = int", &Compatibility::default(), false, "00");
        assert!(baseline.starts_with("# Generated by ts2py version"));
        assert!(baseline.contains("# compatibility level: Python 3.7 and above"));
        assert!(baseline.contains("ts2python.typeddict_shim"));
        assert!(!baseline.contains("singledispatch"));
        assert!(!baseline.contains("from __future__"));

        let compat = Compatibility::for_python_version(PythonVersion::new(3, 11)).unwrap();
        let modern = assemble_module("X = int", &compat, true, "00");
        assert!(modern.contains("# compatibility level: Python 3.11 and above"));
        assert!(modern.contains("NotRequired, Literal, TypeAlias"));
        assert!(!modern.contains("typeddict_shim"));
        assert!(modern.contains("singledispatch_shim"));
    }

    #[test]
    fn code_sits_between_markers_after_hash() {
        let module = assemble_module("X = int", &Compatibility::default(), false, "0123abcd");
        let hash = module.find("source_hash__ = \"0123abcd\"").unwrap();
        let begin = module.find(BEGIN_MARKER).unwrap();
        let code = module.find("X = int").unwrap();
        let end = module.find(END_MARKER).unwrap();
        assert!(hash < begin && begin < code && code < end);
        assert!(module.ends_with(&format!("{END_MARKER}\n")));
        assert_eq!(recorded_source_hash(&module), Some("0123abcd"));
    }
}
