//! End-to-end runs of the library pipeline on declaration files.

use std::sync::atomic::AtomicBool;

use ts2py::cli::driver::{FileStatus, batch_process, collect_sources};
use ts2py::{Compatibility, PythonVersion, compile_source};

const PROTOCOL: &str = r#"
interface Position {
    line: uinteger;
    character: uinteger;
}

interface Range {
    start: Position;
    end: Position;
}

namespace DiagnosticSeverity {
    export const Error = 1;
    export const Warning = 2;
}

type DiagnosticSeverity = 1 | 2;

interface Diagnostic {
    range: Range;
    severity?: DiagnosticSeverity;
    message: string;
    relatedInformation?: Location[];
}

interface Location {
    uri: string;
    range: Range;
}
"#;

#[test]
fn protocol_fragment_compiles_for_python_3_11() {
    let compat = Compatibility::for_python_version(PythonVersion::new(3, 11)).expect("preset");
    let outcome = compile_source(PROTOCOL, "protocol.d.ts", &compat).expect("valid preset");
    let text = outcome.text.expect("module text");

    assert!(text.contains("# compatibility level: Python 3.11 and above"));
    assert!(text.contains("class Position(TypedDict):\n    line: int\n    character: int"));
    assert!(text.contains("class DiagnosticSeverity(IntEnum):\n    Error = 1\n    Warning = 2"));
    assert!(text.contains("# commented out, because there is already an enumeration with the same name"));
    assert!(text.contains("    severity: NotRequired[DiagnosticSeverity]"));
    assert!(text.contains("    relatedInformation: NotRequired[List['Location']]"));
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
}

#[test]
fn batch_run_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("protocol.d.ts"), PROTOCOL).expect("write source");
    let files = collect_sources(&[dir.path().to_path_buf()]).expect("collects");
    let compat = Compatibility::default();
    let cancel = AtomicBool::new(false);

    let first = batch_process(&files, None, &compat, &cancel, true).expect("valid configuration");
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].as_ref().expect("runs").status, FileStatus::Written);
    let module = std::fs::read_to_string(dir.path().join("protocol.py")).expect("output");

    let second = batch_process(&files, None, &compat, &cancel, true).expect("valid configuration");
    assert_eq!(second[0].as_ref().expect("runs").status, FileStatus::Unchanged);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("protocol.py")).expect("output"),
        module
    );
}
