use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use super::driver::{
    FileStatus, batch_process, collect_sources, compile_source, fingerprint, output_path,
    process_file,
};
use ts2py_common::diagnostics::{Severity, diagnostic_codes};
use ts2py_emitter::{Compatibility, ConfigError};
use ts2py_emitter::compiler::header::recorded_source_hash;

const POSITION: &str = "interface Position { line: number; character: number; }\n";

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

#[test]
fn compile_source_produces_module_with_fingerprint() {
    let compat = Compatibility::default();
    let outcome = compile_source(POSITION, "position.d.ts", &compat)
        .expect("valid configuration");

    let text = outcome.text.as_deref().expect("module text");
    assert!(text.contains("class Position(TypedDict):\n    line: float\n    character: float"));
    assert_eq!(recorded_source_hash(text), Some(outcome.fingerprint.as_str()));
    assert_eq!(outcome.fingerprint.len(), 16);
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn fingerprint_depends_on_source_and_configuration() {
    let compat = Compatibility::default();
    let literal = Compatibility {
        use_literal_type: true,
        ..Compatibility::default()
    };
    assert_eq!(fingerprint(POSITION, &compat), fingerprint(POSITION, &compat));
    assert_ne!(fingerprint(POSITION, &compat), fingerprint("type A = string;", &compat));
    assert_ne!(fingerprint(POSITION, &compat), fingerprint(POSITION, &literal));
}

#[test]
fn syntax_errors_are_located_and_output_still_produced() {
    let source = "interface A { x: }\ninterface B { y: string }\n";
    let outcome = compile_source(source, "broken.ts", &Compatibility::default())
        .expect("valid configuration");

    assert!(outcome.text.is_some());
    assert!(outcome.has_errors());
    let diagnostic = &outcome.diagnostics[0];
    assert_eq!(diagnostic.code, diagnostic_codes::MANDATORY_CONTINUATION);
    assert_eq!(diagnostic.line, 1);
    assert!(diagnostic.column > 1);
}

#[test]
fn fatal_errors_suppress_output() {
    let source = format!("type T = {}string{};", "(".repeat(150), ")".repeat(150));
    let outcome = compile_source(&source, "deep.ts", &Compatibility::default())
        .expect("valid configuration");

    assert!(outcome.text.is_none());
    assert!(outcome.diagnostics.iter().any(|d| d.severity == Severity::Fatal));
}

#[test]
fn warnings_are_located_in_the_source() {
    let source = "interface A { x: string; }\ntype X = A & B;\n";
    let outcome = compile_source(source, "x.ts", &Compatibility::default())
        .expect("valid configuration");

    assert!(outcome.text.is_some());
    assert!(!outcome.has_errors());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].code, diagnostic_codes::NOT_YET_IMPLEMENTED);
    assert_eq!(outcome.diagnostics[0].line, 2);
}

#[test]
fn declaration_suffix_is_dropped_from_output_name() {
    assert_eq!(
        output_path(Path::new("specs/lsp.d.ts"), None),
        PathBuf::from("specs/lsp.py")
    );
    assert_eq!(
        output_path(Path::new("specs/lsp.ts"), Some(Path::new("out"))),
        PathBuf::from("out/lsp.py")
    );
}

#[test]
fn process_file_writes_module_and_skips_unchanged_source() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = write_file(dir.path(), "position.d.ts", POSITION);
    let compat = Compatibility::default();

    let first = process_file(&source, None, &compat).expect("first run");
    assert_eq!(first.status, FileStatus::Written);
    assert_eq!(first.output, dir.path().join("position.py"));
    assert!(first.report.is_none());
    let written = std::fs::read_to_string(&first.output).expect("output exists");

    let second = process_file(&source, None, &compat).expect("second run");
    assert_eq!(second.status, FileStatus::Unchanged);
    assert_eq!(
        std::fs::read_to_string(&second.output).expect("output exists"),
        written
    );

    let literal = Compatibility {
        use_literal_type: true,
        ..Compatibility::default()
    };
    let third = process_file(&source, None, &literal).expect("third run");
    assert_eq!(third.status, FileStatus::Written);
}

#[test]
fn diagnostics_go_to_errors_or_warnings_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out = dir.path().join("out");
    let compat = Compatibility::default();

    let warned = write_file(dir.path(), "warned.ts", "type X = A & B;\n");
    let report = process_file(&warned, Some(out.as_path()), &compat).expect("compiles");
    assert_eq!(report.status, FileStatus::Written);
    let warnings = out.join("warned_WARNINGS.txt");
    assert_eq!(report.report.as_deref(), Some(warnings.as_path()));
    let text = std::fs::read_to_string(&warnings).expect("warnings file");
    assert!(text.contains(":1:"), "{text}");
    assert!(text.contains("Warning (310)"), "{text}");

    let broken = write_file(dir.path(), "broken.ts", "interface A { x: }\n");
    let report = process_file(&broken, Some(out.as_path()), &compat).expect("compiles");
    assert_eq!(report.status, FileStatus::Written);
    let errors = out.join("broken_ERRORS.txt");
    assert_eq!(report.report.as_deref(), Some(errors.as_path()));
    assert!(!out.join("broken_WARNINGS.txt").exists());
}

#[test]
fn fixed_source_removes_stale_report() {
    let dir = tempfile::tempdir().expect("temp dir");
    let compat = Compatibility::default();
    let source = write_file(dir.path(), "a.ts", "type X = A & B;\n");
    process_file(&source, None, &compat).expect("compiles");
    assert!(dir.path().join("a_WARNINGS.txt").exists());

    write_file(dir.path(), "a.ts", "type X = string;\n");
    let report = process_file(&source, None, &compat).expect("compiles");
    assert!(report.report.is_none());
    assert!(!dir.path().join("a_WARNINGS.txt").exists());
}

#[test]
fn refuses_to_overwrite_the_source() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = write_file(dir.path(), "types.py", "type X = string;\n");

    let report = process_file(&source, None, &Compatibility::default()).expect("runs");
    assert_eq!(report.status, FileStatus::Failed);
    assert!(
        report
            .diagnostics
            .iter()
            .any(|d| d.code == diagnostic_codes::OUTPUT_OVERWRITES_SOURCE && d.is_fatal())
    );
    assert_eq!(
        std::fs::read_to_string(&source).expect("source intact"),
        "type X = string;\n"
    );
    assert!(dir.path().join("types_ERRORS.txt").exists());
}

#[test]
fn batch_processes_directories_in_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let nested = dir.path().join("nested");
    std::fs::create_dir_all(&nested).expect("nested dir");
    write_file(dir.path(), "b.ts", "type B = string;\n");
    write_file(&nested, "a.d.ts", "type A = number;\n");
    write_file(dir.path(), "notes.txt", "not a declaration file");

    let files = collect_sources(&[dir.path().to_path_buf()]).expect("collects");
    assert_eq!(files.len(), 2);

    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).expect("out dir");
    let cancel = AtomicBool::new(false);
    for parallel in [true, false] {
        let reports = batch_process(
            &files,
            Some(out.as_path()),
            &Compatibility::default(),
            &cancel,
            parallel,
        )
        .expect("valid configuration");
        let sources: Vec<&PathBuf> = reports
            .iter()
            .map(|r| &r.as_ref().expect("compiles").source)
            .collect();
        assert_eq!(sources, files.iter().collect::<Vec<_>>());
    }
    assert!(out.join("a.py").exists());
    assert!(out.join("b.py").exists());
}

#[test]
fn cancelled_batch_starts_no_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let files = vec![write_file(dir.path(), "a.ts", "type A = string;\n")];
    let cancel = AtomicBool::new(false);
    cancel.store(true, Ordering::Relaxed);

    let reports = batch_process(&files, None, &Compatibility::default(), &cancel, false)
        .expect("valid configuration");
    assert!(reports.is_empty());
    assert!(!dir.path().join("a.py").exists());
}

#[test]
fn missing_inputs_are_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = collect_sources(&[dir.path().join("absent.ts")]).unwrap_err();
    assert!(err.to_string().contains("no such file or directory"));
}

fn inconsistent_compatibility() -> Compatibility {
    Compatibility {
        use_type_parameters: true,
        use_variadic_generics: false,
        ..Compatibility::default()
    }
}

#[test]
fn compile_source_rejects_inconsistent_configuration() {
    let err = compile_source(POSITION, "position.ts", &inconsistent_compatibility()).unwrap_err();
    assert!(err.downcast_ref::<ConfigError>().is_some(), "{err:#}");
}

#[test]
fn batch_rejects_inconsistent_configuration_before_any_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let files = vec![write_file(dir.path(), "a.ts", "type A = string;\n")];
    let cancel = AtomicBool::new(false);

    let err = batch_process(&files, None, &inconsistent_compatibility(), &cancel, true).unwrap_err();
    assert!(err.downcast_ref::<ConfigError>().is_some(), "{err:#}");
    assert!(!dir.path().join("a.py").exists());
}
