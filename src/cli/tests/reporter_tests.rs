use std::path::PathBuf;

use super::driver::{FileReport, FileStatus};
use super::reporter::Reporter;
use ts2py_common::diagnostics::{Diagnostic, diagnostic_codes};
use ts2py_common::position::LineMap;

const SOURCE: &str = "interface A { x: string; }\ntype Y = Foo[\"bar\"];\n";

fn indexed_type_warning() -> Diagnostic {
    let start = SOURCE.find("Foo").expect("span start") as u32;
    Diagnostic::warning(
        "a.ts",
        start,
        10,
        "Indexed types are not supported. Falling back to 'Any'.",
        diagnostic_codes::UNSUPPORTED,
    )
    .located(&LineMap::build(SOURCE))
}

#[test]
fn formats_location_severity_and_code() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("a.ts", SOURCE);
    let text = reporter.format_diagnostic(&indexed_type_warning());

    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("a.ts:2:10 - warning 320: Indexed types are not supported. Falling back to 'Any'.")
    );
    assert_eq!(lines.next(), Some("    2   type Y = Foo[\"bar\"];"));
    assert_eq!(lines.next(), Some("                 ~~~~~~~~~~"));
    assert_eq!(lines.next(), None);
}

#[test]
fn omits_snippet_without_source() {
    let mut reporter = Reporter::new(false);
    let mut diagnostic = indexed_type_warning();
    diagnostic.file = String::new();
    assert_eq!(
        reporter.format_diagnostic(&diagnostic),
        "<unknown> - warning 320: Indexed types are not supported. Falling back to 'Any'."
    );
}

#[test]
fn renders_diagnostics_one_after_another() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("a.ts", SOURCE);
    let fatal = Diagnostic::fatal("a.ts", 0, 0, "Malformed tree: x.", diagnostic_codes::MALFORMED_TREE)
        .located(&LineMap::build(SOURCE));
    let text = reporter.render(&[fatal, indexed_type_warning()]);
    assert!(text.starts_with("a.ts:1:1 - fatal 1100: Malformed tree: x.\na.ts:2:10 - warning 320"));
}

#[test]
fn file_lines_and_summary() {
    let reporter = Reporter::new(false);
    let report = FileReport {
        source: PathBuf::from("a.ts"),
        output: PathBuf::from("a.py"),
        status: FileStatus::Written,
        report: Some(PathBuf::from("a_WARNINGS.txt")),
        diagnostics: Vec::new(),
    };
    assert_eq!(reporter.format_file(&report), "compiled a.py (see a_WARNINGS.txt)");

    let failed = FileReport {
        status: FileStatus::Failed,
        report: None,
        ..report
    };
    assert_eq!(reporter.format_file(&failed), "failed a.ts");

    assert_eq!(
        reporter.format_summary(3, 1, 2),
        "Found 1 error and 2 warnings in 2 files."
    );
}
