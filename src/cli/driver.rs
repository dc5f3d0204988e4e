use anyhow::{Context, Result};
use rayon::prelude::*;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, info_span, warn};
use walkdir::WalkDir;

use ts2py_common::diagnostics::{
    Diagnostic, Severity, diagnostic_codes, diagnostic_messages, format_message, max_severity,
    sort_diagnostics,
};
use ts2py_common::position::LineMap;
use ts2py_emitter::compiler::header::{COMPILER_VERSION, recorded_source_hash};
use ts2py_emitter::{Compatibility, compile_tree};
use ts2py_parser::{LowerOptions, ParserState, lower};

/// Cooperative cancellation for [`batch_process`]; checked before each file.
pub type CancellationFlag = AtomicBool;

pub const RESULT_EXTENSION: &str = "py";
const ERRORS_SUFFIX: &str = "_ERRORS.txt";
const WARNINGS_SUFFIX: &str = "_WARNINGS.txt";

/// Result of compiling one source text.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    /// The generated module; `None` when a fatal diagnostic occurred.
    pub text: Option<String>,
    /// Located and sorted by position.
    pub diagnostics: Vec<Diagnostic>,
    pub fingerprint: String,
}

impl CompileOutcome {
    pub fn has_errors(&self) -> bool {
        max_severity(&self.diagnostics).is_some_and(|severity| severity >= Severity::Error)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    /// The output was (re)generated.
    Written,
    /// The existing output already matches source and configuration.
    Unchanged,
    /// A fatal diagnostic prevented output.
    Failed,
}

#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub status: FileStatus,
    /// `<stem>_ERRORS.txt` or `<stem>_WARNINGS.txt`, when diagnostics were written.
    pub report: Option<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

fn hash_text(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Fingerprint of a source under a configuration, as recorded in the
/// `source_hash__` line of the generated module.
pub fn fingerprint(source: &str, compat: &Compatibility) -> String {
    let mut hasher = FxHasher::default();
    source.hash(&mut hasher);
    "ts2py".hash(&mut hasher);
    COMPILER_VERSION.hash(&mut hasher);
    hash_text(&compat.dump()).hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Parse, lower and compile one source text.
///
/// Fails only when `compat` is an inconsistent configuration; problems in
/// the source are reported as diagnostics.
pub fn compile_source(source: &str, file_name: &str, compat: &Compatibility) -> Result<CompileOutcome> {
    compat.validate()?;
    let _span = info_span!("compile_source", file = file_name).entered();
    let fingerprint = fingerprint(source, compat);
    let line_map = LineMap::build(source);

    let mut parser = ParserState::new(file_name.to_string(), source.to_string());
    let root = parser.parse_source_file();
    // Parser diagnostics come back located.
    let (arena, mut diagnostics) = parser.into_parts();

    let text = if diagnostics.iter().any(Diagnostic::is_fatal) {
        debug!("fatal syntax error, skipping compilation");
        None
    } else {
        let options = LowerOptions {
            keep_comments: compat.keep_multiline_comments,
        };
        let tree = lower(&arena, root, file_name, options);
        diagnostics.extend(tree.diagnostics.into_iter().map(|d| d.located(&line_map)));
        match compile_tree(&tree.arena, tree.root, file_name, compat, &fingerprint) {
            Ok(module) => {
                diagnostics.extend(module.diagnostics.into_iter().map(|d| d.located(&line_map)));
                Some(module.text)
            }
            Err(err) => {
                warn!(error = %err, "malformed tree");
                let message =
                    format_message(diagnostic_messages::MALFORMED_TREE, &[&err.to_string()]);
                diagnostics.push(
                    Diagnostic::fatal(file_name, err.pos(), 0, message, diagnostic_codes::MALFORMED_TREE)
                        .located(&line_map),
                );
                None
            }
        }
    };

    sort_diagnostics(&mut diagnostics);
    let text = if diagnostics.iter().any(Diagnostic::is_fatal) {
        None
    } else {
        text
    };
    Ok(CompileOutcome {
        text,
        diagnostics,
        fingerprint,
    })
}

/// `foo.d.ts` and `foo.ts` both give `foo`.
fn output_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    match stem.strip_suffix(".d") {
        Some(base) if !base.is_empty() => base.to_string(),
        _ => stem,
    }
}

/// Path of the generated module for `source`.
pub fn output_path(source: &Path, out_dir: Option<&Path>) -> PathBuf {
    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    dir.join(format!("{}.{RESULT_EXTENSION}", output_stem(source)))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Compile one file and write its module and diagnostics report.
///
/// Nothing is rewritten when the existing output records the fingerprint of
/// the current source and configuration.
pub fn process_file(path: &Path, out_dir: Option<&Path>, compat: &Compatibility) -> Result<FileReport> {
    let _span = info_span!("process_file", path = %path.display()).entered();
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let output = output_path(path, out_dir);

    if output.is_file() {
        let existing = std::fs::read_to_string(&output)
            .with_context(|| format!("failed to read {}", output.display()))?;
        if recorded_source_hash(&existing) == Some(fingerprint(&source, compat).as_str()) {
            debug!(output = %output.display(), "output is up to date");
            return Ok(FileReport {
                source: path.to_path_buf(),
                output,
                status: FileStatus::Unchanged,
                report: None,
                diagnostics: Vec::new(),
            });
        }
    }

    let file_name = path.to_string_lossy();
    let mut outcome = compile_source(&source, &file_name, compat)?;
    let mut status = FileStatus::Failed;
    if let Some(text) = outcome.text.take() {
        if same_file(path, &output) {
            let message = format_message(
                diagnostic_messages::OUTPUT_OVERWRITES_SOURCE,
                &[&output.display().to_string()],
            );
            outcome.diagnostics.push(Diagnostic::fatal(
                file_name.to_string(),
                0,
                0,
                message,
                diagnostic_codes::OUTPUT_OVERWRITES_SOURCE,
            )
            .located(&LineMap::build(&source)));
        } else {
            if let Some(parent) = output.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create directory {}", parent.display()))?;
            }
            std::fs::write(&output, text)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!(output = %output.display(), "written");
            status = FileStatus::Written;
        }
    }

    let report = write_report(&output, &outcome)?;
    Ok(FileReport {
        source: path.to_path_buf(),
        output,
        status,
        report,
        diagnostics: outcome.diagnostics,
    })
}

/// Write the canonical diagnostic lines next to the output. Reports left
/// over from an earlier run are removed.
fn write_report(output: &Path, outcome: &CompileOutcome) -> Result<Option<PathBuf>> {
    let base = output.with_extension("");
    let errors = PathBuf::from(format!("{}{ERRORS_SUFFIX}", base.display()));
    let warnings = PathBuf::from(format!("{}{WARNINGS_SUFFIX}", base.display()));
    for stale in [&errors, &warnings] {
        if stale.is_file() {
            std::fs::remove_file(stale)
                .with_context(|| format!("failed to remove {}", stale.display()))?;
        }
    }
    if outcome.diagnostics.is_empty() {
        return Ok(None);
    }

    let path = if outcome.has_errors() { errors } else { warnings };
    let lines: Vec<String> = outcome.diagnostics.iter().map(Diagnostic::canonical).collect();
    std::fs::write(&path, lines.join("\n"))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Some(path))
}

/// Declaration sources named by `inputs`; directories are searched
/// recursively for `.ts` files.
pub fn collect_sources(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input).follow_links(true) {
                let entry =
                    entry.with_context(|| format!("failed to walk {}", input.display()))?;
                let path = entry.path();
                if entry.file_type().is_file()
                    && path.extension().is_some_and(|ext| ext == "ts")
                {
                    found.push(path.to_path_buf());
                }
            }
            found.sort();
            files.extend(found);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("no such file or directory: {}", input.display());
        }
    }
    Ok(files)
}

/// Compile `files`, in parallel unless `parallel` is off.
///
/// An inconsistent `compat` fails the whole batch before any file is read.
/// Every file gets its own parser and compiler. Files not yet started when
/// `cancel` is set are skipped; results keep the order of `files`.
pub fn batch_process(
    files: &[PathBuf],
    out_dir: Option<&Path>,
    compat: &Compatibility,
    cancel: &CancellationFlag,
    parallel: bool,
) -> Result<Vec<Result<FileReport>>> {
    compat.validate()?;
    let run = |path: &PathBuf| {
        if cancel.load(Ordering::Relaxed) {
            debug!(path = %path.display(), "cancelled");
            return None;
        }
        Some(process_file(path, out_dir, compat))
    };
    let reports = if parallel {
        files.par_iter().filter_map(run).collect()
    } else {
        files.iter().filter_map(run).collect()
    };
    Ok(reports)
}
