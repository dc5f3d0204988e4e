#![allow(clippy::print_stderr)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::IsTerminal;
use std::sync::atomic::AtomicBool;

use ts2py::cli::args::CliArgs;
use ts2py::cli::driver::{self, FileStatus};
use ts2py::cli::{config, reporter::Reporter};
use ts2py::common::Severity;

const EXIT_SUCCESS: i32 = 0;
/// At least one file produced errors; outputs may still have been written.
const EXIT_DIAGNOSTICS: i32 = 1;
/// At least one file could not be compiled at all.
const EXIT_FAILED: i32 = 2;

fn main() -> Result<()> {
    ts2py::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let compat = config::resolve_compatibility(&args, &cwd)?;

    if args.show_config {
        println!("{}", compat.dump());
        return Ok(());
    }
    if args.files.is_empty() {
        bail!("no input files, see --help");
    }

    let files = driver::collect_sources(&args.files)?;
    if let Some(out) = &args.out {
        std::fs::create_dir_all(out)
            .with_context(|| format!("failed to create directory {}", out.display()))?;
    }

    let cancel = AtomicBool::new(false);
    let results = driver::batch_process(
        &files,
        args.out.as_deref(),
        &compat,
        &cancel,
        !args.singlethread,
    )?;

    let mut reporter = Reporter::new(std::io::stderr().is_terminal());
    let mut exit_code = EXIT_SUCCESS;
    let mut diagnostic_count = 0;
    let mut error_count = 0;
    for result in results {
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                eprintln!("error: {err:#}");
                exit_code = EXIT_FAILED;
                continue;
            }
        };
        if args.verbose || report.status == FileStatus::Failed || report.report.is_some() {
            eprintln!("{}", reporter.format_file(&report));
        }
        if !report.diagnostics.is_empty() {
            eprintln!("{}", reporter.render(&report.diagnostics));
        }
        diagnostic_count += report.diagnostics.len();
        let errors = report
            .diagnostics
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count();
        error_count += errors;
        if report.status == FileStatus::Failed {
            exit_code = EXIT_FAILED;
        } else if errors > 0 && exit_code == EXIT_SUCCESS {
            exit_code = EXIT_DIAGNOSTICS;
        }
    }

    if diagnostic_count > 0 || args.verbose {
        eprintln!(
            "{}",
            reporter.format_summary(diagnostic_count, error_count, files.len())
        );
    }
    if exit_code != EXIT_SUCCESS {
        std::process::exit(exit_code);
    }
    Ok(())
}
