use colored::Colorize;
use rustc_hash::FxHashMap;
use std::path::Path;

use ts2py_common::diagnostics::{Diagnostic, Severity};

use crate::cli::driver::{FileReport, FileStatus};

pub struct Reporter {
    color: bool,
    sources: FxHashMap<String, String>,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            sources: FxHashMap::default(),
        }
    }

    /// Register the text of `file` so snippets do not re-read it from disk.
    pub fn add_source(&mut self, file: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(file.into(), text.into());
    }

    pub fn render(&mut self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    /// `file:line:column - severity code: message`, followed by the source
    /// line with the span underlined.
    pub fn format_diagnostic(&mut self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        if diagnostic.file.is_empty() {
            output.push_str("<unknown>");
        } else if diagnostic.line == 0 {
            output.push_str(&diagnostic.file);
        } else {
            output.push_str(&format!(
                "{}:{}:{}",
                diagnostic.file, diagnostic.line, diagnostic.column
            ));
        }

        output.push_str(" - ");
        output.push_str(&self.format_severity(diagnostic.severity));
        output.push(' ');
        output.push_str(&self.format_code(diagnostic.code));
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        if let Some(snippet) = self.format_snippet(diagnostic) {
            output.push_str(&snippet);
        }
        output
    }

    /// ```text
    ///     2   type Y = Foo["bar"];
    ///                  ~~~~~~~~~~
    /// ```
    fn format_snippet(&mut self, diagnostic: &Diagnostic) -> Option<String> {
        if diagnostic.line == 0 || diagnostic.length == 0 {
            return None;
        }
        let color = self.color;
        let source = self.source_of(&diagnostic.file)?;
        let line_text = source.lines().nth((diagnostic.line - 1) as usize)?;

        let first = diagnostic.column.saturating_sub(1) as usize;
        let last = first + diagnostic.length as usize;
        let mut underline = String::new();
        for (i, ch) in line_text.chars().enumerate() {
            let filler = if i < first {
                ' '
            } else if i < last {
                '~'
            } else {
                break;
            };
            if ch == '\t' {
                underline.extend(std::iter::repeat_n(filler, 4));
            } else {
                underline.push(filler);
            }
        }
        if !underline.contains('~') {
            underline.push('~');
        }

        let underline = if color {
            underline.red().to_string()
        } else {
            underline
        };
        Some(format!(
            "\n  {:>3}   {}\n        {}",
            diagnostic.line,
            line_text.replace('\t', "    "),
            underline
        ))
    }

    fn source_of(&mut self, file: &str) -> Option<&str> {
        if file.is_empty() {
            return None;
        }
        if !self.sources.contains_key(file) {
            let contents = std::fs::read_to_string(Path::new(file)).ok()?;
            self.sources.insert(file.to_string(), contents);
        }
        self.sources.get(file).map(String::as_str)
    }

    fn format_severity(&self, severity: Severity) -> String {
        let label = match severity {
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        if !self.color {
            return label.to_string();
        }
        match severity {
            Severity::Notice => label.cyan().bold().to_string(),
            Severity::Warning => label.yellow().bold().to_string(),
            Severity::Error => label.red().bold().to_string(),
            Severity::Fatal => label.bright_red().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        let label = code.to_string();
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }

    /// One line per file: where the output went, or why there is none.
    pub fn format_file(&self, report: &FileReport) -> String {
        let (label, target) = match report.status {
            FileStatus::Written => ("compiled", report.output.display().to_string()),
            FileStatus::Unchanged => ("unchanged", report.output.display().to_string()),
            FileStatus::Failed => ("failed", report.source.display().to_string()),
        };
        let label = if !self.color {
            label.to_string()
        } else {
            match report.status {
                FileStatus::Written => label.green().to_string(),
                FileStatus::Unchanged => label.dimmed().to_string(),
                FileStatus::Failed => label.red().bold().to_string(),
            }
        };
        match &report.report {
            Some(path) => format!("{label} {target} (see {})", path.display()),
            None => format!("{label} {target}"),
        }
    }

    /// `Found 2 errors and 1 warning in 3 files.`
    pub fn format_summary(&self, diagnostics: usize, errors: usize, files: usize) -> String {
        let warnings = diagnostics - errors;
        let plural = |n: usize, word: &str| {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        };
        let summary = format!(
            "Found {} and {} in {}.",
            plural(errors, "error"),
            plural(warnings, "warning"),
            plural(files, "file")
        );
        if self.color && errors > 0 {
            summary.red().to_string()
        } else {
            summary
        }
    }
}
