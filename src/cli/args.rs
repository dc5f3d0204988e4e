use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use ts2py_emitter::{PythonVersion, RenderAnonymous};

/// CLI arguments for the ts2py binary.
#[derive(Parser, Debug)]
#[command(
    name = "ts2py",
    version,
    about = "Compile TypeScript declarations into Python TypedDicts"
)]
pub struct CliArgs {
    /// Declaration files or directories to compile.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Directory for generated modules (default: next to each source).
    #[arg(short = 'o', long = "out", value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Lowest Python version the generated code must run on, e.g. 3.11.
    /// Enables every typing feature that version supports.
    #[arg(short = 'c', long = "compatibility", value_name = "VERSION")]
    pub compatibility: Option<PythonVersion>,

    /// How records without a name of their own are rendered.
    #[arg(short = 'a', long = "anonymous", value_enum, ignore_case = true)]
    pub anonymous: Option<AnonymousMode>,

    /// Switch typing features on or off by PEP number, e.g. "655,~604".
    #[arg(short = 'p', long = "peps", value_name = "PEPS")]
    pub peps: Option<String>,

    /// Keep multi-line comments as Python comments.
    #[arg(short = 'k', long = "comments")]
    pub comments: bool,

    /// Path to a ts2py.json configuration file.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Compile files one after another instead of in parallel.
    #[arg(long = "singlethread", alias = "single-thread")]
    pub singlethread: bool,

    /// Report every file, including unchanged ones and those without diagnostics.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print the resolved configuration and exit.
    #[arg(long = "show-config", alias = "showConfig")]
    pub show_config: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AnonymousMode {
    Local,
    Toplevel,
    Functional,
    Type,
}

impl From<AnonymousMode> for RenderAnonymous {
    fn from(mode: AnonymousMode) -> Self {
        match mode {
            AnonymousMode::Local => RenderAnonymous::Local,
            AnonymousMode::Toplevel => RenderAnonymous::Toplevel,
            AnonymousMode::Functional => RenderAnonymous::Functional,
            AnonymousMode::Type => RenderAnonymous::Type,
        }
    }
}
