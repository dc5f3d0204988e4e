use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::debug;

use ts2py_emitter::{Compatibility, PythonVersion, RenderAnonymous};

use crate::cli::args::CliArgs;

pub const CONFIG_FILE_NAME: &str = "ts2py.json";

/// Custom deserializer for boolean options that accepts both bool and string values.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => {
            let normalized = s.trim().to_lowercase();
            match normalized.as_str() {
                "true" | "1" | "yes" | "on" => Ok(Some(true)),
                "false" | "0" | "no" | "off" => Ok(Some(false)),
                _ => Err(Error::custom(format!(
                    "invalid boolean value: '{}'. Expected true, false, 'true', or 'false'",
                    s
                ))),
            }
        }
    }
}

/// Contents of a `ts2py.json` file. Every key is optional.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Python version preset, e.g. `"3.11"`.
    #[serde(default)]
    pub compatibility: Option<String>,
    /// PEP toggles, e.g. `"655, ~604"`.
    #[serde(default)]
    pub peps: Option<String>,
    #[serde(default)]
    pub render_anonymous: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub keep_multiline_comments: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub use_enum: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub use_postponed_evaluation: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub assume_deferred_evaluation: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub use_literal_type: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub use_type_union: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub use_explicit_type_alias: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub use_type_parameters: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub use_variadic_generics: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub use_not_required: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub allow_read_only: Option<bool>,
}

pub fn parse_config(source: &str) -> Result<ConfigFile> {
    serde_json::from_str(source).context("failed to parse ts2py.json")
}

pub fn load_config(path: &Path) -> Result<ConfigFile> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&source).with_context(|| format!("in {}", path.display()))
}

/// `ts2py.json` in `dir`, if present.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

impl ConfigFile {
    /// Copy every flag the file sets onto `compat`.
    pub fn apply_flags(&self, compat: &mut Compatibility) -> Result<()> {
        let flags = [
            (self.keep_multiline_comments, &mut compat.keep_multiline_comments),
            (self.use_enum, &mut compat.use_enum),
            (self.use_postponed_evaluation, &mut compat.use_postponed_evaluation),
            (self.assume_deferred_evaluation, &mut compat.assume_deferred_evaluation),
            (self.use_literal_type, &mut compat.use_literal_type),
            (self.use_type_union, &mut compat.use_type_union),
            (self.use_explicit_type_alias, &mut compat.use_explicit_type_alias),
            (self.use_type_parameters, &mut compat.use_type_parameters),
            (self.use_variadic_generics, &mut compat.use_variadic_generics),
            (self.use_not_required, &mut compat.use_not_required),
            (self.allow_read_only, &mut compat.allow_read_only),
        ];
        for (value, flag) in flags {
            if let Some(value) = value {
                *flag = value;
            }
        }
        if let Some(mode) = &self.render_anonymous {
            compat.render_anonymous = mode.parse::<RenderAnonymous>()?;
        }
        Ok(())
    }
}

/// Resolve the configuration of a run.
///
/// Sources are applied in order: defaults, the config file, the Python
/// version preset, PEP toggles, then the remaining command line flags. A
/// preset or PEP list on the command line replaces the one of the file.
pub fn resolve_compatibility(args: &CliArgs, cwd: &Path) -> Result<Compatibility> {
    let path = match &args.config {
        Some(path) => Some(cwd.join(path)),
        None => find_config(cwd),
    };
    let file = match &path {
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            load_config(path)?
        }
        None => ConfigFile::default(),
    };

    let mut compat = Compatibility::default();
    file.apply_flags(&mut compat)?;

    let preset = match (&args.compatibility, &file.compatibility) {
        (Some(version), _) => Some(*version),
        (None, Some(version)) => Some(version.parse::<PythonVersion>()?),
        (None, None) => None,
    };
    if let Some(version) = preset {
        compat.apply_python_version(version)?;
    }

    if let Some(peps) = args.peps.as_deref().or(file.peps.as_deref()) {
        compat.apply_peps(peps)?;
    }

    if let Some(mode) = args.anonymous {
        compat.render_anonymous = mode.into();
    }
    if args.comments {
        compat.keep_multiline_comments = true;
    }

    compat.validate()?;
    Ok(compat)
}
