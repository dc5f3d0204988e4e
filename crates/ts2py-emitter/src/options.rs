//! Compatibility options.
//!
//! Every flag switches on a Python typing feature. The minimal Python version
//! a generated module runs on follows from the active flags and decides which
//! import block the module header carries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("native type parameters (PEP 695) require variadic generics (PEP 646) to be enabled")]
    TypeParametersWithoutVariadicGenerics,
    #[error("invalid Python version '{0}', expected MAJOR.MINOR")]
    InvalidPythonVersion(String),
    #[error("compatibility level must be 3.7 or later, got {0}")]
    UnsupportedPythonVersion(PythonVersion),
    #[error("unknown PEP '{0}'")]
    UnknownPep(String),
    #[error("invalid anonymous rendering mode '{0}', expected local, toplevel, functional or type")]
    InvalidRenderMode(String),
}

/// `major.minor` Python version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PythonVersion {
    pub major: u8,
    pub minor: u8,
}

impl PythonVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        PythonVersion { major, minor }
    }

    pub const BASELINE: PythonVersion = PythonVersion::new(3, 7);
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PythonVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidPythonVersion(s.to_string());
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u8>().map_err(|_| invalid())?;
        let minor = minor.parse::<u8>().map_err(|_| invalid())?;
        Ok(PythonVersion::new(major, minor))
    }
}

/// How records without a name of their own are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderAnonymous {
    /// A class in the enclosing scope, above its use.
    #[default]
    Local,
    /// A module-level class named after the enclosing names.
    Toplevel,
    /// `TypedDict("Name", {...})`
    Functional,
    /// `TypedDict[{...}]`
    Type,
}

impl RenderAnonymous {
    pub const fn as_str(self) -> &'static str {
        match self {
            RenderAnonymous::Local => "local",
            RenderAnonymous::Toplevel => "toplevel",
            RenderAnonymous::Functional => "functional",
            RenderAnonymous::Type => "type",
        }
    }
}

impl FromStr for RenderAnonymous {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(RenderAnonymous::Local),
            "toplevel" => Ok(RenderAnonymous::Toplevel),
            "functional" => Ok(RenderAnonymous::Functional),
            "type" => Ok(RenderAnonymous::Type),
            _ => Err(ConfigError::InvalidRenderMode(s.to_string())),
        }
    }
}

impl fmt::Display for RenderAnonymous {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a version requirement is computed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// The version the generated module runs on, shims included.
    Compatibility,
    /// The version that supports every feature natively.
    Features,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    pub use_enum: bool,
    /// PEP 563, `from __future__ import annotations`.
    pub use_postponed_evaluation: bool,
    /// PEP 649/749.
    pub assume_deferred_evaluation: bool,
    /// PEP 586.
    pub use_literal_type: bool,
    /// PEP 604, `A | B`.
    pub use_type_union: bool,
    /// PEP 613, `X: TypeAlias = ...`.
    pub use_explicit_type_alias: bool,
    /// PEP 695, `type X[T] = ...` and `class C[T]`.
    pub use_type_parameters: bool,
    /// PEP 646.
    pub use_variadic_generics: bool,
    /// PEP 655.
    pub use_not_required: bool,
    /// PEP 705.
    pub allow_read_only: bool,
    pub keep_multiline_comments: bool,
    pub render_anonymous: RenderAnonymous,
}

impl Default for Compatibility {
    fn default() -> Self {
        Compatibility {
            use_enum: true,
            use_postponed_evaluation: false,
            assume_deferred_evaluation: false,
            use_literal_type: false,
            use_type_union: false,
            use_explicit_type_alias: false,
            use_type_parameters: false,
            use_variadic_generics: false,
            use_not_required: false,
            allow_read_only: false,
            keep_multiline_comments: false,
            render_anonymous: RenderAnonymous::Local,
        }
    }
}

impl Compatibility {
    /// Every feature the given Python version supports.
    pub fn for_python_version(version: PythonVersion) -> Result<Self, ConfigError> {
        let mut compat = Compatibility::default();
        compat.apply_python_version(version)?;
        Ok(compat)
    }

    /// Switch on the features of `version` on top of the current flags.
    pub fn apply_python_version(&mut self, version: PythonVersion) -> Result<(), ConfigError> {
        if version < PythonVersion::BASELINE {
            return Err(ConfigError::UnsupportedPythonVersion(version));
        }
        let at_least = |minor: u8| version >= PythonVersion::new(3, minor);
        if at_least(8) {
            self.use_literal_type = true;
        }
        if at_least(10) {
            self.use_type_union = true;
            if !at_least(12) {
                self.use_explicit_type_alias = true;
            }
        }
        if at_least(11) {
            self.use_not_required = true;
            self.use_variadic_generics = true;
        }
        if at_least(12) {
            self.use_type_parameters = true;
        }
        if at_least(13) {
            self.allow_read_only = true;
        }
        if at_least(14) {
            self.assume_deferred_evaluation = true;
        }
        Ok(())
    }

    /// Toggle flags by PEP number, e.g. `"655, ~705"`. A leading `~` switches
    /// the feature off.
    pub fn apply_peps(&mut self, peps: &str) -> Result<(), ConfigError> {
        for item in peps.split([',', ' ']).map(str::trim).filter(|p| !p.is_empty()) {
            let (enable, number) = match item.strip_prefix('~') {
                Some(rest) => (false, rest.trim()),
                None => (true, item),
            };
            let flag = match number {
                "435" => &mut self.use_enum,
                "563" => &mut self.use_postponed_evaluation,
                "586" => &mut self.use_literal_type,
                "604" => &mut self.use_type_union,
                "613" => &mut self.use_explicit_type_alias,
                "646" => &mut self.use_variadic_generics,
                "649" | "749" => &mut self.assume_deferred_evaluation,
                "655" => &mut self.use_not_required,
                "695" => &mut self.use_type_parameters,
                "705" => &mut self.allow_read_only,
                _ => return Err(ConfigError::UnknownPep(item.to_string())),
            };
            *flag = enable;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.use_type_parameters && !self.use_variadic_generics {
            return Err(ConfigError::TypeParametersWithoutVariadicGenerics);
        }
        Ok(())
    }

    /// The flags as the compiler applies them: native type parameters
    /// replace explicit `TypeAlias` annotations.
    pub fn effective(&self) -> Compatibility {
        let mut compat = self.clone();
        if compat.use_type_parameters {
            compat.use_explicit_type_alias = false;
        }
        compat
    }

    pub fn required_python_version(&self, purpose: Requirement) -> PythonVersion {
        let features = purpose == Requirement::Features;
        let mut version = PythonVersion::BASELINE;
        if self.use_literal_type {
            version = PythonVersion::new(3, 8);
        }
        if self.use_type_union || self.use_explicit_type_alias {
            version = PythonVersion::new(3, 10);
        }
        if self.use_variadic_generics || (features && self.use_not_required) {
            version = PythonVersion::new(3, 11);
        }
        if self.use_type_parameters {
            version = PythonVersion::new(3, 12);
        }
        if features && self.allow_read_only {
            version = PythonVersion::new(3, 13);
        }
        if self.assume_deferred_evaluation {
            version = PythonVersion::new(3, 14);
        }
        version
    }

    /// Stable `key = value` listing, also part of the output fingerprint.
    pub fn dump(&self) -> String {
        let flags = [
            ("RenderAnonymous", self.render_anonymous.as_str().to_string()),
            ("UseEnum", py_bool(self.use_enum)),
            ("UsePostponedEvaluation", py_bool(self.use_postponed_evaluation)),
            ("UseTypeUnion", py_bool(self.use_type_union)),
            ("UseExplicitTypeAlias", py_bool(self.use_explicit_type_alias)),
            ("UseTypeParameters", py_bool(self.use_type_parameters)),
            ("UseLiteralType", py_bool(self.use_literal_type)),
            ("UseVariadicGenerics", py_bool(self.use_variadic_generics)),
            ("UseNotRequired", py_bool(self.use_not_required)),
            ("AllowReadOnly", py_bool(self.allow_read_only)),
            ("AssumeDeferredEvaluation", py_bool(self.assume_deferred_evaluation)),
            ("KeepMultilineComments", py_bool(self.keep_multiline_comments)),
        ];
        let mut out = String::from("[ts2python]");
        for (key, value) in flags {
            out.push('\n');
            out.push_str(key);
            out.push_str(" = ");
            out.push_str(&value);
        }
        out
    }
}

fn py_bool(flag: bool) -> String {
    if flag { "True" } else { "False" }.to_string()
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
