use clap::Parser;
use std::path::Path;

use super::args::CliArgs;
use super::config::{CONFIG_FILE_NAME, find_config, parse_config, resolve_compatibility};
use ts2py_emitter::{ConfigError, RenderAnonymous};

fn args(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["ts2py"];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).expect("args should parse")
}

fn write_config(dir: &Path, contents: &str) {
    std::fs::write(dir.join(CONFIG_FILE_NAME), contents).expect("failed to write config");
}

#[test]
fn parses_camel_case_keys_and_string_booleans() {
    let config = parse_config(
        r#"{
            "useEnum": "no",
            "useLiteralType": true,
            "keepMultilineComments": "on",
            "renderAnonymous": "functional",
            "compatibility": "3.10"
        }"#,
    )
    .expect("config should parse");

    assert_eq!(config.use_enum, Some(false));
    assert_eq!(config.use_literal_type, Some(true));
    assert_eq!(config.keep_multiline_comments, Some(true));
    assert_eq!(config.render_anonymous.as_deref(), Some("functional"));
    assert_eq!(config.compatibility.as_deref(), Some("3.10"));
    assert_eq!(config.use_not_required, None);
}

#[test]
fn rejects_invalid_boolean_strings() {
    let err = parse_config(r#"{ "useEnum": "maybe" }"#).unwrap_err();
    assert!(format!("{err:#}").contains("invalid boolean value"));
}

#[test]
fn defaults_without_config_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    assert!(find_config(dir.path()).is_none());

    let compat = resolve_compatibility(&args(&[]), dir.path()).expect("defaults resolve");
    assert!(compat.use_enum);
    assert!(!compat.use_literal_type);
    assert_eq!(compat.render_anonymous, RenderAnonymous::Local);
}

#[test]
fn config_file_is_found_in_working_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_config(dir.path(), r#"{ "useTypeUnion": true, "renderAnonymous": "type" }"#);

    let compat = resolve_compatibility(&args(&[]), dir.path()).expect("config resolves");
    assert!(compat.use_type_union);
    assert_eq!(compat.render_anonymous, RenderAnonymous::Type);
}

#[test]
fn command_line_overrides_config_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_config(
        dir.path(),
        r#"{ "useEnum": false, "peps": "586", "renderAnonymous": "type" }"#,
    );

    let compat = resolve_compatibility(&args(&["-p", "435", "-a", "toplevel", "-k"]), dir.path())
        .expect("config resolves");
    assert!(compat.use_enum);
    assert!(!compat.use_literal_type, "command line PEPs replace the file's");
    assert_eq!(compat.render_anonymous, RenderAnonymous::Toplevel);
    assert!(compat.keep_multiline_comments);
}

#[test]
fn preset_applies_before_pep_toggles() {
    let dir = tempfile::tempdir().expect("temp dir");
    let compat = resolve_compatibility(&args(&["-c", "3.11", "-p", "~655"]), dir.path())
        .expect("config resolves");
    assert!(compat.use_literal_type);
    assert!(compat.use_type_union);
    assert!(!compat.use_not_required);
}

#[test]
fn explicit_config_path_is_loaded() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("custom.json"), r#"{ "compatibility": "3.8" }"#)
        .expect("failed to write config");

    let compat = resolve_compatibility(&args(&["--config", "custom.json"]), dir.path())
        .expect("config resolves");
    assert!(compat.use_literal_type);
    assert!(!compat.use_type_union);
}

#[test]
fn invalid_combinations_are_rejected_before_compiling() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_config(dir.path(), r#"{ "useTypeParameters": true }"#);

    let err = resolve_compatibility(&args(&[]), dir.path()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::TypeParametersWithoutVariadicGenerics)
    );
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = resolve_compatibility(&args(&["--config", "absent.json"]), dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read config file"));
}
