use clap::Parser;

use super::args::{AnonymousMode, CliArgs};
use ts2py_emitter::{PythonVersion, RenderAnonymous};

#[test]
fn parses_defaults() {
    let args = CliArgs::try_parse_from(["ts2py"]).expect("default args should parse");

    assert!(args.files.is_empty());
    assert!(args.out.is_none());
    assert!(args.compatibility.is_none());
    assert!(args.anonymous.is_none());
    assert!(args.peps.is_none());
    assert!(!args.comments);
    assert!(!args.singlethread);
    assert!(!args.verbose);
    assert!(!args.show_config);
}

#[test]
fn parses_common_flags() {
    let args = CliArgs::try_parse_from([
        "ts2py",
        "-o",
        "out",
        "-c",
        "3.11",
        "-a",
        "TopLevel",
        "-p",
        "655,~435",
        "-k",
        "--singlethread",
        "lsp.d.ts",
        "more",
    ])
    .expect("flags should parse");

    assert_eq!(args.out.as_deref(), Some(std::path::Path::new("out")));
    assert_eq!(args.compatibility, Some(PythonVersion::new(3, 11)));
    assert_eq!(args.anonymous, Some(AnonymousMode::Toplevel));
    assert_eq!(args.peps.as_deref(), Some("655,~435"));
    assert!(args.comments);
    assert!(args.singlethread);
    assert_eq!(args.files.len(), 2);
}

#[test]
fn rejects_malformed_python_version() {
    assert!(CliArgs::try_parse_from(["ts2py", "-c", "three"]).is_err());
    assert!(CliArgs::try_parse_from(["ts2py", "-a", "inline"]).is_err());
}

#[test]
fn anonymous_modes_map_to_render_modes() {
    assert_eq!(RenderAnonymous::from(AnonymousMode::Local), RenderAnonymous::Local);
    assert_eq!(
        RenderAnonymous::from(AnonymousMode::Functional),
        RenderAnonymous::Functional
    );
    assert_eq!(RenderAnonymous::from(AnonymousMode::Type), RenderAnonymous::Type);
}
