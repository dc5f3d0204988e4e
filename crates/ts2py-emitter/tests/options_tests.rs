use super::*;

#[test]
fn python_version_parses_and_orders() {
    let version: PythonVersion = "3.11".parse().unwrap();
    assert_eq!(version, PythonVersion::new(3, 11));
    assert!(version > PythonVersion::BASELINE);
    assert_eq!(version.to_string(), "3.11");
    assert!(matches!(
        "3".parse::<PythonVersion>(),
        Err(ConfigError::InvalidPythonVersion(_))
    ));
}

#[test]
fn presets_enable_supported_features() {
    let py38 = Compatibility::for_python_version(PythonVersion::new(3, 8)).unwrap();
    assert!(py38.use_literal_type);
    assert!(!py38.use_type_union);

    let py312 = Compatibility::for_python_version(PythonVersion::new(3, 12)).unwrap();
    assert!(py312.use_type_parameters);
    assert!(py312.use_variadic_generics);
    assert!(py312.use_not_required);
    assert!(!py312.use_explicit_type_alias);
    assert!(!py312.allow_read_only);
    assert!(py312.validate().is_ok());

    assert_eq!(
        Compatibility::for_python_version(PythonVersion::new(3, 6)),
        Err(ConfigError::UnsupportedPythonVersion(PythonVersion::new(3, 6)))
    );
}

#[test]
fn peps_toggle_flags() {
    let mut compat = Compatibility::default();
    compat.apply_peps("655, 586 ~435").unwrap();
    assert!(compat.use_not_required);
    assert!(compat.use_literal_type);
    assert!(!compat.use_enum);
    assert_eq!(
        compat.apply_peps("999"),
        Err(ConfigError::UnknownPep("999".to_string()))
    );
}

#[test]
fn type_parameters_need_variadic_generics() {
    let mut compat = Compatibility::default();
    compat.use_type_parameters = true;
    assert_eq!(
        compat.validate(),
        Err(ConfigError::TypeParametersWithoutVariadicGenerics)
    );
}

#[test]
fn required_version_distinguishes_feature_level() {
    let mut compat = Compatibility::default();
    assert_eq!(
        compat.required_python_version(Requirement::Compatibility),
        PythonVersion::BASELINE
    );
    compat.use_not_required = true;
    compat.allow_read_only = true;
    assert_eq!(
        compat.required_python_version(Requirement::Compatibility),
        PythonVersion::BASELINE
    );
    assert_eq!(
        compat.required_python_version(Requirement::Features),
        PythonVersion::new(3, 13)
    );
    compat.use_type_union = true;
    assert_eq!(
        compat.required_python_version(Requirement::Compatibility),
        PythonVersion::new(3, 10)
    );
}

#[test]
fn effective_flags_drop_explicit_alias_under_type_parameters() {
    let mut compat = Compatibility::default();
    compat.use_explicit_type_alias = true;
    compat.use_type_parameters = true;
    assert!(!compat.effective().use_explicit_type_alias);
    assert!(compat.use_explicit_type_alias);
}

#[test]
fn dump_lists_every_flag() {
    let dump = Compatibility::default().dump();
    assert!(dump.starts_with("[ts2python]\nRenderAnonymous = local\nUseEnum = True"));
    assert!(dump.contains("UseNotRequired = False"));
    assert_eq!(dump.lines().count(), 13);
}

#[test]
fn render_modes_parse_case_insensitively() {
    assert_eq!("TopLevel".parse::<RenderAnonymous>(), Ok(RenderAnonymous::Toplevel));
    assert_eq!(RenderAnonymous::Functional.to_string(), "functional");
    assert!(matches!(
        "inline".parse::<RenderAnonymous>(),
        Err(ConfigError::InvalidRenderMode(_))
    ));
}
