use depalign_cli::authority::{FileAuthority, TranslationTable};
use depalign_cli::barrier::AlignmentBarrier;
use depalign_cli::config::{AlignmentConfig, parse_config_str};
use depalign_cli::core::AlignError;
use depalign_cli::test_utils::{coordinate, scenario_build};
use std::sync::Arc;

use crate::common::{SCENARIO_AUTHORITY, SCENARIO_CONFIG, Workspace};

fn align(config: &AlignmentConfig, authority: TranslationTable) -> AlignmentBarrier {
    config.validate().unwrap();
    let orchestrator = config.orchestrator(Some(Arc::new(authority)), None).unwrap();
    let barrier = AlignmentBarrier::new(
        scenario_build().to_model().unwrap(),
        orchestrator,
        config.barrier_policy(),
    )
    .unwrap();
    for registration in scenario_build().registrations().unwrap() {
        barrier.register(registration).unwrap();
    }
    barrier
}

#[test]
fn test_scenario_from_configuration() {
    let config: AlignmentConfig = parse_config_str(SCENARIO_CONFIG, "depalign.toml").unwrap();
    let authority = TranslationTable::new().with(coordinate("g:a:1.0"), "1.0-redhat-1");
    let barrier = align(&config, authority);

    let model = barrier.finished_model().unwrap();
    assert_eq!(model.find("subA").unwrap().aligned("g:a:1.0").unwrap().version, "1.0-redhat-1");
    assert_eq!(model.find("subB").unwrap().aligned("g:b:2.0").unwrap().version, "2.0-redhat-9");
    assert_eq!(model.root().version(), Some("1.0-redhat-00001"));
}

#[test]
fn test_properties_override_file_settings() {
    let mut config: AlignmentConfig = parse_config_str(SCENARIO_CONFIG, "depalign.toml").unwrap();
    config
        .apply_properties(vec![
            ("versionIncrementalSuffix", "temporary"),
            ("versionIncrementalSuffixPadding", "2"),
            ("dependencyOverride.g:b:*@*", "2.0-temporary-1"),
            ("dependencyExclusion.g:a@org.acme:subA", ""),
        ])
        .unwrap();
    let barrier = align(&config, TranslationTable::new().with(coordinate("g:a:1.0"), "1.0-redhat-1"));

    let model = barrier.finished_model().unwrap();
    assert_eq!(model.root().version(), Some("1.0-temporary-01"));
    assert!(model.find("subA").unwrap().aligned("g:a:1.0").is_none());
    assert_eq!(model.find("subB").unwrap().aligned("g:a:1.0").unwrap().version, "1.0-redhat-1");
    assert_eq!(model.find("subB").unwrap().aligned("g:b:2.0").unwrap().version, "2.0-temporary-1");
}

#[test]
fn test_version_modification_disabled() {
    let mut config: AlignmentConfig = parse_config_str(SCENARIO_CONFIG, "depalign.toml").unwrap();
    config.version_modification = false;
    let barrier = align(&config, TranslationTable::new());

    let model = barrier.finished_model().unwrap();
    assert_eq!(model.root().version(), Some("1.0"));
    assert_eq!(model.find("subA").unwrap().version(), Some("1.0"));
}

#[test]
fn test_malformed_rules_fail_before_registration() {
    let config: AlignmentConfig = parse_config_str(
        r#"
authority = "authority.toml"

[dependency_override]
"g:a" = "1"
"g:a@x@y" = "2"
"#,
        "depalign.toml",
    )
    .unwrap();

    assert!(matches!(config.validate(), Err(AlignError::MalformedRule { .. })));
    assert!(matches!(config.orchestrator(None, None), Err(AlignError::MalformedRule { .. })));
}

#[test]
fn test_file_authority_from_workspace() {
    let workspace = Workspace::new().unwrap();
    let path = workspace.write("authority.toml", SCENARIO_AUTHORITY).unwrap();
    let config: AlignmentConfig = parse_config_str(SCENARIO_CONFIG, "depalign.toml").unwrap();

    let orchestrator = config.orchestrator(Some(Arc::new(FileAuthority::new(path))), None).unwrap();
    let barrier = AlignmentBarrier::new(
        scenario_build().to_model().unwrap(),
        orchestrator,
        config.barrier_policy(),
    )
    .unwrap();
    for registration in scenario_build().registrations().unwrap() {
        barrier.register(registration).unwrap();
    }

    let model = barrier.finished_model().unwrap();
    assert_eq!(model.find("subA").unwrap().aligned("g:a:1.0").unwrap().version, "1.0-redhat-1");
}
