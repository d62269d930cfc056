use depalign_cli::alignment::{
    DependencySource, Orchestrator, ProjectVersionSettings, RequestCustomizer, ResponseCustomizer,
};
use depalign_cli::barrier::{AlignmentBarrier, BarrierPolicy, Registration};
use depalign_cli::coordinate::{Coordinate, DeclaredDependency};
use depalign_cli::core::AlignError;
use depalign_cli::pattern::DependencyRule;
use depalign_cli::test_utils::{registration, scenario_build};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::common::{CountingAuthority, UnreachableAuthority};

fn scenario_authority() -> Arc<CountingAuthority> {
    Arc::new(CountingAuthority::new(&[
        ("g:a:1.0", "1.0-redhat-1"),
        ("g:b:2.0", "2.0-redhat-2"),
        ("org.acme:root:1.0", "1.0-redhat-00003"),
    ]))
}

fn register_scenario(barrier: &AlignmentBarrier) -> Result<(), AlignError> {
    for registration in scenario_build().registrations()? {
        barrier.register(registration)?;
    }
    Ok(())
}

fn barrier_with(orchestrator: Orchestrator, policy: BarrierPolicy) -> AlignmentBarrier {
    AlignmentBarrier::new(scenario_build().to_model().unwrap(), orchestrator, policy).unwrap()
}

#[test]
fn test_override_wins_over_translation() {
    let orchestrator = Orchestrator::new(Some(scenario_authority()), DependencySource::Rest)
        .unwrap()
        .with_response_customizer(ResponseCustomizer::Override {
            rules: vec![(DependencyRule::parse("g:a@*").unwrap(), "1.0-redhat-7".to_string())],
        });
    let barrier = barrier_with(orchestrator, BarrierPolicy::default());
    register_scenario(&barrier).unwrap();

    let model = barrier.finished_model().unwrap();
    assert_eq!(model.find("subA").unwrap().aligned("g:a:1.0").unwrap().version, "1.0-redhat-7");
    assert_eq!(model.find("subB").unwrap().aligned("g:b:2.0").unwrap().version, "2.0-redhat-2");
}

#[test]
fn test_later_override_layer_wins() {
    let orchestrator = Orchestrator::new(Some(scenario_authority()), DependencySource::Rest)
        .unwrap()
        .with_response_customizer(ResponseCustomizer::Override {
            rules: vec![(DependencyRule::parse("g:*@*").unwrap(), "first".to_string())],
        })
        .with_response_customizer(ResponseCustomizer::Override {
            rules: vec![(DependencyRule::parse("g:b@*").unwrap(), "second".to_string())],
        });
    let barrier = barrier_with(orchestrator, BarrierPolicy::default());
    register_scenario(&barrier).unwrap();

    let model = barrier.finished_model().unwrap();
    let sub_b = model.find("subB").unwrap();
    assert_eq!(sub_b.aligned("g:b:2.0").unwrap().version, "second");
    assert_eq!(sub_b.aligned("g:a:1.0").unwrap().version, "first");
}

#[test]
fn test_exclusion_removes_dependency_for_one_module() {
    let authority = scenario_authority();
    let orchestrator = Orchestrator::new(Some(authority.clone()), DependencySource::Rest)
        .unwrap()
        .with_request_customizer(RequestCustomizer::Exclusion {
            rules: vec![DependencyRule::parse("g:a@org.acme:subB").unwrap()],
        });
    let barrier = barrier_with(orchestrator, BarrierPolicy::default());
    register_scenario(&barrier).unwrap();

    let model = barrier.finished_model().unwrap();
    assert!(model.find("subA").unwrap().aligned("g:a:1.0").is_some());
    assert!(model.find("subB").unwrap().aligned("g:a:1.0").is_none());
    assert!(model.find("subB").unwrap().aligned("g:b:2.0").is_some());
    assert_eq!(authority.calls(), 1);
}

#[test]
fn test_project_version_uses_authority_version() {
    let orchestrator = Orchestrator::new(Some(scenario_authority()), DependencySource::Rest)
        .unwrap()
        .with_response_customizer(ResponseCustomizer::ProjectVersion(
            ProjectVersionSettings::default(),
        ));
    let barrier = barrier_with(orchestrator, BarrierPolicy::default());
    register_scenario(&barrier).unwrap();

    let handle = barrier.handle().unwrap();
    assert_eq!(handle.new_project_version, "1.0-redhat-00004");

    let model = barrier.finished_model().unwrap();
    assert_eq!(model.root().version(), Some("1.0-redhat-00004"));
    assert_eq!(model.root().original_version.as_deref(), Some("1.0"));
    assert_eq!(model.find("subA").unwrap().version(), Some("1.0-redhat-00004"));
}

#[test]
fn test_module_specific_version() {
    let orchestrator = Orchestrator::new(Some(scenario_authority()), DependencySource::Rest)
        .unwrap()
        .with_response_customizer(ResponseCustomizer::ProjectVersion(
            ProjectVersionSettings::default(),
        ));
    let mut module_versions = BTreeMap::new();
    module_versions.insert("subB".to_string(), "9.9".to_string());
    let policy = BarrierPolicy {
        module_versions,
        ..BarrierPolicy::default()
    };
    let barrier = barrier_with(orchestrator, policy);
    register_scenario(&barrier).unwrap();

    let model = barrier.finished_model().unwrap();
    assert_eq!(model.find("subB").unwrap().version(), Some("9.9"));
    assert_eq!(model.find("subA").unwrap().version(), Some("1.0-redhat-00004"));
}

#[test]
fn test_disabled_source_is_a_successful_no_op() {
    let orchestrator = Orchestrator::new(None, DependencySource::None)
        .unwrap()
        .with_response_customizer(ResponseCustomizer::ProjectVersion(
            ProjectVersionSettings::default(),
        ));
    let barrier = barrier_with(orchestrator, BarrierPolicy::default());
    register_scenario(&barrier).unwrap();

    let handle = barrier.handle().unwrap();
    assert!(handle.skipped_by_policy);
    assert_eq!(handle.new_project_version, "1.0-redhat-00001");
    assert_eq!(handle.non_aligned[":subB"].len(), 2);

    let model = barrier.finished_model().unwrap();
    assert!(model.find("subA").unwrap().aligned_dependencies().is_empty());
    assert!(model.find("subB").unwrap().aligned_dependencies().is_empty());
}

#[test]
fn test_unreachable_authority_writes_nothing() {
    let orchestrator = Orchestrator::new(Some(Arc::new(UnreachableAuthority)), DependencySource::Rest)
        .unwrap()
        .with_response_customizer(ResponseCustomizer::ProjectVersion(
            ProjectVersionSettings::default(),
        ));
    let barrier = barrier_with(orchestrator, BarrierPolicy::default());

    let err = register_scenario(&barrier).unwrap_err();
    match err {
        AlignError::AlignmentUnavailable {
            reason,
        } => assert_eq!(reason, "connection refused"),
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(!barrier.is_complete());
    assert!(matches!(
        barrier.finished_model(),
        Err(AlignError::AlignmentUnavailable { .. })
    ));
    // a late registration sees the same failure
    let late = barrier.register(registration(":subA", "org.acme:subA:1.0", &[]));
    assert!(matches!(late, Err(AlignError::AlignmentUnavailable { .. })));
}

#[test]
fn test_unresolvable_dependency_policy() {
    let unresolved = || {
        Registration::new(
            ":subB",
            Coordinate::new("org.acme", "subB", "1.0"),
            vec![
                DeclaredDependency::new(Coordinate::new("g", "c", "1.+"), None),
                DeclaredDependency::from(Coordinate::new("g", "b", "2.0")),
            ],
        )
    };

    let orchestrator = Orchestrator::new(Some(scenario_authority()), DependencySource::Rest).unwrap();
    let barrier = barrier_with(orchestrator.clone(), BarrierPolicy::default());
    barrier.register(registration(":", "org.acme:root:1.0", &[])).unwrap();
    let err = barrier.register(unresolved()).unwrap_err();
    assert!(matches!(err, AlignError::UnresolvableDependency { .. }));
    assert!(barrier.register(registration(":subA", "org.acme:subA:1.0", &[])).is_err());

    let policy = BarrierPolicy {
        ignore_unresolvable_dependencies: true,
        ..BarrierPolicy::default()
    };
    let barrier = barrier_with(orchestrator, policy);
    barrier.register(registration(":", "org.acme:root:1.0", &[])).unwrap();
    barrier.register(unresolved()).unwrap();
    let status = barrier.register(registration(":subA", "org.acme:subA:1.0", &[])).unwrap();
    assert!(status.is_complete());

    let model = barrier.finished_model().unwrap();
    let sub_b = model.find("subB").unwrap();
    assert!(sub_b.aligned("g:c:1.+").is_none());
    assert_eq!(sub_b.aligned("g:b:2.0").unwrap().version, "2.0-redhat-2");
}
