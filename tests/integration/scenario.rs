use depalign_cli::alignment::{DependencySource, Orchestrator, ResponseCustomizer};
use depalign_cli::barrier::{AlignmentBarrier, BarrierPolicy, Registration, RegistrationStatus};
use depalign_cli::coordinate::{Coordinate, DeclaredDependency};
use depalign_cli::model::{AlignmentModel, Module};
use depalign_cli::pattern::DependencyRule;
use depalign_cli::test_utils::{
    init_test_logging, registration, scenario_barrier, scenario_build,
};
use std::sync::Arc;
use std::thread;

use crate::common::CountingAuthority;

#[test]
fn test_three_module_scenario() {
    init_test_logging(None);
    let barrier = scenario_barrier();
    let registrations = scenario_build().registrations().unwrap();

    let mut statuses = Vec::new();
    for registration in registrations {
        statuses.push(barrier.register(registration).unwrap());
    }

    assert!(matches!(statuses[0], RegistrationStatus::Pending { remaining: 2 }));
    assert!(matches!(statuses[1], RegistrationStatus::Pending { remaining: 1 }));
    assert!(statuses[2].is_complete());

    let model = barrier.finished_model().unwrap();
    let sub_a = model.find("subA").unwrap();
    let sub_b = model.find(":subB").unwrap();

    assert_eq!(sub_a.aligned("g:a:1.0").unwrap().version, "1.0-redhat-1");
    assert_eq!(sub_b.aligned("g:a:1.0").unwrap().version, "1.0-redhat-1");
    assert_eq!(sub_b.aligned("g:b:2.0").unwrap().version, "2.0-redhat-9");
    assert!(model.root().aligned_dependencies().is_empty());
}

#[test]
fn test_model_is_unavailable_before_completion() {
    let barrier = scenario_barrier();
    barrier.register(registration(":", "org.acme:root:1.0", &[])).unwrap();

    assert_eq!(barrier.remaining().unwrap(), 2);
    assert!(!barrier.is_complete());
    assert!(barrier.finished_model().is_err());
}

#[test]
fn test_registration_order_does_not_matter() {
    let barrier = scenario_barrier();
    let mut registrations = scenario_build().registrations().unwrap();
    registrations.reverse();

    let completed = registrations
        .into_iter()
        .map(|r| barrier.register(r).unwrap())
        .filter(RegistrationStatus::is_complete)
        .count();

    assert_eq!(completed, 1);
    let model = barrier.finished_model().unwrap();
    assert_eq!(model.find("subB").unwrap().aligned("g:b:2.0").unwrap().version, "2.0-redhat-9");
}

#[test]
fn test_concurrent_registrations_align_exactly_once() {
    init_test_logging(None);
    const MODULES: usize = 24;

    let mut model = AlignmentModel::new("root", "org.acme");
    for i in 0..MODULES {
        model.add_module(&format!(":m{i}"), Module::new(format!("m{i}"), "org.acme")).unwrap();
    }

    let mut entries = vec![("g:shared:1.0".to_string(), "1.0-redhat-3".to_string())];
    for i in 0..MODULES {
        entries.push((format!("g:dep{i}:1.0"), format!("1.0-redhat-{i}")));
    }
    let borrowed: Vec<(&str, &str)> =
        entries.iter().map(|(c, v)| (c.as_str(), v.as_str())).collect();
    let authority = Arc::new(CountingAuthority::new(&borrowed));

    let orchestrator = Orchestrator::new(Some(authority.clone()), DependencySource::Rest).unwrap();
    let barrier = AlignmentBarrier::new(model, orchestrator, BarrierPolicy::default()).unwrap();

    let mut registrations = vec![registration(":", "org.acme:root:1.0", &[])];
    for i in 0..MODULES {
        let dep = format!("g:dep{i}:1.0");
        registrations.push(registration(
            &format!(":m{i}"),
            &format!("org.acme:m{i}:1.0"),
            &["g:shared:1.0", dep.as_str()],
        ));
    }

    let statuses: Vec<RegistrationStatus> = thread::scope(|scope| {
        let handles: Vec<_> = registrations
            .into_iter()
            .map(|r| {
                let barrier = &barrier;
                scope.spawn(move || barrier.register(r).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(statuses.iter().filter(|s| s.is_complete()).count(), 1);
    assert_eq!(authority.calls(), 1);

    let model = barrier.finished_model().unwrap();
    for i in 0..MODULES {
        let module = model.find(&format!(":m{i}")).unwrap();
        assert_eq!(module.aligned_dependencies().len(), 2, "module m{i}");
        assert_eq!(module.aligned("g:shared:1.0").unwrap().version, "1.0-redhat-3");
        assert_eq!(
            module.aligned(&format!("g:dep{i}:1.0")).unwrap().version,
            format!("1.0-redhat-{i}")
        );
        assert_eq!(module.version(), Some("1.0"));
    }
}

#[test]
fn test_dynamic_dependency_is_pinned() {
    let model = scenario_build().to_model().unwrap();
    let orchestrator = Orchestrator::new(
        Some(Arc::new(CountingAuthority::new(&[("g:a:1.0", "1.0-redhat-1")]))),
        DependencySource::Rest,
    )
    .unwrap()
    .with_response_customizer(ResponseCustomizer::DynamicInclusion);
    let barrier = AlignmentBarrier::new(model, orchestrator, BarrierPolicy::default()).unwrap();

    let dynamic = DeclaredDependency::new(
        Coordinate::new("g", "c", "3.+"),
        Some(Coordinate::new("g", "c", "3.4")),
    );
    barrier.register(registration(":", "org.acme:root:1.0", &[])).unwrap();
    barrier.register(registration(":subA", "org.acme:subA:1.0", &["g:a:1.0"])).unwrap();
    let status = barrier
        .register(Registration::new(
            ":subB",
            Coordinate::new("org.acme", "subB", "1.0"),
            vec![dynamic],
        ))
        .unwrap();
    assert!(status.is_complete());

    let model = barrier.finished_model().unwrap();
    assert_eq!(model.find(":subB").unwrap().aligned("g:c:3.+").unwrap().version, "3.4");
}

#[test]
fn test_owner_scoped_override_applies_to_one_module() {
    let model = scenario_build().to_model().unwrap();
    let rule = DependencyRule::parse("g:a@org.acme:subB").unwrap();
    let orchestrator = Orchestrator::new(
        Some(Arc::new(CountingAuthority::new(&[("g:a:1.0", "1.0-redhat-1")]))),
        DependencySource::Rest,
    )
    .unwrap()
    .with_response_customizer(ResponseCustomizer::Override {
        rules: vec![(rule, "1.0-redhat-5".to_string())],
    });
    let barrier = AlignmentBarrier::new(model, orchestrator, BarrierPolicy::default()).unwrap();

    for registration in scenario_build().registrations().unwrap() {
        barrier.register(registration).unwrap();
    }

    let model = barrier.finished_model().unwrap();
    assert_eq!(model.find("subA").unwrap().aligned("g:a:1.0").unwrap().version, "1.0-redhat-1");
    assert_eq!(model.find("subB").unwrap().aligned("g:a:1.0").unwrap().version, "1.0-redhat-5");
}
