use depalign_cli::model::AlignmentModel;
use predicates::prelude::*;

use crate::common::{SCENARIO_AUTHORITY, SCENARIO_BUILD, SCENARIO_CONFIG, Workspace};

fn scenario_workspace() -> Workspace {
    let workspace = Workspace::new().unwrap();
    workspace.write("depalign.toml", SCENARIO_CONFIG).unwrap();
    workspace.write("authority.toml", SCENARIO_AUTHORITY).unwrap();
    workspace.write("build.toml", SCENARIO_BUILD).unwrap();
    workspace
}

#[test]
fn test_align_writes_model_and_reports() {
    let workspace = scenario_workspace();

    workspace
        .depalign()
        .args(["align", "--build", "build.toml", "--report", "report.txt"])
        .args(["--report-json", "report.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Aligned 3 modules"))
        .stdout(predicate::str::contains("1.0-redhat-00001"));

    let model = AlignmentModel::load(&workspace.file("manipulation.json")).unwrap();
    assert_eq!(model.find("subA").unwrap().aligned("g:a:1.0").unwrap().version, "1.0-redhat-1");
    assert_eq!(model.find("subB").unwrap().aligned("g:b:2.0").unwrap().version, "2.0-redhat-9");

    let report = std::fs::read_to_string(workspace.file("report.txt")).unwrap();
    assert!(report.contains("------------------- project org.acme:subB"));
    assert!(report.contains("\tDependencies : g:b:2.0 --> g:b:2.0-redhat-9"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(workspace.file("report.json")).unwrap())
            .unwrap();
    assert_eq!(json["gav"]["gav"], "org.acme:root:1.0-redhat-00001");
}

#[test]
fn test_align_with_properties_and_output() {
    let workspace = scenario_workspace();

    workspace
        .depalign()
        .args(["align", "--build", "build.toml", "--output", "out/model.json"])
        .args(["-D", "versionIncrementalSuffix=temporary", "-D", "versionIncrementalSuffixPadding=3"])
        .assert()
        .success();

    let model = AlignmentModel::load(&workspace.file("out/model.json")).unwrap();
    assert_eq!(model.root().version(), Some("1.0-temporary-001"));
}

#[test]
fn test_align_with_disabled_source() {
    let workspace = Workspace::new().unwrap();
    workspace.write("build.toml", SCENARIO_BUILD).unwrap();

    workspace
        .depalign()
        .args(["align", "--build", "build.toml", "-D", "dependencySource=none"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no dependencies were aligned"));
}

#[test]
fn test_align_without_authority_fails_fast() {
    let workspace = Workspace::new().unwrap();
    workspace.write("build.toml", SCENARIO_BUILD).unwrap();

    workspace
        .depalign()
        .args(["align", "--build", "build.toml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("authority must be configured"));

    assert!(!workspace.file("manipulation.json").exists());
}

#[test]
fn test_align_with_malformed_rule() {
    let workspace = scenario_workspace();

    workspace
        .depalign()
        .args(["align", "--build", "build.toml", "-D", "dependencyOverride.g:b=1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed rule key 'g:b'"));
}

#[test]
fn test_align_with_unreachable_authority() {
    let workspace = scenario_workspace();
    std::fs::remove_file(workspace.file("authority.toml")).unwrap();

    workspace
        .depalign()
        .args(["align", "--build", "build.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Alignment authority unavailable"));

    assert!(!workspace.file("manipulation.json").exists());
}

#[test]
fn test_next_version() {
    let workspace = Workspace::new().unwrap();

    workspace
        .depalign()
        .args(["next-version", "1.0-redhat-00004"])
        .assert()
        .success()
        .stdout("1.0-redhat-00005\n");

    workspace
        .depalign()
        .args(["next-version", "1.0-other-7", "--suffix", "redhat", "--padding", "1"])
        .assert()
        .success()
        .stdout("1.0-other-7-redhat-1\n");
}

#[test]
fn test_show_module() {
    let workspace = scenario_workspace();
    workspace.depalign().args(["align", "--build", "build.toml"]).assert().success();

    workspace
        .depalign()
        .args(["show", "manipulation.json", "--module", "subB", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"g:b:2.0\": \"g:b:2.0-redhat-9\""));

    workspace
        .depalign()
        .args(["show", "--module", "subC"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("subA").or(predicate::str::contains("subB")));
}

#[test]
fn test_align_continues_from_existing_model() {
    let workspace = scenario_workspace();
    workspace.depalign().args(["align", "--build", "build.toml"]).assert().success();

    workspace
        .depalign()
        .args(["align", "--build", "build.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0-redhat-00002"));

    let model = AlignmentModel::load(&workspace.file("manipulation.json")).unwrap();
    assert_eq!(model.root().version(), Some("1.0-redhat-00002"));
    assert_eq!(model.find("subA").unwrap().aligned("g:a:1.0").unwrap().version, "1.0-redhat-1");
    assert_eq!(model.find("subB").unwrap().aligned("g:b:2.0").unwrap().version, "2.0-redhat-9");

    workspace
        .depalign()
        .args(["align", "--build", "build.toml", "--fresh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.0-redhat-00001"));
}

#[test]
fn test_align_with_corrupt_existing_model() {
    let workspace = scenario_workspace();
    workspace.write("manipulation.json", "not json").unwrap();

    workspace
        .depalign()
        .args(["align", "--build", "build.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--fresh"));
}
