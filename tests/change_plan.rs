// tests/change_plan.rs

//! Change plans loaded from TOML and applied as a set.

mod common;

use appx_content::{ChangeOutcome, ChangePlan, ContentError};
use common::*;

const PLAN: &str = r#"
[[change]]
kind = "capability"
name = "systemManagement"
namespace = "iot"

[[change]]
kind = "capability"
name = "lowLevelDevices"
namespace = "iot"
device_id = "D1"
function_type = "voiceCommand"

[[change]]
kind = "capability"
element = "DeviceCapability"
name = "serialcommunication"
"#;

fn write_plan(dir: &std::path::Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("changes.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_plan_applies_in_order() {
    let (dir, manifest) = content_root_with(EMPTY_CAPABILITIES_MANIFEST);
    let plan_path = write_plan(dir.path(), PLAN);

    let plan = ChangePlan::from_file(&plan_path).unwrap();
    let reports = plan.into_change_set().apply(dir.path()).unwrap();

    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.outcome == ChangeOutcome::Applied));

    let capabilities = capability_elements(&manifest);
    let names: Vec<_> = capabilities
        .iter()
        .map(|el| el.attribute("Name").unwrap().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["systemManagement", "lowLevelDevices", "serialcommunication"]
    );

    let device = capabilities[1].children_named("Device").next().unwrap();
    assert_eq!(device.attribute("Id").unwrap().as_deref(), Some("D1"));
    assert_eq!(device.children_named("Function").count(), 1);
}

#[test]
fn test_plan_without_manifest_skips_everything() {
    let dir = tempfile::tempdir().unwrap();
    let plan_path = write_plan(dir.path(), PLAN);

    let reports = ChangePlan::from_file(&plan_path)
        .unwrap()
        .into_change_set()
        .apply(dir.path())
        .unwrap();

    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.outcome == ChangeOutcome::Skipped));
    assert!(!dir.path().join("AppxManifest.xml").exists());
}

#[test]
fn test_plan_stops_at_missing_capabilities() {
    let (dir, manifest) = content_root_with(NO_CAPABILITIES_MANIFEST);
    let plan_path = write_plan(dir.path(), PLAN);

    let err = ChangePlan::from_file(&plan_path)
        .unwrap()
        .into_change_set()
        .apply(dir.path())
        .unwrap_err();

    assert!(matches!(err, ContentError::MissingNode { .. }));
    assert_eq!(read(&manifest), NO_CAPABILITIES_MANIFEST);
}

#[test]
fn test_missing_plan_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ChangePlan::from_file(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ContentError::Io(_)));
}
