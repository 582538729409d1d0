//! End-to-end migrations through the connectors, on workbooks written to disk.

mod common;

use common::{add_broken_script, add_checkout_script, text_rows, uft_archive, write_workbook};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use tc_connector::{
    ActionMode, ConnectorError, Definition, ErrorKind, FailurePolicy, ManualConnector,
    ModelObject, ObjectModel, SeleniumConnector, UftConnector,
};
use tempfile::TempDir;

fn step_values(model: &ObjectModel) -> Vec<(String, Option<ActionMode>)> {
    model
        .of_kind("test_step_value")
        .map(|object| match object {
            ModelObject::TestStepValue {
                value, action_mode, ..
            } => (value.clone(), *action_mode),
            other => panic!("unexpected {:?}", other),
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// UFT ARCHIVE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_uft_archive_object_counts() {
    let dir = TempDir::new().unwrap();
    let archive = uft_archive(dir.path());
    let definition = Definition::default();
    let mut model = ObjectModel::new(definition.engine.clone());

    let summary = UftConnector::new(&definition, FailurePolicy::Abort)
        .migrate_archive(&archive, &mut model)
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.files_processed.len(), 1);
    let expected: BTreeMap<&str, usize> = BTreeMap::from([
        ("attribute_value", 2),
        ("instance", 2),
        ("instance_collection", 1),
        ("module", 1),
        ("module_attribute", 3),
        ("special_execution_task", 2),
        ("special_execution_task_attribute", 3),
        ("template_conversion", 1),
        ("test_case", 1),
        ("test_sheet", 1),
        ("test_sheet_attribute", 1),
        ("test_step", 3),
        ("test_step_value", 6),
    ]);
    assert_eq!(model.counts_by_kind(), expected);
}

#[test]
fn test_uft_archive_values() {
    let dir = TempDir::new().unwrap();
    let archive = uft_archive(dir.path());
    let definition = Definition::default();
    let mut model = ObjectModel::new(definition.engine.clone());
    UftConnector::new(&definition, FailurePolicy::Abort)
        .migrate_archive(&archive, &mut model)
        .unwrap();

    assert_eq!(
        step_values(&model),
        vec![
            ("https://shop.example".to_string(), None),
            ("{XL[UserName]}".to_string(), Some(ActionMode::Input)),
            ("{Click}".to_string(), Some(ActionMode::Input)),
            ("color=red".to_string(), Some(ActionMode::Verify)),
            ("Shop*".to_string(), None),
            ("Close".to_string(), None),
        ]
    );

    let instances: Vec<String> = model
        .of_kind("instance")
        .map(|object| match object {
            ModelObject::Instance { name, .. } => name.clone(),
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(instances, vec!["TC_1", "TC_2"]);

    match model.of_kind("module").next() {
        Some(ModelObject::Module {
            name,
            folder,
            engine,
            properties,
        }) => {
            assert_eq!(name, "Login");
            assert_eq!(folder, "Modules");
            assert_eq!(engine.as_deref(), Some("Html"));
            assert_eq!(
                properties.get("Title").map(String::as_str),
                Some("Shop - Login")
            );
        }
        other => panic!("expected module, got {:?}", other),
    };
}

#[test]
fn test_uft_broken_script_aborts_by_default() {
    let dir = TempDir::new().unwrap();
    let archive = uft_archive(dir.path());
    add_broken_script(&archive);
    let definition = Definition::default();
    let mut model = ObjectModel::new(None);

    let err = UftConnector::new(&definition, FailurePolicy::Abort)
        .migrate_archive(&archive, &mut model)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Mapping);
    assert!(matches!(err, ConnectorError::File { .. }));
    let message = err.to_string();
    assert!(message.contains("Broken.xlsx"));
    assert!(message.contains("sheet 'Broken', row 2"));
}

#[test]
fn test_uft_broken_script_skipped() {
    let dir = TempDir::new().unwrap();
    let archive = uft_archive(dir.path());
    add_broken_script(&archive);
    let definition = Definition::default();
    let mut model = ObjectModel::new(None);

    let summary = UftConnector::new(&definition, FailurePolicy::Skip)
        .migrate_archive(&archive, &mut model)
        .unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].path.ends_with("Broken.xlsx"));
    assert_eq!(summary.files_processed.len(), 1);
    // partial output of the failed file is kept
    assert_eq!(model.count("test_case"), 2);
    assert_eq!(model.count("template_conversion"), 1);
}

#[test]
fn test_uft_repository_miss_skips_only_the_row() {
    let dir = TempDir::new().unwrap();
    let archive = uft_archive(dir.path());
    add_checkout_script(&archive);
    let definition = Definition::default();
    let mut model = ObjectModel::new(None);

    let summary = UftConnector::new(&definition, FailurePolicy::Abort)
        .migrate_archive(&archive, &mut model)
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.files_processed.len(), 2);
    let skipped: Vec<(String, usize)> = summary
        .skipped_rows
        .iter()
        .map(|warning| (warning.sheet.clone(), warning.row))
        .collect();
    assert_eq!(
        skipped,
        vec![
            ("Checkout".to_string(), 3),
            ("Checkout".to_string(), 5),
            ("Checkout".to_string(), 6),
        ]
    );
    assert!(summary.skipped_rows[0].path.ends_with("Checkout.xlsx"));
    assert!(summary.skipped_rows[0].message.contains("Coupon"));
    assert!(summary.skipped_rows[1].message.contains("Payment"));

    // the row after the miss and the whole Login script still migrate
    assert_eq!(model.count("test_case"), 2);
    let values: Vec<String> = step_values(&model).into_iter().map(|(v, _)| v).collect();
    assert_eq!(values[0], "carol");
    assert!(values.contains(&"{XL[UserName]}".to_string()));
}

// ═══════════════════════════════════════════════════════════════════════════
// SELENIUM AND MANUAL WORKBOOKS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_selenium_one_test_case_per_sheet() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scripts.xlsx");
    let header: &[&str] = &["FunctionKeyword", "Locator Type", "Locator Value", "Test Data"];
    write_workbook(
        &path,
        &[
            (
                "Login",
                text_rows(&[
                    header,
                    &["enter_Text", "id", "user", "alice"],
                    &["click_On_Button", "id", "submitBtn", ""],
                ]),
            ),
            (
                "Search",
                text_rows(&[header, &["select", "name", "category", "Shoes"]]),
            ),
        ],
    );
    let definition = Definition::default();
    let mut model = ObjectModel::new(definition.engine.clone());

    SeleniumConnector::new(&definition, FailurePolicy::Abort)
        .migrate_file(&path, &mut model)
        .unwrap();

    let names: Vec<String> = model
        .of_kind("test_case")
        .map(|object| match object {
            ModelObject::TestCase { name, .. } => name.clone(),
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(names, vec!["Login", "Search"]);
    // the page counter restarts with every worksheet
    assert_eq!(model.count("module"), 2);
    assert_eq!(
        step_values(&model),
        vec![
            ("alice".to_string(), Some(ActionMode::Input)),
            ("{CLICK}".to_string(), Some(ActionMode::Input)),
            ("Shoes".to_string(), Some(ActionMode::Input)),
        ]
    );
}

#[test]
fn test_manual_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("manual.xlsx");
    write_workbook(
        &path,
        &[(
            "Cases",
            text_rows(&[
                &["TestCase", "Action", "Input Parameter", "Value", "Expected Result"],
                &["Login", "Enter credentials", "User", "alice", ""],
                &["", "Submit", "", "", "Dashboard shown"],
            ]),
        )],
    );
    let definition = Definition::default().without_engine();
    let mut model = ObjectModel::new(None);

    let summary = ManualConnector::new(&definition, FailurePolicy::Abort)
        .migrate_file(&path, &mut model)
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(model.count("test_case"), 1);
    assert_eq!(model.count("manual_test_step"), 2);
    assert_eq!(model.count("manual_test_step_value"), 2);
}
