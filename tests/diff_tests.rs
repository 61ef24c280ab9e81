mod common;

use chrono::NaiveDate;
use common::staff_wizard;
use wizard_core::domain::{EntitySnapshot, FieldValue, SelectedEntity};

fn date(y: i32, m: u32, d: u32) -> FieldValue {
    FieldValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn hydrated() -> wizard_core::core::WizardController {
    let mut wizard = staff_wizard();
    let snapshot = EntitySnapshot::new(5)
        .with_field("username", FieldValue::text("alice"))
        .with_field("fullName", FieldValue::text("Alice Rahma"))
        .with_field("startDate", date(2026, 1, 1))
        .with_field("endDate", date(2026, 6, 30))
        .with_selection(SelectedEntity::new(7, "Mayoral election"));
    wizard.hydrate(snapshot).unwrap();
    wizard
}

#[test]
fn untouched_wizard_reports_no_changes() {
    let wizard = hydrated();
    let report = wizard.diff().unwrap();
    assert!(report.values().all(|diff| !diff.changed));
    assert!(wizard.selection_diff().unwrap().is_unchanged());
}

#[test]
fn reverting_edits_by_hand_zeroes_the_diff() {
    let mut wizard = hydrated();
    wizard
        .set_field("fullName", FieldValue::text("Someone Else"))
        .unwrap();
    wizard.clear_selections();
    assert!(wizard.diff().unwrap()["fullName"].changed);

    wizard
        .set_field("fullName", FieldValue::text("Alice Rahma"))
        .unwrap();
    wizard.restore_selections().unwrap();

    let report = wizard.diff().unwrap();
    assert!(report.values().all(|diff| !diff.changed));
    assert!(wizard.selection_diff().unwrap().is_unchanged());
}

#[test]
fn diff_is_informative_only_and_never_shrinks_the_payload() {
    let mut wizard = hydrated();
    wizard
        .set_field("fullName", FieldValue::text("Alice R. Putri"))
        .unwrap();

    // One field changed, yet the payload still carries the whole entity.
    let payload = wizard.payload();
    let object = payload.as_object().unwrap();
    assert_eq!(object["fullName"], serde_json::json!("Alice R. Putri"));
    assert_eq!(object["username"], serde_json::json!("alice"));
    assert_eq!(object["startDate"], serde_json::json!("2026-01-01"));
    assert_eq!(object["endDate"], serde_json::json!("2026-06-30"));
}

#[test]
fn create_mode_has_no_diff() {
    let wizard = staff_wizard();
    assert!(wizard.diff().is_none());
    assert!(wizard.selection_diff().is_none());
}
