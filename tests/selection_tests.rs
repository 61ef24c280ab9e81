mod common;

use common::staff_wizard;
use serde_json::json;
use wizard_core::core::SelectionSet;
use wizard_core::domain::{EntityId, EntitySnapshot, FieldValue, SelectedEntity};

fn election(id: i64, label: &str) -> SelectedEntity {
    SelectedEntity::new(id, label).with_data(json!({ "status": "active", "voters": 120_000 }))
}

#[test]
fn toggling_twice_restores_membership_and_snapshots() {
    let mut set = SelectionSet::new();
    set.toggle(election(1, "Mayoral"));
    let before = set.clone();

    set.toggle(election(2, "Council"));
    set.toggle(election(2, "Council"));

    assert_eq!(set, before);
    assert_eq!(
        set.get(EntityId(1)).unwrap().data,
        json!({ "status": "active", "voters": 120_000 })
    );
}

#[test]
fn stored_snapshots_render_without_a_refetch() {
    let mut set = SelectionSet::new();
    set.toggle(election(3, "Gubernatorial"));
    let entry = set.get(EntityId(3)).unwrap();
    assert_eq!(entry.label, "Gubernatorial");
    assert_eq!(entry.data["status"], json!("active"));
}

#[test]
fn restore_selections_rolls_back_to_the_hydrated_membership() {
    let mut wizard = staff_wizard();
    let snapshot = EntitySnapshot::new(5)
        .with_field("username", FieldValue::text("alice"))
        .with_field("fullName", FieldValue::text("Alice Rahma"))
        .with_selection(election(1, "Mayoral"))
        .with_selection(election(2, "Council"));
    wizard.hydrate(snapshot).unwrap();

    wizard.remove_selection(EntityId(1));
    wizard.toggle_selection(election(9, "By-election"));
    assert_eq!(wizard.selections().ids(), vec![EntityId(2), EntityId(9)]);

    wizard.restore_selections().unwrap();
    assert_eq!(wizard.selections().ids(), vec![EntityId(1), EntityId(2)]);
    // Restoring makes the diff report no membership changes.
    assert!(wizard.selection_diff().unwrap().is_unchanged());
}

#[test]
fn restore_in_create_mode_is_a_contract_error() {
    let mut wizard = staff_wizard();
    assert!(wizard.restore_selections().is_err());
}
