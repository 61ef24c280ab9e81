#![allow(dead_code)]

use wizard_core::config::EngineConfig;
use wizard_core::core::{
    Check, Effect, ProbeDescriptor, StepDescriptor, WizardController, WizardDescriptor,
};
use wizard_core::domain::{Choice, FieldDescriptor, FieldKind};

/// Citizen report submission: a four-field dependency chain
/// electionId → reportId → reportTypeId → reportStageId.
pub fn report_wizard() -> WizardController {
    let descriptor = WizardDescriptor::new("citizen-report")
        .with_field(FieldDescriptor::new("electionId", "Election", FieldKind::Reference))
        .with_field(FieldDescriptor::new("reportId", "Report", FieldKind::Reference))
        .with_field(FieldDescriptor::new(
            "reportTypeId",
            "Report type",
            FieldKind::Reference,
        ))
        .with_field(FieldDescriptor::new(
            "reportStageId",
            "Report stage",
            FieldKind::Reference,
        ))
        .with_edge("electionId", "reportId")
        .with_edge("reportId", "reportTypeId")
        .with_edge("reportTypeId", "reportStageId")
        .with_step(
            StepDescriptor::new("report")
                .with_field("electionId")
                .with_field("reportId")
                .with_field("reportTypeId")
                .with_field("reportStageId"),
        )
        .with_step(StepDescriptor::new("review"));
    WizardController::new(descriptor, EngineConfig::default()).expect("valid descriptor")
}

/// Staff create/edit: username uniqueness probe, election multi-select, and
/// a start/end date range gated at submit time.
pub fn staff_wizard() -> WizardController {
    let descriptor = WizardDescriptor::new("staff")
        .with_field(FieldDescriptor::new("username", "Username", FieldKind::Text))
        .with_field(FieldDescriptor::new("fullName", "Full name", FieldKind::Text))
        .with_field(FieldDescriptor::new("email", "Email", FieldKind::Text).optional())
        .with_field(FieldDescriptor::new("startDate", "Start date", FieldKind::Date))
        .with_field(FieldDescriptor::new("endDate", "End date", FieldKind::Date))
        .with_step(
            StepDescriptor::new("identity")
                .with_field("username")
                .with_field("fullName")
                .with_field("email")
                .with_probe(ProbeDescriptor::new(["username", "email"])),
        )
        .with_step(
            StepDescriptor::new("assignment")
                .with_field("startDate")
                .with_field("endDate"),
        )
        .with_step(StepDescriptor::new("review"))
        .with_final_check(Check::MinSelections(1))
        .with_final_check(Check::DateOrder {
            start: "startDate".into(),
            end: "endDate".into(),
        })
        .with_selection_key("electionIds");
    WizardController::new(descriptor, EngineConfig::default()).expect("valid descriptor")
}

/// Unpacks the single `LoadOptions` effect expected for `field`.
pub fn expect_load(effects: &[Effect], field: &str) -> u64 {
    let generations: Vec<u64> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::LoadOptions {
                field: target,
                generation,
                ..
            } if target == field => Some(*generation),
            _ => None,
        })
        .collect();
    assert_eq!(
        generations.len(),
        1,
        "expected exactly one load for `{field}` in {effects:?}"
    );
    generations[0]
}

pub fn choices(ids: &[i64]) -> Vec<Choice> {
    ids.iter()
        .map(|id| Choice::new(*id, format!("option {id}")))
        .collect()
}
