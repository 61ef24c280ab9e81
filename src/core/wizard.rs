use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};

use crate::config::EngineConfig;
use crate::core::cascade::{CascadeEdge, CascadeResolver, OptionState};
use crate::core::diff::{diff_fields, diff_selections, FieldDiff, OriginalSnapshot, SelectionDiff};
use crate::core::effect::Effect;
use crate::core::selection::SelectionSet;
use crate::core::store::{FieldStore, Mutation};
use crate::core::validation::{run_checks, Check, ProbeDescriptor};
use crate::domain::common::EntityId;
use crate::domain::field::{FieldDescriptor, FieldName, FieldValue};
use crate::domain::snapshot::{EntitySnapshot, SelectedEntity};
use crate::errors::{WizardError, WizardResult};
use crate::storage::{AttachmentSet, StorageId};

/// One step of a wizard: an id, the fields it owns, its pure checks, and an
/// optional server-side duplicate probe.
#[derive(Debug, Clone)]
pub struct StepDescriptor {
    pub id: String,
    pub fields: Vec<FieldName>,
    pub checks: Vec<Check>,
    pub probe: Option<ProbeDescriptor>,
}

impl StepDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
            checks: Vec::new(),
            probe: None,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn with_probe(mut self, probe: ProbeDescriptor) -> Self {
        self.probe = Some(probe);
        self
    }
}

/// Full description of a wizard: its fields, ordered steps (the last one is
/// the review step and owns no editable fields), cascade edges, and the
/// aggregate gate evaluated at submit time.
#[derive(Debug, Clone)]
pub struct WizardDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub steps: Vec<StepDescriptor>,
    pub edges: Vec<CascadeEdge>,
    pub final_checks: Vec<Check>,
    /// Payload key under which the multi-select ids are sent, when the
    /// wizard carries a selection set.
    pub selection_key: Option<String>,
}

impl WizardDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            steps: Vec::new(),
            edges: Vec::new(),
            final_checks: Vec::new(),
            selection_key: None,
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_step(mut self, step: StepDescriptor) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_edge(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.edges.push(CascadeEdge::new(source, target));
        self
    }

    pub fn with_final_check(mut self, check: Check) -> Self {
        self.final_checks.push(check);
        self
    }

    pub fn with_selection_key(mut self, key: impl Into<String>) -> Self {
        self.selection_key = Some(key.into());
        self
    }

    fn declared(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    fn validate(&self) -> WizardResult<()> {
        if self.steps.is_empty() {
            return Err(WizardError::InvalidDescriptor(
                "a wizard needs at least one step".into(),
            ));
        }
        let review = &self.steps[self.steps.len() - 1];
        if !review.fields.is_empty() {
            return Err(WizardError::InvalidDescriptor(format!(
                "review step `{}` must not own editable fields",
                review.id
            )));
        }
        for step in &self.steps {
            for field in &step.fields {
                if !self.declared(field) {
                    return Err(WizardError::InvalidDescriptor(format!(
                        "step `{}` references undeclared field `{}`",
                        step.id, field
                    )));
                }
            }
        }
        for step in &self.steps {
            let Some(probe) = &step.probe else { continue };
            for field in &probe.fields {
                if !self.declared(field) {
                    return Err(WizardError::InvalidDescriptor(format!(
                        "probe on step `{}` references undeclared field `{}`",
                        step.id, field
                    )));
                }
            }
        }
        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !self.declared(endpoint) {
                    return Err(WizardError::InvalidDescriptor(format!(
                        "cascade edge references undeclared field `{endpoint}`"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Where the wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    /// Step `i` is active and accepting input.
    AtStep(usize),
    /// Step `i` passed its pure checks; its duplicate probe is in flight and
    /// forward navigation is blocked.
    Checking(usize),
    /// The payload left for the backend; the submit control is disabled.
    Submitting,
    /// Submit succeeded; the wizard is finished.
    Done,
}

impl WizardState {
    fn describe(&self) -> String {
        match self {
            WizardState::AtStep(i) => format!("at step {i}"),
            WizardState::Checking(i) => format!("checking step {i}"),
            WizardState::Submitting => "submitting".into(),
            WizardState::Done => "done".into(),
        }
    }
}

/// Result of a navigation or submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// Moved to the given step.
    Advanced { step: usize, effects: Vec<Effect> },
    /// Pure checks passed; a server round-trip is pending.
    Pending { effects: Vec<Effect> },
    /// Blocked; all collected error messages, surfaced together.
    Rejected { errors: Vec<String> },
}

/// One row of the review-step projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub name: FieldName,
    pub label: String,
    pub value: FieldValue,
    /// Present in edit mode only.
    pub diff: Option<FieldDiff>,
}

/// Owns the step index, gates navigation on validation, routes field changes
/// through the cascade resolver, and assembles the submit payload.
#[derive(Debug)]
pub struct WizardController {
    descriptor: WizardDescriptor,
    store: FieldStore,
    cascade: CascadeResolver,
    selections: SelectionSet,
    attachments: AttachmentSet,
    original: Option<OriginalSnapshot>,
    entity_id: Option<EntityId>,
    state: WizardState,
    probe_generation: u64,
    last_submit_error: Option<String>,
    labels: BTreeMap<FieldName, String>,
}

impl WizardController {
    pub fn new(descriptor: WizardDescriptor, config: EngineConfig) -> WizardResult<Self> {
        descriptor.validate()?;
        let store = FieldStore::from_descriptors(&descriptor.fields, config.unknown_fields);
        let cascade = CascadeResolver::new(descriptor.edges.clone())?;
        let labels = descriptor
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.label.clone()))
            .collect();
        Ok(Self {
            descriptor,
            store,
            cascade,
            selections: SelectionSet::new(),
            attachments: AttachmentSet::new(),
            original: None,
            entity_id: None,
            state: WizardState::AtStep(0),
            probe_generation: 0,
            last_submit_error: None,
            labels,
        })
    }

    fn last_step(&self) -> usize {
        self.descriptor.steps.len() - 1
    }

    fn illegal(&self, action: &str) -> WizardError {
        WizardError::IllegalTransition {
            state: self.state.describe(),
            action: action.into(),
        }
    }

    /// Edit-mode bootstrap: populates the store and selection set from the
    /// fetched entity, takes the original snapshot, and primes option loads
    /// for every cascade source that holds a value. Restored cascade values
    /// are kept until fresh options prove them stale.
    pub fn hydrate(&mut self, snapshot: EntitySnapshot) -> WizardResult<Vec<Effect>> {
        if self.state != WizardState::AtStep(0) || self.original.is_some() {
            return Err(self.illegal("hydrate"));
        }
        for (name, value) in &snapshot.fields {
            self.store.set(name, value.clone())?;
        }
        self.selections.restore(snapshot.selections);
        self.entity_id = Some(snapshot.id);
        self.original = Some(OriginalSnapshot::capture(&self.store, &self.selections));
        Ok(self.cascade.prime(&self.store))
    }

    /// Applies one user edit. Same-value writes are no-ops. When the field
    /// is a cascade source the downstream chain is cleared synchronously and
    /// fresh loads are issued. An edit while a duplicate probe is in flight
    /// drops the wizard back to the step and orphans the probe.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> WizardResult<Vec<Effect>> {
        match self.state {
            WizardState::AtStep(_) => {}
            WizardState::Checking(step) => {
                self.probe_generation += 1;
                self.state = WizardState::AtStep(step);
            }
            _ => return Err(self.illegal("set_field")),
        }
        if self.store.set(name, value)? == Mutation::Unchanged {
            return Ok(Vec::new());
        }
        if self.cascade.is_source(name) {
            Ok(self.cascade.on_source_changed(name, &mut self.store))
        } else {
            Ok(Vec::new())
        }
    }

    pub fn field(&self, name: &str) -> &FieldValue {
        self.store.get(name)
    }

    /// Option list for a cascade target, `None` for other fields.
    pub fn options(&self, name: &str) -> Option<&OptionState> {
        self.cascade.options(name)
    }

    pub fn is_field_disabled(&self, name: &str) -> bool {
        self.cascade.is_disabled(name, &self.store)
    }

    /// Host callback: a cascade load for `field` finished. Stale generations
    /// are discarded. May return follow-up effects when the fresh options
    /// invalidate a restored value further down the chain.
    pub fn options_loaded(
        &mut self,
        field: &str,
        generation: u64,
        choices: Vec<crate::domain::choice::Choice>,
    ) -> Vec<Effect> {
        self.cascade
            .apply_options(field, generation, choices, &mut self.store)
    }

    /// Host callback: a cascade load failed. The target stays disabled with
    /// a retryable error; sibling fields are untouched.
    pub fn options_failed(&mut self, field: &str, generation: u64, message: impl Into<String>) {
        self.cascade.apply_failure(field, generation, message);
    }

    /// Re-issues a failed option load against the source's current value.
    pub fn retry_load(&mut self, field: &str) -> Option<Effect> {
        self.cascade.retry(field, &self.store)
    }

    pub fn toggle_selection(&mut self, entity: SelectedEntity) -> bool {
        self.selections.toggle(entity)
    }

    pub fn remove_selection(&mut self, id: EntityId) -> Option<SelectedEntity> {
        self.selections.remove(id)
    }

    pub fn clear_selections(&mut self) {
        self.selections.clear();
    }

    /// Explicit reset action: puts the selection set back to the membership
    /// captured at hydration. Create mode has no original to restore.
    pub fn restore_selections(&mut self) -> WizardResult<()> {
        let original = self
            .original
            .as_ref()
            .ok_or_else(|| self.illegal("restore_selections"))?;
        let entities = original.selections().iter().cloned().collect();
        self.selections.restore(entities);
        Ok(())
    }

    pub fn selections(&self) -> &SelectionSet {
        &self.selections
    }

    fn step_checks(&self, index: usize) -> Vec<String> {
        let step = &self.descriptor.steps[index];
        let mut checks: Vec<Check> = step
            .fields
            .iter()
            .filter_map(|name| {
                self.descriptor
                    .fields
                    .iter()
                    .find(|field| &field.name == name)
            })
            .filter(|field| field.required)
            .map(|field| Check::Required(field.name.clone()))
            .collect();
        checks.extend(step.checks.iter().cloned());
        run_checks(&checks, &self.store, &self.selections, &self.labels)
    }

    /// Attempts forward navigation from the current step. Pure checks run
    /// first; only when they pass may the step's duplicate probe fire, in
    /// which case the wizard waits in `Checking` with navigation blocked.
    pub fn next(&mut self) -> WizardResult<Progress> {
        let step = match self.state {
            WizardState::AtStep(step) if step < self.last_step() => step,
            _ => return Err(self.illegal("next")),
        };
        let errors = self.step_checks(step);
        if !errors.is_empty() {
            return Ok(Progress::Rejected { errors });
        }
        if let Some(probe) = self.descriptor.steps[step].probe.clone() {
            let fields: Vec<(FieldName, String)> = probe
                .fields
                .iter()
                .filter_map(|name| {
                    candidate_string(self.store.get(name)).map(|value| (name.clone(), value))
                })
                .collect();
            self.probe_generation += 1;
            self.state = WizardState::Checking(step);
            return Ok(Progress::Pending {
                effects: vec![Effect::CheckDuplicates {
                    fields,
                    exclude: self.entity_id,
                    generation: self.probe_generation,
                }],
            });
        }
        self.state = WizardState::AtStep(step + 1);
        Ok(Progress::Advanced {
            step: step + 1,
            effects: Vec::new(),
        })
    }

    /// Host callback: the duplicate probe answered. A stale generation (the
    /// user edited the step meanwhile) is ignored and `None` is returned.
    pub fn check_resolved(
        &mut self,
        generation: u64,
        collisions: BTreeMap<FieldName, bool>,
    ) -> Option<Progress> {
        let step = match self.state {
            WizardState::Checking(step) if generation == self.probe_generation => step,
            _ => {
                tracing::debug!(generation, "stale duplicate check discarded");
                return None;
            }
        };
        let errors = match self.descriptor.steps[step].probe.as_ref() {
            Some(probe) => probe.messages(&collisions, &self.labels),
            None => Vec::new(),
        };
        if errors.is_empty() {
            self.state = WizardState::AtStep(step + 1);
            Some(Progress::Advanced {
                step: step + 1,
                effects: Vec::new(),
            })
        } else {
            self.state = WizardState::AtStep(step);
            Some(Progress::Rejected { errors })
        }
    }

    /// Backward navigation: unconditional, no re-validation, data preserved.
    pub fn prev(&mut self) -> WizardResult<usize> {
        match self.state {
            WizardState::AtStep(step) if step > 0 => {
                self.state = WizardState::AtStep(step - 1);
                Ok(step - 1)
            }
            _ => Err(self.illegal("prev")),
        }
    }

    /// Final confirmation from the review step. The aggregate gate runs
    /// before any network effect is issued; on success the wizard enters
    /// `Submitting`, which excludes a second concurrent submit.
    pub fn submit(&mut self) -> WizardResult<Progress> {
        match self.state {
            WizardState::AtStep(step) if step == self.last_step() => {}
            _ => return Err(self.illegal("submit")),
        }
        let errors = run_checks(
            &self.descriptor.final_checks,
            &self.store,
            &self.selections,
            &self.labels,
        );
        if !errors.is_empty() {
            return Ok(Progress::Rejected { errors });
        }
        self.last_submit_error = None;
        self.state = WizardState::Submitting;
        tracing::info!(wizard = %self.descriptor.name, "submitting");
        Ok(Progress::Pending {
            effects: vec![Effect::Submit {
                payload: self.payload(),
            }],
        })
    }

    /// Host callback: the submit endpoint answered. Failure returns to the
    /// review step with the server's message verbatim and all data intact.
    pub fn submit_resolved(&mut self, result: Result<(), String>) -> WizardResult<()> {
        if self.state != WizardState::Submitting {
            return Err(self.illegal("submit_resolved"));
        }
        match result {
            Ok(()) => {
                self.state = WizardState::Done;
                tracing::info!(wizard = %self.descriptor.name, "submit succeeded");
            }
            Err(message) => {
                tracing::warn!(wizard = %self.descriptor.name, %message, "submit failed");
                self.last_submit_error = Some(message);
                self.state = WizardState::AtStep(self.last_step());
            }
        }
        Ok(())
    }

    /// Projects the store and selection set into the whole-entity payload.
    /// Optional fields holding nothing are omitted entirely so the backend
    /// applies its own defaults; edit mode carries the entity id.
    pub fn payload(&self) -> Json {
        let mut map = Map::new();
        if let Some(id) = self.entity_id {
            map.insert("id".into(), Json::from(id.0));
        }
        for field in &self.descriptor.fields {
            let value = self.store.get(&field.name);
            if !field.required && value.is_empty() {
                continue;
            }
            if let Some(json) = value.to_json() {
                map.insert(field.name.clone(), json);
            }
        }
        if let Some(key) = &self.descriptor.selection_key {
            map.insert(
                key.clone(),
                Json::Array(
                    self.selections
                        .ids()
                        .into_iter()
                        .map(|id| Json::from(id.0))
                        .collect(),
                ),
            );
        }
        Json::Object(map)
    }

    /// Rows for the review step: every editable field in step order, with a
    /// before/after classification in edit mode.
    pub fn review(&self) -> Vec<ReviewRow> {
        let diffs = self.diff();
        self.descriptor
            .steps
            .iter()
            .flat_map(|step| step.fields.iter())
            .filter_map(|name| {
                self.descriptor
                    .fields
                    .iter()
                    .find(|field| &field.name == name)
            })
            .map(|field| ReviewRow {
                name: field.name.clone(),
                label: field.label.clone(),
                value: self.store.get(&field.name).clone(),
                diff: diffs
                    .as_ref()
                    .and_then(|report| report.get(&field.name).cloned()),
            })
            .collect()
    }

    /// Edit-mode field diff against the original snapshot; `None` in create
    /// mode.
    pub fn diff(&self) -> Option<BTreeMap<FieldName, FieldDiff>> {
        self.original
            .as_ref()
            .map(|original| diff_fields(original, &self.store))
    }

    pub fn selection_diff(&self) -> Option<SelectionDiff> {
        self.original
            .as_ref()
            .map(|original| diff_selections(original, &self.selections))
    }

    /// Registers a file uploaded through the temporary store while the
    /// wizard is open.
    pub fn record_upload(&mut self, id: StorageId) {
        self.attachments.record(id);
    }

    pub fn forget_upload(&mut self, id: &StorageId) {
        self.attachments.forget(id);
    }

    pub fn attachments(&self) -> &AttachmentSet {
        &self.attachments
    }

    /// Abandons the wizard. Returns the storage ids the host should delete:
    /// only uploads in the temporary namespace, never permanent files. Any
    /// response arriving after this point carries a dead generation and is
    /// ignored.
    pub fn cancel(mut self) -> Vec<StorageId> {
        tracing::debug!(wizard = %self.descriptor.name, "wizard cancelled");
        self.attachments.take_temporary()
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn current_step(&self) -> Option<usize> {
        match self.state {
            WizardState::AtStep(step) | WizardState::Checking(step) => Some(step),
            _ => None,
        }
    }

    pub fn step_id(&self, index: usize) -> Option<&str> {
        self.descriptor.steps.get(index).map(|step| step.id.as_str())
    }

    pub fn is_edit_mode(&self) -> bool {
        self.original.is_some()
    }

    pub fn last_submit_error(&self) -> Option<&str> {
        self.last_submit_error.as_deref()
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }
}

/// Renders a field value the way the duplicate checker expects candidates.
fn candidate_string(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        FieldValue::Number(n) => Some(n.to_string()),
        FieldValue::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::FieldKind;

    fn minimal() -> WizardDescriptor {
        WizardDescriptor::new("minimal")
            .with_field(FieldDescriptor::new("name", "Name", FieldKind::Text))
            .with_step(StepDescriptor::new("details").with_field("name"))
            .with_step(StepDescriptor::new("review"))
    }

    #[test]
    fn descriptor_requires_a_bare_review_step() {
        let descriptor = WizardDescriptor::new("broken")
            .with_field(FieldDescriptor::new("name", "Name", FieldKind::Text))
            .with_step(StepDescriptor::new("only").with_field("name"));
        let err = WizardController::new(descriptor, EngineConfig::default()).unwrap_err();
        assert!(matches!(err, WizardError::InvalidDescriptor(_)));
    }

    #[test]
    fn descriptor_rejects_undeclared_step_fields() {
        let descriptor = WizardDescriptor::new("broken")
            .with_field(FieldDescriptor::new("name", "Name", FieldKind::Text))
            .with_step(StepDescriptor::new("details").with_field("missing"))
            .with_step(StepDescriptor::new("review"));
        let err = WizardController::new(descriptor, EngineConfig::default()).unwrap_err();
        assert!(matches!(err, WizardError::InvalidDescriptor(_)));
    }

    #[test]
    fn prev_from_first_step_is_illegal() {
        let mut wizard = WizardController::new(minimal(), EngineConfig::default()).unwrap();
        assert!(matches!(
            wizard.prev(),
            Err(WizardError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn next_past_review_step_is_illegal() {
        let mut wizard = WizardController::new(minimal(), EngineConfig::default()).unwrap();
        wizard.set_field("name", FieldValue::text("x")).unwrap();
        assert!(matches!(
            wizard.next().unwrap(),
            Progress::Advanced { step: 1, .. }
        ));
        assert!(matches!(
            wizard.next(),
            Err(WizardError::IllegalTransition { .. })
        ));
    }
}
