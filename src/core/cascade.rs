use std::collections::BTreeMap;

use crate::core::effect::Effect;
use crate::core::store::FieldStore;
use crate::domain::choice::Choice;
use crate::domain::field::{FieldName, FieldValue};
use crate::errors::{WizardError, WizardResult};

/// A declared dependency: the value of `source` determines the option list
/// of `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeEdge {
    pub source: FieldName,
    pub target: FieldName,
}

impl CascadeEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Lifecycle of a cascade target's option list.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionState {
    /// No options: the source is empty or the list was cleared.
    Empty,
    /// A load is in flight; the field is disabled for input.
    Loading,
    Ready(Vec<Choice>),
    /// The most recent load failed; retryable without touching other fields.
    Failed { message: String },
}

/// Recomputes downstream option lists when an upstream field changes.
///
/// Clearing is synchronous and depth-first over the edge DAG; loads are
/// issued as [`Effect::LoadOptions`] and answered later. Each target carries
/// a request generation so only the response to the most recently issued
/// load is ever applied (last-request-wins).
#[derive(Debug, Clone)]
pub struct CascadeResolver {
    edges: Vec<CascadeEdge>,
    states: BTreeMap<FieldName, OptionState>,
    generations: BTreeMap<FieldName, u64>,
}

impl CascadeResolver {
    /// Builds the resolver, rejecting edge sets with a cycle.
    pub fn new(edges: Vec<CascadeEdge>) -> WizardResult<Self> {
        let resolver = Self {
            states: edges
                .iter()
                .map(|edge| (edge.target.clone(), OptionState::Empty))
                .collect(),
            generations: edges.iter().map(|edge| (edge.target.clone(), 0)).collect(),
            edges,
        };
        resolver.ensure_acyclic()?;
        Ok(resolver)
    }

    fn ensure_acyclic(&self) -> WizardResult<()> {
        for edge in &self.edges {
            let mut visited = Vec::new();
            if self.reaches(&edge.target, &edge.source, &mut visited) {
                return Err(WizardError::CyclicCascade(edge.source.clone()));
            }
        }
        Ok(())
    }

    fn reaches<'a>(&'a self, from: &'a str, needle: &str, visited: &mut Vec<&'a str>) -> bool {
        if from == needle {
            return true;
        }
        if visited.contains(&from) {
            return false;
        }
        visited.push(from);
        self.edges
            .iter()
            .filter(|edge| edge.source == from)
            .any(|edge| self.reaches(&edge.target, needle, visited))
    }

    pub fn is_source(&self, field: &str) -> bool {
        self.edges.iter().any(|edge| edge.source == field)
    }

    pub fn is_target(&self, field: &str) -> bool {
        self.states.contains_key(field)
    }

    fn source_of(&self, target: &str) -> Option<&FieldName> {
        self.edges
            .iter()
            .find(|edge| edge.target == target)
            .map(|edge| &edge.source)
    }

    fn targets_of(&self, source: &str) -> Vec<FieldName> {
        self.edges
            .iter()
            .filter(|edge| edge.source == source)
            .map(|edge| edge.target.clone())
            .collect()
    }

    /// Current option state for a cascade target; `None` for non-targets.
    pub fn options(&self, field: &str) -> Option<&OptionState> {
        self.states.get(field)
    }

    fn generation(&self, field: &str) -> u64 {
        self.generations.get(field).copied().unwrap_or(0)
    }

    fn bump(&mut self, field: &str) -> u64 {
        let slot = self.generations.entry(field.to_string()).or_insert(0);
        *slot += 1;
        *slot
    }

    /// True while a target cannot accept input: its load is pending or its
    /// source holds nothing to filter by.
    pub fn is_disabled(&self, field: &str, store: &FieldStore) -> bool {
        match self.states.get(field) {
            Some(OptionState::Loading) | Some(OptionState::Failed { .. }) => true,
            Some(_) => self
                .source_of(field)
                .map(|source| store.get(source).is_empty())
                .unwrap_or(false),
            None => false,
        }
    }

    /// Reacts to a user change of `source`: clears the entire downstream
    /// chain in one synchronous pass, then issues fresh loads for the direct
    /// targets if the new value is non-empty.
    pub fn on_source_changed(&mut self, source: &str, store: &mut FieldStore) -> Vec<Effect> {
        self.clear_downstream(source, store);
        let new_value = store.get(source).clone();
        if new_value.is_empty() {
            return Vec::new();
        }
        self.targets_of(source)
            .into_iter()
            .map(|target| self.issue_load(&target, new_value.clone()))
            .collect()
    }

    /// Depth-first clearing: every transitive dependent loses its value and
    /// its option list, and its generation is bumped so in-flight responses
    /// for the old source value are orphaned.
    fn clear_downstream(&mut self, source: &str, store: &mut FieldStore) {
        for target in self.targets_of(source) {
            store.clear(&target);
            self.states.insert(target.clone(), OptionState::Empty);
            self.bump(&target);
            tracing::debug!(field = %target, "cascade cleared");
            self.clear_downstream(&target, store);
        }
    }

    fn issue_load(&mut self, target: &str, source_value: FieldValue) -> Effect {
        let generation = self.bump(target);
        self.states
            .insert(target.to_string(), OptionState::Loading);
        tracing::debug!(field = target, generation, "option load issued");
        Effect::LoadOptions {
            field: target.to_string(),
            source: source_value,
            generation,
        }
    }

    /// Applies a successful load. Responses carrying a superseded generation
    /// are discarded silently; a slow response for an old source value can
    /// never overwrite the list belonging to the current one.
    ///
    /// If the target still holds a value (edit-mode hydration keeps values
    /// across priming loads) that the fresh options no longer contain, the
    /// target and its whole downstream chain are cleared.
    pub fn apply_options(
        &mut self,
        field: &str,
        generation: u64,
        choices: Vec<Choice>,
        store: &mut FieldStore,
    ) -> Vec<Effect> {
        if generation != self.generation(field) {
            tracing::debug!(field, generation, "stale option load discarded");
            return Vec::new();
        }
        let current = store.get(field).clone();
        let mut effects = Vec::new();
        if !current.is_empty() {
            let still_listed = current
                .as_id()
                .map(|id| choices.iter().any(|choice| choice.id == id))
                .unwrap_or(false);
            if !still_listed {
                store.clear(field);
                effects = self.on_source_changed(field, store);
            }
        }
        self.states.insert(field.to_string(), OptionState::Ready(choices));
        effects
    }

    /// Applies a failed load: the option list empties out, the target stays
    /// disabled, and the failure is kept for a retry affordance. Sibling
    /// fields are untouched.
    pub fn apply_failure(&mut self, field: &str, generation: u64, message: impl Into<String>) {
        if generation != self.generation(field) {
            tracing::debug!(field, generation, "stale option failure discarded");
            return;
        }
        let message = message.into();
        tracing::warn!(field, %message, "option load failed");
        self.states
            .insert(field.to_string(), OptionState::Failed { message });
    }

    /// Re-issues the load for a target whose last load failed, against the
    /// source's current value. Returns `None` when there is nothing to load.
    pub fn retry(&mut self, field: &str, store: &FieldStore) -> Option<Effect> {
        let source = self.source_of(field)?.clone();
        let value = store.get(&source).clone();
        if value.is_empty() {
            return None;
        }
        Some(self.issue_load(field, value))
    }

    /// Issues loads for every target whose source already holds a value,
    /// without clearing anything. Used once after edit-mode hydration, so
    /// restored selections survive until fresh options prove them invalid.
    pub fn prime(&mut self, store: &FieldStore) -> Vec<Effect> {
        let pending: Vec<(FieldName, FieldValue)> = self
            .edges
            .iter()
            .filter(|edge| !store.get(&edge.source).is_empty())
            .map(|edge| (edge.target.clone(), store.get(&edge.source).clone()))
            .collect();
        pending
            .into_iter()
            .map(|(target, value)| self.issue_load(&target, value))
            .collect()
    }
}
