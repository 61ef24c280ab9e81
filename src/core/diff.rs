use std::collections::BTreeMap;

use crate::core::selection::SelectionSet;
use crate::core::store::FieldStore;
use crate::domain::common::EntityId;
use crate::domain::field::{FieldName, FieldValue};

/// Deep, immutable copy of the wizard's state taken once when edit-mode
/// hydration completes. Used only for diffing; never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalSnapshot {
    fields: BTreeMap<FieldName, FieldValue>,
    selections: SelectionSet,
}

impl OriginalSnapshot {
    pub fn capture(store: &FieldStore, selections: &SelectionSet) -> Self {
        Self {
            fields: store.values().clone(),
            selections: selections.clone(),
        }
    }

    pub fn field(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&FieldValue::Unset)
    }

    pub fn selections(&self) -> &SelectionSet {
        &self.selections
    }
}

/// Per-field changed/unchanged classification for the review step.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiff {
    pub changed: bool,
    pub from: FieldValue,
    pub to: FieldValue,
}

/// Membership changes in the multi-select set, by entity id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDiff {
    pub added: Vec<EntityId>,
    pub removed: Vec<EntityId>,
}

impl SelectionDiff {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Classifies every field of the current store against the original
/// snapshot. Purely informative for the human reviewer: submission always
/// sends the full current payload, never a patch.
pub fn diff_fields(
    original: &OriginalSnapshot,
    current: &FieldStore,
) -> BTreeMap<FieldName, FieldDiff> {
    current
        .iter()
        .map(|(name, value)| {
            let from = original.field(name).clone();
            (
                name.clone(),
                FieldDiff {
                    changed: from != *value,
                    from,
                    to: value.clone(),
                },
            )
        })
        .collect()
}

pub fn diff_selections(original: &OriginalSnapshot, current: &SelectionSet) -> SelectionDiff {
    let before = original.selections();
    SelectionDiff {
        added: current
            .ids()
            .into_iter()
            .filter(|id| !before.contains(*id))
            .collect(),
        removed: before
            .ids()
            .into_iter()
            .filter(|id| !current.contains(*id))
            .collect(),
    }
}
