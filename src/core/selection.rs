use serde::{Deserialize, Serialize};

use crate::domain::common::EntityId;
use crate::domain::snapshot::SelectedEntity;

/// Keyed collection with toggle-membership semantics, used wherever the user
/// picks zero-or-more related entities (e.g. elections assigned to a staff
/// member).
///
/// Keys are unique by entity id. Insertion order is preserved for display
/// but carries no semantic weight.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SelectionSet {
    entries: Vec<SelectedEntity>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&SelectedEntity> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedEntity> {
        self.entries.iter()
    }

    /// Adds the entity when absent, removes it (by id) when present.
    /// Returns `true` when the toggle added it. The full snapshot passed in
    /// is stored, so later display needs no re-fetch.
    pub fn toggle(&mut self, entity: SelectedEntity) -> bool {
        if self.remove(entity.id).is_some() {
            false
        } else {
            self.entries.push(entity);
            true
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<SelectedEntity> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces the membership wholesale. Backs an explicit "reset" action
    /// in edit mode; duplicate ids keep their first occurrence.
    pub fn restore(&mut self, entities: Vec<SelectedEntity>) {
        self.entries.clear();
        for entity in entities {
            if !self.contains(entity.id) {
                self.entries.push(entity);
            }
        }
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entries.iter().map(|entry| entry.id).collect()
    }
}
