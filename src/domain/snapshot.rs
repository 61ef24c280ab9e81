use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::domain::common::{Displayable, EntityId, Identifiable};
use crate::domain::field::{FieldName, FieldValue};

/// Full snapshot of one entity picked into a multi-select set.
///
/// The whole record travels with the selection so detail columns render
/// without a re-fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedEntity {
    pub id: EntityId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Json::is_null")]
    pub data: Json,
}

impl SelectedEntity {
    pub fn new(id: impl Into<EntityId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data: Json::Null,
        }
    }

    pub fn with_data(mut self, data: Json) -> Self {
        self.data = data;
        self
    }
}

impl Identifiable for SelectedEntity {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Displayable for SelectedEntity {
    fn display_label(&self) -> String {
        self.label.clone()
    }
}

/// Edit-mode bootstrap payload: the persisted entity, already normalized to
/// canonical field names and ids by the fetch adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub fields: BTreeMap<FieldName, FieldValue>,
    #[serde(default)]
    pub selections: Vec<SelectedEntity>,
}

impl EntitySnapshot {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
            selections: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn with_selection(mut self, entity: SelectedEntity) -> Self {
        self.selections.push(entity);
        self
    }
}
