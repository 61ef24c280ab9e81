use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::domain::common::{Displayable, EntityId, Identifiable};

/// One selectable option produced by a cascade load.
///
/// Choices are ephemeral: they describe the most recent load for the current
/// source value and are discarded whenever the source changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    pub id: EntityId,
    pub label: String,
    /// Arbitrary display metadata (status, counts) forwarded untouched.
    #[serde(default, skip_serializing_if = "Json::is_null")]
    pub meta: Json,
}

impl Choice {
    pub fn new(id: impl Into<EntityId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            meta: Json::Null,
        }
    }

    pub fn with_meta(mut self, meta: Json) -> Self {
        self.meta = meta;
        self
    }
}

impl Identifiable for Choice {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Displayable for Choice {
    fn display_label(&self) -> String {
        self.label.clone()
    }
}
