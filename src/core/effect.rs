use serde_json::Value as Json;

use crate::domain::common::EntityId;
use crate::domain::field::{FieldName, FieldValue};

/// Network work requested by the engine and executed by the host.
///
/// Every effect that expects an answer carries a generation number; the host
/// echoes it back with the response so the engine can discard results that a
/// later request has superseded.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch the option list for `field`, filtered by the current value of
    /// its cascade source. Answered via `options_loaded` / `options_failed`.
    LoadOptions {
        field: FieldName,
        source: FieldValue,
        generation: u64,
    },
    /// Ask the backend which of the candidate values collide with existing
    /// records. `exclude` names the entity being edited so a record cannot
    /// collide with itself. Answered via `check_resolved`.
    CheckDuplicates {
        fields: Vec<(FieldName, String)>,
        exclude: Option<EntityId>,
        generation: u64,
    },
    /// Send the assembled payload to the create/update endpoint. Answered
    /// via `submit_resolved`.
    Submit { payload: Json },
}

impl Effect {
    /// Convenience for tests and hosts routing effects by kind.
    pub fn is_load_for(&self, name: &str) -> bool {
        matches!(self, Effect::LoadOptions { field, .. } if field == name)
    }
}
