use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::domain::common::EntityId;

/// Name of a form field inside one wizard instance.
pub type FieldName = String;

/// Value held by a single form field.
///
/// `Unset` (the field was never filled in, or was cleared by a cascade) is
/// distinct from a present-but-empty value such as `Text("")`; payload
/// assembly omits the former while the latter is sent as entered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FieldValue {
    Unset,
    Text(String),
    Number(f64),
    Flag(bool),
    Date(NaiveDate),
    Ids(Vec<EntityId>),
}

impl FieldValue {
    /// True when the value should count as "nothing selected" for cascade
    /// clearing and required-field checks.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Unset => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Ids(ids) => ids.is_empty(),
            _ => false,
        }
    }

    pub fn as_id(&self) -> Option<EntityId> {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 => Some(EntityId(*n as i64)),
            FieldValue::Ids(ids) if ids.len() == 1 => Some(ids[0]),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Projects the value into JSON for the submit payload. `Unset` has no
    /// JSON rendering; callers decide whether to omit or null it.
    pub fn to_json(&self) -> Option<Json> {
        match self {
            FieldValue::Unset => None,
            FieldValue::Text(text) => Some(Json::String(text.clone())),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n).map(Json::Number),
            FieldValue::Flag(flag) => Some(Json::Bool(*flag)),
            FieldValue::Date(date) => Some(Json::String(date.format("%Y-%m-%d").to_string())),
            FieldValue::Ids(ids) => Some(Json::Array(
                ids.iter().map(|id| Json::from(id.0)).collect(),
            )),
        }
    }

    pub fn id(id: impl Into<EntityId>) -> Self {
        FieldValue::Ids(vec![id.into()])
    }

    pub fn text(text: impl Into<String>) -> Self {
        FieldValue::Text(text.into())
    }
}

/// Supported data kinds for wizard fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Flag,
    Date,
    Reference,
    ReferenceList,
}

/// Declarative description of a single wizard field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: FieldName,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_is_distinct_from_blank_text() {
        assert!(FieldValue::Unset.is_empty());
        assert!(FieldValue::Text("  ".into()).is_empty());
        assert_ne!(FieldValue::Unset, FieldValue::Text(String::new()));
        assert_eq!(FieldValue::Unset.to_json(), None);
        assert_eq!(
            FieldValue::Text(String::new()).to_json(),
            Some(serde_json::Value::String(String::new()))
        );
    }

    #[test]
    fn single_reference_projects_as_id() {
        assert_eq!(FieldValue::id(7).as_id(), Some(EntityId(7)));
        assert_eq!(FieldValue::Ids(vec![]).as_id(), None);
    }
}
