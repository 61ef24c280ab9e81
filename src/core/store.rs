use std::collections::BTreeMap;

use crate::config::UnknownFieldPolicy;
use crate::domain::field::{FieldDescriptor, FieldName, FieldValue};
use crate::errors::{WizardError, WizardResult};

/// Outcome of a write to the field store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Changed,
    Unchanged,
}

/// The form's current values: a flat map from field name to value.
///
/// Every field any step or cascade edge refers to is seeded at construction,
/// defaulted to `Unset`, so reads never have to distinguish "missing" from
/// "not yet filled in".
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStore {
    values: BTreeMap<FieldName, FieldValue>,
    policy: UnknownFieldPolicy,
}

const UNSET: FieldValue = FieldValue::Unset;

impl FieldStore {
    pub fn from_descriptors(descriptors: &[FieldDescriptor], policy: UnknownFieldPolicy) -> Self {
        let values = descriptors
            .iter()
            .map(|descriptor| (descriptor.name.clone(), FieldValue::Unset))
            .collect();
        Self { values, policy }
    }

    /// Reads a field's current value. An undeclared name yields `Unset` and a
    /// log entry; declaring the field is the caller's responsibility.
    pub fn get(&self, name: &str) -> &FieldValue {
        match self.values.get(name) {
            Some(value) => value,
            None => {
                tracing::warn!(field = name, "read of undeclared field");
                debug_assert!(false, "read of undeclared field `{name}`");
                &UNSET
            }
        }
    }

    /// Writes a field. Writing the value the field already holds is a no-op
    /// and reports `Unchanged`, so cascades are not re-triggered for free.
    pub fn set(&mut self, name: &str, value: FieldValue) -> WizardResult<Mutation> {
        match self.values.get_mut(name) {
            Some(slot) => {
                if *slot == value {
                    Ok(Mutation::Unchanged)
                } else {
                    *slot = value;
                    Ok(Mutation::Changed)
                }
            }
            None => match self.policy {
                UnknownFieldPolicy::Strict => Err(WizardError::UnknownField(name.to_string())),
                UnknownFieldPolicy::Lenient => {
                    tracing::warn!(field = name, "write to undeclared field ignored");
                    Ok(Mutation::Unchanged)
                }
            },
        }
    }

    /// Clears a declared field back to `Unset`.
    pub fn clear(&mut self, name: &str) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = FieldValue::Unset;
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &FieldValue)> {
        self.values.iter()
    }

    /// Immutable view of the values, used when taking the original snapshot.
    pub fn values(&self) -> &BTreeMap<FieldName, FieldValue> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::field::FieldKind;

    fn store() -> FieldStore {
        FieldStore::from_descriptors(
            &[
                FieldDescriptor::new("name", "Name", FieldKind::Text),
                FieldDescriptor::new("electionId", "Election", FieldKind::Reference),
            ],
            UnknownFieldPolicy::Strict,
        )
    }

    #[test]
    fn declared_fields_default_to_unset() {
        let store = store();
        assert_eq!(store.get("name"), &FieldValue::Unset);
        assert_eq!(store.get("electionId"), &FieldValue::Unset);
    }

    #[test]
    fn same_value_write_is_a_no_op() {
        let mut store = store();
        assert_eq!(
            store.set("name", FieldValue::text("alice")).unwrap(),
            Mutation::Changed
        );
        assert_eq!(
            store.set("name", FieldValue::text("alice")).unwrap(),
            Mutation::Unchanged
        );
    }

    #[test]
    fn strict_policy_rejects_unknown_writes() {
        let mut store = store();
        let err = store.set("nope", FieldValue::Flag(true)).unwrap_err();
        assert!(matches!(err, WizardError::UnknownField(name) if name == "nope"));
    }

    #[test]
    fn lenient_policy_ignores_unknown_writes() {
        let mut store = FieldStore::from_descriptors(
            &[FieldDescriptor::new("name", "Name", FieldKind::Text)],
            UnknownFieldPolicy::Lenient,
        );
        assert_eq!(
            store.set("nope", FieldValue::Flag(true)).unwrap(),
            Mutation::Unchanged
        );
    }
}
