use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::selection::SelectionSet;
use crate::core::store::FieldStore;
use crate::domain::field::FieldName;

type CheckCallback = dyn Fn(&FieldStore, &SelectionSet) -> Result<(), String> + Send + Sync;

/// Pure, local validation rule attached to a wizard step (or to the final
/// aggregate gate). Checks never touch the network; all failures of a step
/// are collected together rather than surfaced one at a time.
#[derive(Clone)]
pub enum Check {
    /// The named field must hold a non-empty value.
    Required(FieldName),
    /// Both dates present implies `start` strictly before `end`.
    DateOrder { start: FieldName, end: FieldName },
    /// The multi-select set must hold at least this many entries.
    MinSelections(usize),
    Custom(Arc<CheckCallback>),
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Required(field) => write!(f, "Required({field})"),
            Check::DateOrder { start, end } => write!(f, "DateOrder({start} < {end})"),
            Check::MinSelections(n) => write!(f, "MinSelections({n})"),
            Check::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl Check {
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&FieldStore, &SelectionSet) -> Result<(), String> + Send + Sync + 'static,
    {
        Check::Custom(Arc::new(check))
    }

    fn evaluate(
        &self,
        store: &FieldStore,
        selections: &SelectionSet,
        labels: &BTreeMap<FieldName, String>,
    ) -> Option<String> {
        let label = |field: &str| {
            labels
                .get(field)
                .cloned()
                .unwrap_or_else(|| field.to_string())
        };
        match self {
            Check::Required(field) => store
                .get(field)
                .is_empty()
                .then(|| format!("{} is required", label(field))),
            Check::DateOrder { start, end } => {
                match (store.get(start).as_date(), store.get(end).as_date()) {
                    (Some(from), Some(to)) if from >= to => Some(format!(
                        "{} must be before {}",
                        label(start),
                        label(end)
                    )),
                    _ => None,
                }
            }
            Check::MinSelections(min) => (selections.len() < *min).then(|| {
                if *min == 1 {
                    "Select at least one entry".to_string()
                } else {
                    format!("Select at least {min} entries")
                }
            }),
            Check::Custom(callback) => callback(store, selections).err(),
        }
    }
}

/// Runs every check and collects all failure messages.
pub fn run_checks(
    checks: &[Check],
    store: &FieldStore,
    selections: &SelectionSet,
    labels: &BTreeMap<FieldName, String>,
) -> Vec<String> {
    checks
        .iter()
        .filter_map(|check| check.evaluate(store, selections, labels))
        .collect()
}

/// Server-side duplicate lookup attached to a step.
///
/// The probe only fires after the step's pure checks pass; the controller
/// emits [`crate::core::effect::Effect::CheckDuplicates`] with the current
/// values of these fields and blocks forward navigation until the answer
/// arrives. Each colliding field yields one message; all are surfaced
/// together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeDescriptor {
    pub fields: Vec<FieldName>,
}

impl ProbeDescriptor {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Turns the backend's per-field collision map into user-facing
    /// messages, in the probe's declared field order.
    pub fn messages(
        &self,
        collisions: &BTreeMap<FieldName, bool>,
        labels: &BTreeMap<FieldName, String>,
    ) -> Vec<String> {
        self.fields
            .iter()
            .filter(|field| collisions.get(*field).copied().unwrap_or(false))
            .map(|field| {
                let label = labels
                    .get(field)
                    .cloned()
                    .unwrap_or_else(|| field.to_string());
                format!("{label} is already in use")
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownFieldPolicy;
    use crate::domain::field::{FieldDescriptor, FieldKind, FieldValue};
    use chrono::NaiveDate;

    fn fixture() -> (FieldStore, SelectionSet, BTreeMap<FieldName, String>) {
        let descriptors = vec![
            FieldDescriptor::new("name", "Name", FieldKind::Text),
            FieldDescriptor::new("startDate", "Start date", FieldKind::Date),
            FieldDescriptor::new("endDate", "End date", FieldKind::Date),
        ];
        let labels = descriptors
            .iter()
            .map(|d| (d.name.clone(), d.label.clone()))
            .collect();
        (
            FieldStore::from_descriptors(&descriptors, UnknownFieldPolicy::Strict),
            SelectionSet::new(),
            labels,
        )
    }

    fn date(y: i32, m: u32, d: u32) -> FieldValue {
        FieldValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn all_failures_are_collected_together() {
        let (mut store, selections, labels) = fixture();
        store.set("startDate", date(2026, 3, 10)).unwrap();
        store.set("endDate", date(2026, 3, 10)).unwrap();
        let checks = vec![
            Check::Required("name".into()),
            Check::DateOrder {
                start: "startDate".into(),
                end: "endDate".into(),
            },
        ];
        let errors = run_checks(&checks, &store, &selections, &labels);
        assert_eq!(
            errors,
            vec![
                "Name is required".to_string(),
                "Start date must be before End date".to_string(),
            ]
        );
    }

    #[test]
    fn date_order_accepts_strictly_increasing_range() {
        let (mut store, selections, labels) = fixture();
        store.set("startDate", date(2026, 3, 1)).unwrap();
        store.set("endDate", date(2026, 3, 2)).unwrap();
        let checks = vec![Check::DateOrder {
            start: "startDate".into(),
            end: "endDate".into(),
        }];
        assert!(run_checks(&checks, &store, &selections, &labels).is_empty());
    }

    #[test]
    fn probe_messages_follow_declared_order() {
        let probe = ProbeDescriptor::new(["username", "email"]);
        let mut collisions = BTreeMap::new();
        collisions.insert("email".to_string(), true);
        collisions.insert("username".to_string(), true);
        let labels = BTreeMap::from([
            ("username".to_string(), "Username".to_string()),
            ("email".to_string(), "Email".to_string()),
        ]);
        assert_eq!(
            probe.messages(&collisions, &labels),
            vec![
                "Username is already in use".to_string(),
                "Email is already in use".to_string(),
            ]
        );
    }
}
