pub mod cascade;
pub mod diff;
pub mod effect;
pub mod selection;
pub mod store;
pub mod validation;
pub mod wizard;

pub use cascade::{CascadeEdge, CascadeResolver, OptionState};
pub use diff::{FieldDiff, OriginalSnapshot, SelectionDiff};
pub use effect::Effect;
pub use selection::SelectionSet;
pub use store::{FieldStore, Mutation};
pub use validation::{run_checks, Check, ProbeDescriptor};
pub use wizard::{
    Progress, ReviewRow, StepDescriptor, WizardController, WizardDescriptor, WizardState,
};
