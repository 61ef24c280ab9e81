pub mod choice;
pub mod common;
pub mod field;
pub mod snapshot;

pub use choice::Choice;
pub use common::{Displayable, EntityId, Identifiable};
pub use field::{FieldDescriptor, FieldKind, FieldName, FieldValue};
pub use snapshot::{EntitySnapshot, SelectedEntity};
