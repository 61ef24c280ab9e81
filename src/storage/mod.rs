pub mod temp_files;

pub use temp_files::{AttachmentSet, Namespace, StorageId};
