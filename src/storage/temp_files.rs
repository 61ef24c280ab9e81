use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{WizardError, WizardResult};

const STORAGE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_LEN: usize = 14;
const TOKEN_LEN: usize = 8;

/// Which storage area a file lives in.
///
/// The tag is explicit rather than re-derived from the id string: the wire
/// format for temporary ids happens to start with a numeric date prefix, but
/// a permanent filename could coincidentally match that pattern, so the
/// classification is made once at ingestion and then carried along.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Namespace {
    /// Uploads not yet attached to a persisted entity. Safe for the wizard
    /// to delete on cancel.
    Temporary,
    /// Files owned by a saved entity. Never deleted by the wizard.
    Permanent,
}

/// Identifier handed out by the temporary file store.
///
/// Generated temporary ids encode creation timestamp, a uniqueness token,
/// and the original filename (`YYYYMMDDhhmmss_token_name.ext`), which lets
/// the wizard show a human-readable name without another lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageId {
    namespace: Namespace,
    raw: String,
    display: String,
}

impl StorageId {
    /// Mints a fresh temporary id for an upload.
    pub fn generate(filename: &str, now: DateTime<Utc>) -> WizardResult<Self> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(WizardError::MalformedStorageId(
                "filename must not be empty".into(),
            ));
        }
        let token = Uuid::new_v4().simple().to_string();
        let raw = format!(
            "{}_{}_{}",
            now.format(STORAGE_TIMESTAMP_FORMAT),
            &token[..TOKEN_LEN],
            filename
        );
        Ok(Self {
            namespace: Namespace::Temporary,
            raw,
            display: filename.to_string(),
        })
    }

    /// Classifies an id received over the wire by its shape: a fixed-length
    /// numeric-date prefix marks the temporary namespace. This pattern match
    /// happens only here; afterwards the explicit tag is authoritative.
    pub fn from_wire(raw: &str) -> Self {
        match split_temporary(raw) {
            Some(display) => Self {
                namespace: Namespace::Temporary,
                raw: raw.to_string(),
                display: display.to_string(),
            },
            None => Self {
                namespace: Namespace::Permanent,
                raw: raw.to_string(),
                display: raw.to_string(),
            },
        }
    }

    /// Ingests an id whose namespace the caller already knows, overriding
    /// the shape heuristic. The escape hatch for permanent filenames that
    /// happen to look date-prefixed.
    pub fn from_wire_in(raw: &str, namespace: Namespace) -> Self {
        let mut id = Self::from_wire(raw);
        if id.namespace != namespace {
            id.display = match namespace {
                Namespace::Permanent => raw.to_string(),
                Namespace::Temporary => split_temporary(raw).unwrap_or(raw).to_string(),
            };
            id.namespace = namespace;
        }
        id
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn is_temporary(&self) -> bool {
        self.namespace == Namespace::Temporary
    }

    /// The original filename for display.
    pub fn display_name(&self) -> &str {
        &self.display
    }

    /// The id as the backend knows it.
    pub fn as_wire(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Returns the embedded filename when `raw` has the temporary-id shape:
/// 14 digits, `_`, token, `_`, filename.
fn split_temporary(raw: &str) -> Option<&str> {
    let prefix = raw.get(..TIMESTAMP_LEN)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let rest = raw.get(TIMESTAMP_LEN..)?.strip_prefix('_')?;
    let (token, name) = rest.split_once('_')?;
    if token.is_empty() || name.is_empty() {
        return None;
    }
    Some(name)
}

/// Uploads made while a wizard is open.
///
/// On cancel the set yields exactly the temporary-namespace ids, so cleanup
/// can never touch a permanent file.
#[derive(Debug, Clone, Default)]
pub struct AttachmentSet {
    entries: Vec<StorageId>,
}

impl AttachmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: StorageId) {
        if !self.entries.iter().any(|entry| entry.raw == id.raw) {
            self.entries.push(id);
        }
    }

    /// Drops an id from tracking, e.g. after the user removed the attachment
    /// and the host already deleted the file.
    pub fn forget(&mut self, id: &StorageId) {
        self.entries.retain(|entry| entry.raw != id.raw);
    }

    pub fn iter(&self) -> impl Iterator<Item = &StorageId> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns every temporary id; permanent ids stay tracked
    /// but are never handed out for deletion.
    pub fn take_temporary(&mut self) -> Vec<StorageId> {
        let (temporary, permanent): (Vec<_>, Vec<_>) = self
            .entries
            .drain(..)
            .partition(|entry| entry.is_temporary());
        self.entries = permanent;
        temporary
    }
}
