use serde::{Deserialize, Serialize};

/// Engine-wide behavior switches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// How the field store reacts to a read or write of an undeclared field.
    pub unknown_fields: UnknownFieldPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Strict,
        }
    }
}

/// Undeclared field names are a programming error; the policy decides whether
/// they fail fast (development) or degrade to a logged no-op (production).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    Strict,
    Lenient,
}

impl EngineConfig {
    pub fn lenient() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Lenient,
        }
    }
}
