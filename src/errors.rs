use thiserror::Error;

/// Error type for contract misuse of the wizard engine.
///
/// Recoverable, user-facing conditions (failed checks, load failures, submit
/// rejections) are ordinary values on the controller API, never errors; this
/// enum covers programming mistakes in wiring a wizard together.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Unknown field: `{0}`")]
    UnknownField(String),
    #[error("Cascade edges form a cycle through `{0}`")]
    CyclicCascade(String),
    #[error("Invalid wizard descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("Illegal transition: {action} while {state}")]
    IllegalTransition { state: String, action: String },
    #[error("Malformed storage id: {0}")]
    MalformedStorageId(String),
}

pub type WizardResult<T> = Result<T, WizardError>;
