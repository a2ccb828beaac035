use thiserror::Error;

/// Session credential errors.
///
/// Verification failures are collapsed into a single `Invalid` variant:
/// callers learn that a credential did not verify, never why.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Invalid session credential")]
    Invalid,

    #[error("Credential signing failed: {0}")]
    SigningFailed(String),
}
