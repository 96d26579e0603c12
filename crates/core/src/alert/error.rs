use thiserror::Error;

/// # Summary
/// Contract violations raised by the alert core.
///
/// # Invariants
/// - Filter rejections and suppressions are *not* errors; they are `Decision`s.
/// - Every variant signals a caller bug and leaves engine state untouched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AlertError {
    /// Commit without an outstanding approved evaluation for the key
    #[error("No approved evaluation pending for {0}")]
    NotEvaluated(String),

    /// Priority text outside {HIGH, MEDIUM, LOW}
    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    /// Condition kind text outside the known set
    #[error("Invalid condition kind: {0}")]
    InvalidKind(String),
}
