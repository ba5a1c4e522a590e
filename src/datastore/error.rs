pub type Result<T> = std::result::Result<T, RosterError>;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// A field failed validation. `field` names the first offending field.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("a student with roll number {0} already exists")]
    DuplicateKey(i32),
    #[error("no student found for {0}")]
    NotFound(String),
    #[error("I/O error on backing file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to acquire mutex lock: a thread panicked while holding the lock.")]
    LockPoisoned,
}

impl RosterError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        RosterError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
