use crate::model::ValidationError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DataResult<T> = Result<T, DataError>;

/// Caller-visible failures of data-layer operations.
///
/// Missing records are not errors: lookups and targeted mutations return
/// `None`/`false` instead.
#[derive(Debug)]
pub enum DataError {
    /// The durable store is unreadable or its contents are corrupted.
    StorageUnavailable(StoreError),
    Validation(ValidationError),
    /// Operation refused; the reason is meant for display.
    PreconditionFailed(String),
    /// A unique key would be duplicated by an update.
    Conflict(String),
    Credential(String),
}

impl DataError {
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionFailed(reason.into())
    }

    /// Whether the caller needs user-visible remediation rather than a retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::PreconditionFailed(reason) => write!(f, "{reason}"),
            Self::Conflict(reason) => write!(f, "conflict: {reason}"),
            Self::Credential(reason) => write!(f, "credential error: {reason}"),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for DataError {
    fn from(value: StoreError) -> Self {
        Self::StorageUnavailable(value)
    }
}

impl From<ValidationError> for DataError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
