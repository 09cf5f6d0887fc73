//! Entity records persisted by the data layer.
//!
//! # Responsibility
//! - Define the typed shape of Users, Courses (with embedded Lessons),
//!   Enrollments and Reviews.
//! - Provide write-time validation shared by every mutation path.
//!
//! # Invariants
//! - Every record carries an id unique within its collection.
//! - Field names serialize as camelCase to keep the persisted layout stable.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod course;
pub mod enrollment;
pub mod review;
pub mod user;

/// Collection-scoped record identifier (clock-derived, see `clock`).
pub type RecordId = i64;

/// A record type that owns one named collection.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Store key of the collection holding this record type.
    const COLLECTION: &'static str;

    fn id(&self) -> RecordId;
}

/// Write-time validation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    BlankField(&'static str),
    InvalidEmail(String),
    NegativePrice(f64),
    RatingOutOfRange(u8),
    ProgressOutOfRange(u8),
    DuplicateLessonId(u32),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::NegativePrice(value) => write!(f, "price must be >= 0, got {value}"),
            Self::RatingOutOfRange(value) => write!(f, "rating must be within 1..=5, got {value}"),
            Self::ProgressOutOfRange(value) => {
                write!(f, "progress must be within 0..=100, got {value}")
            }
            Self::DuplicateLessonId(id) => write!(f, "lesson id {id} appears more than once"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}
