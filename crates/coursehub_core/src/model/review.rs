//! Course review record.
//!
//! # Invariants
//! - At most one review per `(student_id, course_id)`; resubmission updates.
//! - `rating` is within `1..=5`.

use super::{Record, RecordId, ValidationError};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: RecordId,
    pub course_id: RecordId,
    pub student_id: RecordId,
    pub rating: u8,
    #[serde(default)]
    pub review: String,
    pub date: i64,
}

impl Record for Review {
    const COLLECTION: &'static str = "reviews";

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Review {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_rating(self.rating)
    }

    pub fn is_for(&self, student_id: RecordId, course_id: RecordId) -> bool {
        self.student_id == student_id && self.course_id == course_id
    }
}

pub fn validate_rating(rating: u8) -> Result<(), ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}
