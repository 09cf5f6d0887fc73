//! Enrollment record and its lesson-completion state.
//!
//! # Invariants
//! - At most one enrollment per `(student_id, course_id)`.
//! - `progress == round(100 * |completed_lessons| / lesson_count)`.
//! - `completed` iff every lesson of the course is in `completed_lessons`.
//! - `completed_date` is set iff `completed`.

use super::{Record, RecordId, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: RecordId,
    pub student_id: RecordId,
    pub course_id: RecordId,
    pub enrolled_date: i64,
    pub progress: u8,
    #[serde(default)]
    pub completed_lessons: BTreeSet<u32>,
    pub last_activity: i64,
    pub completed: bool,
    #[serde(default)]
    pub completed_date: Option<i64>,
    /// Mirror of the student's own review for this course.
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub review: Option<String>,
}

impl Record for Enrollment {
    const COLLECTION: &'static str = "enrollments";

    fn id(&self) -> RecordId {
        self.id
    }
}

impl Enrollment {
    /// Fresh enrollment with no completed lessons.
    pub fn started(id: RecordId, student_id: RecordId, course_id: RecordId, now: i64) -> Self {
        Self {
            id,
            student_id,
            course_id,
            enrolled_date: now,
            progress: 0,
            completed_lessons: BTreeSet::new(),
            last_activity: now,
            completed: false,
            completed_date: None,
            rating: None,
            review: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.progress > 100 {
            return Err(ValidationError::ProgressOutOfRange(self.progress));
        }
        Ok(())
    }

    pub fn is_for(&self, student_id: RecordId, course_id: RecordId) -> bool {
        self.student_id == student_id && self.course_id == course_id
    }
}
