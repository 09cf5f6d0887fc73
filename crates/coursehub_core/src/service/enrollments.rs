//! Enrollment use-cases and lesson progress.
//!
//! # Invariants
//! - One enrollment per `(student, course)`; re-enrolling returns the
//!   existing record.
//! - `Course.total_enrollments` is recomputed after every new enrollment.
//! - Lesson marks only accept lesson ids that exist on the course.

use crate::model::enrollment::Enrollment;
use crate::model::RecordId;
use crate::repo::Created;
use crate::service::aggregate;
use crate::service::data_service::DataService;
use crate::service::error::DataResult;
use crate::service::integrity;
use crate::service::progress;
use crate::store::DurableStore;
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LessonMark {
    Complete,
    Incomplete,
}

impl LessonMark {
    fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Incomplete => "incomplete",
        }
    }
}

impl<S: DurableStore> DataService<S> {
    pub fn list_enrollments(&self) -> DataResult<Vec<Enrollment>> {
        Ok(self.collections().enrollments.list()?)
    }

    pub fn list_enrollments_by_student(&self, student_id: RecordId) -> DataResult<Vec<Enrollment>> {
        Ok(self
            .collections()
            .enrollments
            .filter(|enrollment| enrollment.student_id == student_id)?)
    }

    pub fn list_enrollments_by_course(&self, course_id: RecordId) -> DataResult<Vec<Enrollment>> {
        Ok(self
            .collections()
            .enrollments
            .filter(|enrollment| enrollment.course_id == course_id)?)
    }

    pub fn get_enrollment(
        &self,
        student_id: RecordId,
        course_id: RecordId,
    ) -> DataResult<Option<Enrollment>> {
        Ok(self
            .collections()
            .enrollments
            .find(|enrollment| enrollment.is_for(student_id, course_id))?)
    }

    /// Enrolls a student in an approved course.
    pub fn create_enrollment(
        &self,
        student_id: RecordId,
        course_id: RecordId,
    ) -> DataResult<Created<Enrollment>> {
        let collections = self.collections();
        integrity::require_enrollable(&collections, student_id, course_id)?;

        let now = self.now();
        let created = collections.enrollments.insert_unique(
            |enrollment| enrollment.is_for(student_id, course_id),
            |id| Enrollment::started(id, student_id, course_id, now),
        )?;

        match &created {
            Created::New(enrollment) => {
                let total = aggregate::recompute_enrollment_count(&collections, course_id)?;
                info!(
                    "event=enroll module=service status=ok enrollment_id={} student_id={student_id} course_id={course_id} total_enrollments={}",
                    enrollment.id,
                    total.unwrap_or_default()
                );
            }
            Created::AlreadyExists(enrollment) => info!(
                "event=enroll module=service status=duplicate enrollment_id={}",
                enrollment.id
            ),
        }
        Ok(created)
    }

    /// Marks a lesson complete. `None` when the enrollment, course or lesson
    /// does not exist. Repeating a mark returns the unchanged enrollment.
    pub fn mark_lesson_complete(
        &self,
        student_id: RecordId,
        course_id: RecordId,
        lesson_id: u32,
    ) -> DataResult<Option<Enrollment>> {
        self.mark_lesson(student_id, course_id, lesson_id, LessonMark::Complete)
    }

    /// Reverts a lesson mark, revoking completion if it was held.
    pub fn mark_lesson_incomplete(
        &self,
        student_id: RecordId,
        course_id: RecordId,
        lesson_id: u32,
    ) -> DataResult<Option<Enrollment>> {
        self.mark_lesson(student_id, course_id, lesson_id, LessonMark::Incomplete)
    }

    fn mark_lesson(
        &self,
        student_id: RecordId,
        course_id: RecordId,
        lesson_id: u32,
        mark: LessonMark,
    ) -> DataResult<Option<Enrollment>> {
        let collections = self.collections();
        let Some(course) = collections.courses.get_by_id(course_id)? else {
            return Ok(None);
        };
        if !course.has_lesson(lesson_id) {
            debug!(
                "event=lesson_mark module=service status=unknown_lesson course_id={course_id} lesson_id={lesson_id}"
            );
            return Ok(None);
        }

        let total = course.lesson_count();
        let now = self.now();
        let updated = collections.enrollments.modify_first(
            |enrollment| enrollment.is_for(student_id, course_id),
            |enrollment| match mark {
                LessonMark::Complete => progress::mark_complete(enrollment, lesson_id, total, now),
                LessonMark::Incomplete => {
                    progress::mark_incomplete(enrollment, lesson_id, total, now)
                }
            },
        )?;

        if let Some(enrollment) = &updated {
            info!(
                "event=lesson_mark module=service status=ok mark={} enrollment_id={} lesson_id={lesson_id} progress={} completed={}",
                mark.as_str(),
                enrollment.id,
                enrollment.progress,
                enrollment.completed
            );
        }
        Ok(updated)
    }
}
