//! Course use-cases: catalog queries, authoring, approval and deletion.
//!
//! # Invariants
//! - New courses start unapproved with zeroed derived fields.
//! - Edits never change `approved`, `instructor_id` or derived fields.
//! - A lesson-list edit re-synchronizes every enrollment of the course.
//! - Deleting or rejecting a course cascades to enrollments and reviews.

use crate::model::course::{assign_lesson_ids, Course, CoursePatch, NewCourse};
use crate::model::RecordId;
use crate::service::approval;
use crate::service::data_service::DataService;
use crate::service::error::{DataError, DataResult};
use crate::service::integrity;
use crate::service::progress;
use crate::store::DurableStore;
use log::info;

impl<S: DurableStore> DataService<S> {
    pub fn list_courses(&self) -> DataResult<Vec<Course>> {
        Ok(self.collections().courses.list()?)
    }

    /// Browse/catalog listing; approved courses only.
    pub fn list_approved_courses(&self) -> DataResult<Vec<Course>> {
        Ok(self.collections().courses.filter(approval::is_listed)?)
    }

    /// Courses awaiting admin review.
    pub fn list_pending_courses(&self) -> DataResult<Vec<Course>> {
        Ok(self
            .collections()
            .courses
            .filter(|course| !approval::is_listed(course))?)
    }

    pub fn get_course_by_id(&self, id: RecordId) -> DataResult<Option<Course>> {
        Ok(self.collections().courses.get_by_id(id)?)
    }

    /// Course detail lookup on behalf of `viewer_id` (`None` = anonymous).
    ///
    /// A pending course requested by anyone but its instructor or an admin
    /// is a `PreconditionFailed`.
    pub fn view_course(
        &self,
        course_id: RecordId,
        viewer_id: Option<RecordId>,
    ) -> DataResult<Option<Course>> {
        let Some(course) = self.get_course_by_id(course_id)? else {
            return Ok(None);
        };
        let viewer = match viewer_id {
            Some(id) => self.get_user_by_id(id)?,
            None => None,
        };
        if !approval::can_view(&course, viewer.as_ref()) {
            return Err(DataError::precondition(
                "this course is awaiting approval and cannot be viewed yet",
            ));
        }
        Ok(Some(course))
    }

    pub fn list_courses_by_instructor(&self, instructor_id: RecordId) -> DataResult<Vec<Course>> {
        Ok(self
            .collections()
            .courses
            .filter(|course| course.instructor_id == instructor_id)?)
    }

    /// Creates an unapproved course owned by an existing instructor.
    pub fn create_course(&self, new_course: NewCourse) -> DataResult<Course> {
        let collections = self.collections();
        integrity::require_instructor(&collections, new_course.instructor_id)?;

        let draft = Course {
            id: 0,
            title: new_course.title.trim().to_string(),
            description: new_course.description,
            instructor_id: new_course.instructor_id,
            category: new_course.category,
            difficulty_level: new_course.difficulty_level,
            duration: new_course.duration,
            price: new_course.price,
            syllabus: new_course.syllabus,
            lessons: assign_lesson_ids(new_course.lessons),
            thumbnail: new_course.thumbnail,
            approved: false,
            created_date: self.now(),
            total_enrollments: 0,
            average_rating: 0.0,
        };
        draft.validate()?;

        let course = collections
            .courses
            .insert_with(|id| Course { id, ..draft })?;
        info!(
            "event=course_create module=service status=ok course_id={} instructor_id={} lessons={}",
            course.id,
            course.instructor_id,
            course.lesson_count()
        );
        Ok(course)
    }

    /// Applies an edit. `None` when the course does not exist.
    pub fn update_course(&self, id: RecordId, patch: CoursePatch) -> DataResult<Option<Course>> {
        let collections = self.collections();
        let lessons_edited = patch.lessons.is_some();

        let updated = collections.courses.transact(|courses| {
            let Some(course) = courses.iter_mut().find(|course| course.id == id) else {
                return (Ok(None), false);
            };
            let mut edited = course.clone();
            patch.apply(&mut edited);
            if let Err(err) = edited.validate() {
                return (Err(DataError::from(err)), false);
            }
            *course = edited.clone();
            (Ok(Some(edited)), true)
        })??;

        if let (Some(course), true) = (&updated, lessons_edited) {
            let lesson_ids = course.lesson_ids();
            let resynced = collections.enrollments.modify_where(
                |enrollment| enrollment.course_id == id,
                |enrollment| progress::resync(enrollment, &lesson_ids),
            )?;
            info!(
                "event=course_lessons_edit module=service course_id={id} lessons={} enrollments_resynced={resynced}",
                lesson_ids.len()
            );
        }
        Ok(updated)
    }

    /// Deletes a course with its enrollments and reviews. `false` when absent.
    pub fn delete_course(&self, id: RecordId) -> DataResult<bool> {
        let report = integrity::cascade_delete_course(&self.collections(), id)?;
        info!(
            "event=course_delete module=service course_id={id} removed={} enrollments_removed={} reviews_removed={}",
            report.course_removed, report.enrollments_removed, report.reviews_removed
        );
        Ok(report.course_removed)
    }

    pub fn approve_course(&self, id: RecordId) -> DataResult<Option<Course>> {
        let approved = approval::approve_course(&self.collections(), id)?;
        info!(
            "event=course_approve module=service course_id={id} found={}",
            approved.is_some()
        );
        Ok(approved)
    }

    /// Deletes a pending course with cascade. `false` when absent.
    pub fn reject_course(&self, id: RecordId) -> DataResult<bool> {
        let report = approval::reject_course(&self.collections(), id)?;
        info!(
            "event=course_reject module=service course_id={id} found={}",
            report.is_some()
        );
        Ok(report.is_some_and(|report| report.course_removed))
    }
}
