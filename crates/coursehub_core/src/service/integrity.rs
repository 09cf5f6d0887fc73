//! Foreign-key checks and cascading deletes.
//!
//! # Responsibility
//! - Refuse creates whose foreign keys do not resolve.
//! - Remove dependent enrollments and reviews together with their course.
//!
//! # Invariants
//! - After a course cascade no enrollment or review references the course.
//! - Dangling references are prevented at write time; there is no
//!   after-the-fact repair pass for live data.
//! - The engine keeps no state; it reads and writes through `Collections`.

use crate::model::course::Course;
use crate::model::enrollment::Enrollment;
use crate::model::review::Review;
use crate::model::user::{normalize_email, Role, User};
use crate::model::RecordId;
use crate::repo::Collections;
use crate::service::aggregate;
use crate::service::error::{DataError, DataResult};
use crate::store::StoreResult;
use std::collections::{BTreeSet, HashMap, HashSet};

/// What a course cascade removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub course_removed: bool,
    pub enrollments_removed: usize,
    pub reviews_removed: usize,
}

/// Resolves the owner of a new course; it must be an existing instructor.
pub fn require_instructor(
    collections: &Collections<'_>,
    instructor_id: RecordId,
) -> DataResult<User> {
    let user = collections.users.get_by_id(instructor_id)?.ok_or_else(|| {
        DataError::precondition(format!("instructor {instructor_id} does not exist"))
    })?;
    if user.role != Role::Instructor {
        return Err(DataError::precondition(format!(
            "user {instructor_id} is not an instructor"
        )));
    }
    Ok(user)
}

/// Resolves both sides of a new enrollment.
///
/// The student must exist with the student role; the course must exist and
/// be approved.
pub fn require_enrollable(
    collections: &Collections<'_>,
    student_id: RecordId,
    course_id: RecordId,
) -> DataResult<(User, Course)> {
    let student = collections
        .users
        .get_by_id(student_id)?
        .ok_or_else(|| DataError::precondition(format!("student {student_id} does not exist")))?;
    if student.role != Role::Student {
        return Err(DataError::precondition("only students can enroll in courses"));
    }

    let course = collections
        .courses
        .get_by_id(course_id)?
        .ok_or_else(|| DataError::precondition(format!("course {course_id} does not exist")))?;
    if !course.approved {
        return Err(DataError::precondition(
            "course is not approved for enrollment yet",
        ));
    }
    Ok((student, course))
}

/// Deletes a course together with its enrollments and reviews.
pub fn cascade_delete_course(
    collections: &Collections<'_>,
    course_id: RecordId,
) -> StoreResult<CascadeReport> {
    let enrollments_removed = collections
        .enrollments
        .remove_where(|enrollment| enrollment.course_id == course_id)?;
    let reviews_removed = collections
        .reviews
        .remove_where(|review| review.course_id == course_id)?;
    let course_removed = collections.courses.remove(course_id)?;

    Ok(CascadeReport {
        course_removed,
        enrollments_removed,
        reviews_removed,
    })
}

/// Deletes a user, the courses they teach (cascading), and their own
/// enrollments and reviews. Aggregates of touched courses are recomputed.
pub fn cascade_delete_user(
    collections: &Collections<'_>,
    user_id: RecordId,
) -> StoreResult<Vec<CascadeReport>> {
    let owned = collections
        .courses
        .filter(|course| course.instructor_id == user_id)?;
    let mut reports = Vec::with_capacity(owned.len());
    for course in &owned {
        reports.push(cascade_delete_course(collections, course.id)?);
    }

    let mut touched: BTreeSet<RecordId> = collections
        .enrollments
        .filter(|enrollment| enrollment.student_id == user_id)?
        .into_iter()
        .map(|enrollment| enrollment.course_id)
        .collect();
    touched.extend(
        collections
            .reviews
            .filter(|review| review.student_id == user_id)?
            .into_iter()
            .map(|review| review.course_id),
    );

    collections
        .enrollments
        .remove_where(|enrollment| enrollment.student_id == user_id)?;
    collections
        .reviews
        .remove_where(|review| review.student_id == user_id)?;
    for course_id in touched {
        aggregate::recompute_enrollment_count(collections, course_id)?;
        aggregate::recompute_course_rating(collections, course_id)?;
    }

    collections.users.remove(user_id)?;
    Ok(reports)
}

/// Validates a full dataset before it replaces live collections.
///
/// Checks id and unique-key uniqueness, that every foreign key resolves, and
/// that it resolves to a user with the role the create path demands.
pub fn check_dataset(
    users: &[User],
    courses: &[Course],
    enrollments: &[Enrollment],
    reviews: &[Review],
) -> Result<(), String> {
    unique_ids("users", users.iter().map(|user| user.id))?;
    let course_ids = unique_ids("courses", courses.iter().map(|course| course.id))?;
    unique_ids("enrollments", enrollments.iter().map(|e| e.id))?;
    unique_ids("reviews", reviews.iter().map(|r| r.id))?;

    let mut emails = HashSet::new();
    for user in users {
        if !emails.insert(normalize_email(&user.email)) {
            return Err(format!("duplicate email on user {}", user.id));
        }
    }
    let roles: HashMap<RecordId, Role> = users.iter().map(|user| (user.id, user.role)).collect();

    for course in courses {
        match roles.get(&course.instructor_id) {
            Some(Role::Instructor) => {}
            Some(_) => {
                return Err(format!(
                    "course {} is owned by user {} who is not an instructor",
                    course.id, course.instructor_id
                ));
            }
            None => {
                return Err(format!(
                    "course {} references missing instructor {}",
                    course.id, course.instructor_id
                ));
            }
        }
    }

    let mut enrolled = HashSet::new();
    for enrollment in enrollments {
        let student = roles.get(&enrollment.student_id);
        if student.is_none() || !course_ids.contains(&enrollment.course_id) {
            return Err(format!("enrollment {} has a dangling reference", enrollment.id));
        }
        if student != Some(&Role::Student) {
            return Err(format!(
                "enrollment {} belongs to user {} who is not a student",
                enrollment.id, enrollment.student_id
            ));
        }
        if !enrolled.insert((enrollment.student_id, enrollment.course_id)) {
            return Err(format!("duplicate enrollment {}", enrollment.id));
        }
    }

    let mut reviewed = HashSet::new();
    for review in reviews {
        if !roles.contains_key(&review.student_id) || !course_ids.contains(&review.course_id) {
            return Err(format!("review {} has a dangling reference", review.id));
        }
        if !enrolled.contains(&(review.student_id, review.course_id)) {
            return Err(format!("review {} has no matching enrollment", review.id));
        }
        if !reviewed.insert((review.student_id, review.course_id)) {
            return Err(format!("duplicate review {}", review.id));
        }
    }

    Ok(())
}

fn unique_ids(
    collection: &str,
    ids: impl Iterator<Item = RecordId>,
) -> Result<HashSet<RecordId>, String> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(format!("duplicate id {id} in {collection}"));
        }
    }
    Ok(seen)
}
