//! Approval gates for courses and instructors.
//!
//! # Invariants
//! - Both gates only move `false -> true` (approve) or `false -> deleted`
//!   (reject). Approved records cannot be rejected.
//! - Rejection is a hard delete with cascade; nothing records the decision.
//! - Catalog queries only ever see approved courses.
//! - A course is only published once its instructor is approved.

use crate::model::course::Course;
use crate::model::user::{Role, User};
use crate::model::RecordId;
use crate::repo::Collections;
use crate::service::error::{DataError, DataResult};
use crate::service::integrity::{self, CascadeReport};

/// Whether the course shows up in browse/catalog listings.
pub fn is_listed(course: &Course) -> bool {
    course.approved
}

/// Whether `viewer` may open the course detail page.
///
/// Approved courses are public. Pending ones are visible to their own
/// instructor and to admins only.
pub fn can_view(course: &Course, viewer: Option<&User>) -> bool {
    if course.approved {
        return true;
    }
    match viewer {
        Some(user) if user.role == Role::Admin => true,
        Some(user) if user.role == Role::Instructor => user.id == course.instructor_id,
        _ => false,
    }
}

/// Publishes a course. `None` when it does not exist.
///
/// The owning instructor must already be approved.
pub fn approve_course(
    collections: &Collections<'_>,
    course_id: RecordId,
) -> DataResult<Option<Course>> {
    let Some(course) = collections.courses.get_by_id(course_id)? else {
        return Ok(None);
    };
    let owner_approved = collections
        .users
        .get_by_id(course.instructor_id)?
        .is_some_and(|owner| owner.is_instructor() && owner.approved);
    if !owner_approved {
        return Err(DataError::precondition(format!(
            "instructor {} must be approved before their courses can be published",
            course.instructor_id
        )));
    }

    let approved = collections.courses.modify_first(
        |course| course.id == course_id,
        |course| {
            let changed = !course.approved;
            course.approved = true;
            changed
        },
    )?;
    Ok(approved)
}

/// Deletes a pending course and its dependents. `None` when it does not exist.
pub fn reject_course(
    collections: &Collections<'_>,
    course_id: RecordId,
) -> DataResult<Option<CascadeReport>> {
    let Some(course) = collections.courses.get_by_id(course_id)? else {
        return Ok(None);
    };
    if course.approved {
        return Err(DataError::precondition(
            "approved courses cannot be rejected; delete the course instead",
        ));
    }
    Ok(Some(integrity::cascade_delete_course(collections, course_id)?))
}

pub fn approve_instructor(
    collections: &Collections<'_>,
    user_id: RecordId,
) -> DataResult<Option<User>> {
    let Some(user) = collections.users.get_by_id(user_id)? else {
        return Ok(None);
    };
    if !user.is_instructor() {
        return Err(DataError::precondition(format!(
            "user {user_id} is a {}, not an instructor",
            user.role.as_str()
        )));
    }
    let approved = collections.users.modify_first(
        |u| u.id == user_id,
        |u| {
            let changed = !u.approved;
            u.approved = true;
            changed
        },
    )?;
    Ok(approved)
}

/// Deletes a pending instructor, cascading through any courses they own.
/// Returns `false` when the user does not exist.
pub fn reject_instructor(collections: &Collections<'_>, user_id: RecordId) -> DataResult<bool> {
    let Some(user) = collections.users.get_by_id(user_id)? else {
        return Ok(false);
    };
    if !user.is_instructor() {
        return Err(DataError::precondition(format!(
            "user {user_id} is a {}, not an instructor",
            user.role.as_str()
        )));
    }
    if user.approved {
        return Err(DataError::precondition(
            "approved instructors cannot be rejected",
        ));
    }
    integrity::cascade_delete_user(collections, user_id)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::{can_view, is_listed};
    use crate::model::course::{Course, DifficultyLevel};
    use crate::model::user::{Role, User};

    fn course(approved: bool) -> Course {
        Course {
            id: 1,
            title: "Rust".to_string(),
            description: String::new(),
            instructor_id: 7,
            category: "Programming".to_string(),
            difficulty_level: DifficultyLevel::Beginner,
            duration: "4 weeks".to_string(),
            price: 0.0,
            syllabus: Vec::new(),
            lessons: Vec::new(),
            thumbnail: None,
            approved,
            created_date: 0,
            total_enrollments: 0,
            average_rating: 0.0,
        }
    }

    fn user(id: i64, role: Role) -> User {
        User {
            id,
            name: "U".to_string(),
            email: "u@example.com".to_string(),
            password_hash: String::new(),
            role,
            approved: true,
            avatar: None,
            joined_date: 0,
        }
    }

    #[test]
    fn approved_courses_are_public() {
        let approved = course(true);
        assert!(is_listed(&approved));
        assert!(can_view(&approved, None));
        assert!(can_view(&approved, Some(&user(2, Role::Student))));
    }

    #[test]
    fn pending_courses_are_limited_to_owner_and_admins() {
        let pending = course(false);
        assert!(!is_listed(&pending));
        assert!(!can_view(&pending, None));
        assert!(!can_view(&pending, Some(&user(2, Role::Student))));
        assert!(!can_view(&pending, Some(&user(8, Role::Instructor))));
        assert!(can_view(&pending, Some(&user(7, Role::Instructor))));
        assert!(can_view(&pending, Some(&user(1, Role::Admin))));
    }
}
