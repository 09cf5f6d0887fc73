//! Derived course fields.
//!
//! # Responsibility
//! - Recompute `Course.average_rating` and `Course.total_enrollments` from
//!   their source collections.
//!
//! # Invariants
//! - Every recomputation is a full scan; no incremental counters exist.
//! - `average_rating` is the mean rounded to one decimal, or `0.0` when the
//!   course has no reviews.

use crate::model::course::Course;
use crate::model::enrollment::Enrollment;
use crate::model::review::Review;
use crate::model::RecordId;
use crate::repo::Collections;
use crate::store::StoreResult;
use log::debug;

/// Mean of `ratings` rounded to one decimal; `0.0` for no ratings.
pub fn average_rating(ratings: impl IntoIterator<Item = u8>) -> f64 {
    let (sum, count) = ratings
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), rating| {
            (sum + u64::from(rating), count + 1)
        });
    if count == 0 {
        return 0.0;
    }
    round_one_decimal(sum as f64 / count as f64)
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Writes freshly derived fields into every course in `courses`.
pub fn refresh_derived_fields(
    courses: &mut [Course],
    enrollments: &[Enrollment],
    reviews: &[Review],
) {
    for course in courses {
        course.total_enrollments = count_enrollments(enrollments, course.id);
        course.average_rating = average_rating(
            reviews
                .iter()
                .filter(|review| review.course_id == course.id)
                .map(|review| review.rating),
        );
    }
}

fn count_enrollments(enrollments: &[Enrollment], course_id: RecordId) -> u32 {
    enrollments
        .iter()
        .filter(|enrollment| enrollment.course_id == course_id)
        .count() as u32
}

/// Recomputes `average_rating` for one course; `None` when it does not exist.
pub fn recompute_course_rating(
    collections: &Collections<'_>,
    course_id: RecordId,
) -> StoreResult<Option<f64>> {
    let reviews = collections
        .reviews
        .filter(|review| review.course_id == course_id)?;
    let rating = average_rating(reviews.iter().map(|review| review.rating));

    let updated = collections.courses.modify_first(
        |course| course.id == course_id,
        |course| {
            let changed = course.average_rating != rating;
            course.average_rating = rating;
            changed
        },
    )?;
    debug!(
        "event=aggregate_rating module=service course_id={course_id} reviews={} found={}",
        reviews.len(),
        updated.is_some()
    );
    Ok(updated.map(|course| course.average_rating))
}

/// Recomputes `total_enrollments` for one course; `None` when it does not exist.
pub fn recompute_enrollment_count(
    collections: &Collections<'_>,
    course_id: RecordId,
) -> StoreResult<Option<u32>> {
    let total = count_enrollments(&collections.enrollments.list()?, course_id);

    let updated = collections.courses.modify_first(
        |course| course.id == course_id,
        |course| {
            let changed = course.total_enrollments != total;
            course.total_enrollments = total;
            changed
        },
    )?;
    debug!(
        "event=aggregate_enrollments module=service course_id={course_id} total={total} found={}",
        updated.is_some()
    );
    Ok(updated.map(|course| course.total_enrollments))
}

/// Recomputes derived fields of every course in one write.
pub fn recompute_all(collections: &Collections<'_>) -> StoreResult<()> {
    let enrollments = collections.enrollments.list()?;
    let reviews = collections.reviews.list()?;
    collections.courses.transact(|courses| {
        refresh_derived_fields(courses, &enrollments, &reviews);
        ((), true)
    })
}
