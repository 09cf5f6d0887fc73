//! Review submission and course rating upkeep.
//!
//! # Invariants
//! - One review per `(student, course)`; a resubmission overwrites it.
//! - Only enrolled students can review; the enrollment mirrors the review.
//! - `Course.average_rating` is recomputed after every submission.

use crate::model::review::{validate_rating, Review};
use crate::model::RecordId;
use crate::service::aggregate;
use crate::service::data_service::DataService;
use crate::service::error::{DataError, DataResult};
use crate::store::DurableStore;
use log::info;

/// Whether a submission created the review or replaced an earlier one.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewSubmission {
    Created(Review),
    Updated(Review),
}

impl ReviewSubmission {
    pub fn review(&self) -> &Review {
        match self {
            Self::Created(review) | Self::Updated(review) => review,
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

impl<S: DurableStore> DataService<S> {
    pub fn list_course_reviews(&self, course_id: RecordId) -> DataResult<Vec<Review>> {
        Ok(self
            .collections()
            .reviews
            .filter(|review| review.course_id == course_id)?)
    }

    pub fn get_user_review(
        &self,
        student_id: RecordId,
        course_id: RecordId,
    ) -> DataResult<Option<Review>> {
        Ok(self
            .collections()
            .reviews
            .find(|review| review.is_for(student_id, course_id))?)
    }

    /// Creates or overwrites the student's review of a course they are
    /// enrolled in.
    pub fn submit_review(
        &self,
        student_id: RecordId,
        course_id: RecordId,
        rating: u8,
        text: &str,
    ) -> DataResult<ReviewSubmission> {
        validate_rating(rating)?;
        let collections = self.collections();
        if self.get_enrollment(student_id, course_id)?.is_none() {
            return Err(DataError::precondition(
                "only enrolled students can review a course",
            ));
        }

        let now = self.now();
        let text = text.trim().to_string();
        let submission = collections.reviews.transact(|reviews| {
            if let Some(existing) = reviews
                .iter_mut()
                .find(|review| review.is_for(student_id, course_id))
            {
                existing.rating = rating;
                existing.review = text.clone();
                existing.date = now;
                return (ReviewSubmission::Updated(existing.clone()), true);
            }
            let review = Review {
                id: collections.reviews.fresh_id(reviews),
                course_id,
                student_id,
                rating,
                review: text.clone(),
                date: now,
            };
            reviews.push(review.clone());
            (ReviewSubmission::Created(review), true)
        })?;

        collections.enrollments.modify_first(
            |enrollment| enrollment.is_for(student_id, course_id),
            |enrollment| {
                let changed = enrollment.rating != Some(rating)
                    || enrollment.review.as_deref() != Some(text.as_str());
                enrollment.rating = Some(rating);
                enrollment.review = Some(text.clone());
                changed
            },
        )?;
        let average = aggregate::recompute_course_rating(&collections, course_id)?;

        info!(
            "event=review_submit module=service status=ok review_id={} course_id={course_id} updated={} average_rating={}",
            submission.review().id,
            submission.is_update(),
            average.unwrap_or_default()
        );
        Ok(submission)
    }
}
