//! Enrollment lesson-completion state machine.
//!
//! # Responsibility
//! - Apply lesson complete/incomplete transitions to an enrollment.
//! - Keep `progress`, `completed` and `completed_date` consistent with the
//!   completed-lesson set and the course's lesson count.
//!
//! # Invariants
//! - `progress == round(100 * done / total)`, and `0` when `total == 0`.
//! - `completed` iff `total > 0 && done == total`.
//! - `completed_date` is stamped on the first transition into completion and
//!   cleared whenever completion is lost.
//! - A call that does not change the lesson set changes nothing at all.

use crate::model::enrollment::Enrollment;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressState {
    pub fn of(done: usize, total: usize) -> Self {
        if done == 0 {
            Self::NotStarted
        } else if total > 0 && done >= total {
            Self::Completed
        } else {
            Self::InProgress
        }
    }
}

pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (100.0 * done.min(total) as f64 / total as f64).round();
    percent as u8
}

/// Adds `lesson_id` to the completed set. Returns whether anything changed.
pub fn mark_complete(enrollment: &mut Enrollment, lesson_id: u32, total: usize, now: i64) -> bool {
    if !enrollment.completed_lessons.insert(lesson_id) {
        return false;
    }
    settle(enrollment, total, now);
    true
}

/// Removes `lesson_id` from the completed set. Returns whether anything changed.
pub fn mark_incomplete(
    enrollment: &mut Enrollment,
    lesson_id: u32,
    total: usize,
    now: i64,
) -> bool {
    if !enrollment.completed_lessons.remove(&lesson_id) {
        return false;
    }
    settle(enrollment, total, now);
    true
}

/// Re-aligns an enrollment after its course's lesson list changed.
///
/// Drops completed ids that no longer name a lesson, then recomputes.
/// `last_activity` is left alone since the student did nothing.
pub fn resync(enrollment: &mut Enrollment, lesson_ids: &BTreeSet<u32>) -> bool {
    let before = enrollment.clone();
    enrollment
        .completed_lessons
        .retain(|lesson_id| lesson_ids.contains(lesson_id));
    let last_activity = enrollment.last_activity;
    settle(enrollment, lesson_ids.len(), last_activity);
    *enrollment != before
}

fn settle(enrollment: &mut Enrollment, total: usize, now: i64) {
    let done = enrollment.completed_lessons.len();
    enrollment.progress = progress_percent(done, total);
    enrollment.last_activity = now;

    if ProgressState::of(done, total) == ProgressState::Completed {
        if !enrollment.completed {
            enrollment.completed = true;
            enrollment.completed_date = Some(now);
        }
    } else {
        enrollment.completed = false;
        enrollment.completed_date = None;
    }
}
