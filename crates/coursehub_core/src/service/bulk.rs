//! Whole-dataset operations: backup, restore, reset and platform counts.
//!
//! # Responsibility
//! - Export every collection as one versioned snapshot.
//! - Validate a snapshot completely before it replaces live data.
//! - Restore the bootstrap dataset on demand.
//!
//! # Invariants
//! - A rejected import writes nothing.
//! - After an import, derived course fields and enrollment progress are
//!   recomputed from the imported records.

use crate::model::course::Course;
use crate::model::enrollment::Enrollment;
use crate::model::review::Review;
use crate::model::user::{Role, User};
use crate::repo::SCHEMA_VERSION;
use crate::seed::{self, Dataset};
use crate::service::aggregate;
use crate::service::data_service::DataService;
use crate::service::error::{DataError, DataResult};
use crate::service::integrity;
use crate::service::progress;
use crate::store::{DurableStore, StoreError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Portable copy of all four collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Absent in legacy exports, which read as version 0.
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub exported_at: i64,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// Platform-wide counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformStats {
    pub students: usize,
    pub instructors: usize,
    pub admins: usize,
    pub pending_instructors: usize,
    pub approved_courses: usize,
    pub pending_courses: usize,
    pub enrollments: usize,
    pub completed_enrollments: usize,
    pub reviews: usize,
}

impl<S: DurableStore> DataService<S> {
    pub fn export_all(&self) -> DataResult<Snapshot> {
        let collections = self.collections();
        let snapshot = Snapshot {
            schema_version: SCHEMA_VERSION,
            exported_at: self.now(),
            users: collections.users.list()?,
            courses: collections.courses.list()?,
            enrollments: collections.enrollments.list()?,
            reviews: collections.reviews.list()?,
        };
        info!(
            "event=export module=service status=ok users={} courses={} enrollments={} reviews={}",
            snapshot.users.len(),
            snapshot.courses.len(),
            snapshot.enrollments.len(),
            snapshot.reviews.len()
        );
        Ok(snapshot)
    }

    pub fn export_json(&self) -> DataResult<String> {
        let snapshot = self.export_all()?;
        serde_json::to_string_pretty(&snapshot)
            .map_err(|err| DataError::StorageUnavailable(StoreError::Encode(err.to_string())))
    }

    /// Replaces all live data with `snapshot` after validating it.
    pub fn import_all(&self, snapshot: Snapshot) -> DataResult<()> {
        if snapshot.schema_version > SCHEMA_VERSION {
            return Err(DataError::precondition(format!(
                "snapshot schema version {} is newer than supported version {SCHEMA_VERSION}",
                snapshot.schema_version
            )));
        }
        let Snapshot {
            users,
            courses,
            mut enrollments,
            reviews,
            ..
        } = snapshot;

        if let Err(reason) = integrity::check_dataset(&users, &courses, &enrollments, &reviews) {
            warn!("event=import module=service status=rejected reason=integrity");
            return Err(DataError::precondition(format!("snapshot rejected: {reason}")));
        }
        for user in &users {
            user.validate()?;
        }
        for course in &courses {
            course.validate()?;
        }
        for review in &reviews {
            review.validate()?;
        }

        let lessons_by_course: HashMap<_, _> = courses
            .iter()
            .map(|course| (course.id, course.lesson_ids()))
            .collect();
        for enrollment in &mut enrollments {
            if let Some(lesson_ids) = lessons_by_course.get(&enrollment.course_id) {
                progress::resync(enrollment, lesson_ids);
            }
            enrollment.validate()?;
        }

        let collections = self.collections();
        seed::write_dataset(
            &collections,
            &Dataset {
                users,
                courses,
                enrollments,
                reviews,
            },
        )?;
        let upgraded = self.upgrade_legacy_credentials()?;
        aggregate::recompute_all(&collections)?;
        info!("event=import module=service status=ok credentials_upgraded={upgraded}");
        Ok(())
    }

    pub fn import_json(&self, text: &str) -> DataResult<()> {
        let snapshot: Snapshot = serde_json::from_str(text)
            .map_err(|err| DataError::precondition(format!("snapshot is not valid: {err}")))?;
        self.import_all(snapshot)
    }

    /// Discards all data and writes the bootstrap dataset.
    pub fn reset_to_defaults(&self) -> DataResult<()> {
        let dataset = seed::bootstrap_dataset(self.hasher())?;
        seed::write_dataset(&self.collections(), &dataset)?;
        warn!("event=reset module=service status=ok");
        Ok(())
    }

    pub fn stats(&self) -> DataResult<PlatformStats> {
        let collections = self.collections();
        let users = collections.users.list()?;
        let courses = collections.courses.list()?;
        let enrollments = collections.enrollments.list()?;

        let with_role = |role: Role| users.iter().filter(|user| user.role == role).count();
        let approved_courses = courses.iter().filter(|course| course.approved).count();
        Ok(PlatformStats {
            students: with_role(Role::Student),
            instructors: with_role(Role::Instructor),
            admins: with_role(Role::Admin),
            pending_instructors: users
                .iter()
                .filter(|user| user.is_instructor() && !user.approved)
                .count(),
            approved_courses,
            pending_courses: courses.len() - approved_courses,
            enrollments: enrollments.len(),
            completed_enrollments: enrollments.iter().filter(|e| e.completed).count(),
            reviews: collections.reviews.list()?.len(),
        })
    }
}
