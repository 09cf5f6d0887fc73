//! Embedded relational data layer for the CourseHub marketplace.
//! This crate is the single source of truth for cross-entity invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, DataLayerConfig, PasswordHashingConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::course::{
    Course, CoursePatch, DifficultyLevel, Lesson, LessonDraft, LessonType, NewCourse,
};
pub use model::enrollment::Enrollment;
pub use model::review::Review;
pub use model::user::{NewUser, Role, User, UserPatch};
pub use model::{RecordId, ValidationError};
pub use repo::Created;
pub use service::{
    CascadeReport, DataError, DataResult, DataService, PlatformStats, ProgressState,
    ReviewSubmission, Snapshot,
};
pub use store::{DurableStore, MemoryStore, SqliteStore, StoreError, StoreResult};

/// Opens the data layer described by `config`.
///
/// A configured `database_path` selects a SQLite file; otherwise the data
/// lives in an in-memory SQLite database for the life of the service.
pub fn open_from_config(config: &DataLayerConfig) -> DataResult<DataService<SqliteStore>> {
    let store = match &config.database_path {
        Some(path) => SqliteStore::open(path, config.namespace.clone())?,
        None => SqliteStore::open_in_memory(config.namespace.clone())?,
    };
    DataService::open(store, config)
}

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
