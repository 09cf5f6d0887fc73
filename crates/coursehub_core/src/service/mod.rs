//! Data-layer use-cases.
//!
//! # Responsibility
//! - Orchestrate collection calls into the public operation set.
//! - Keep referential integrity, aggregates, progress and approval rules in
//!   one place so every caller gets the same behavior.
//!
//! `DataService` is defined in `data_service`; the other submodules extend
//! it with one operation group each.

pub mod aggregate;
pub mod approval;
pub mod bulk;
pub mod catalog;
pub mod credentials;
pub mod data_service;
pub mod enrollments;
pub mod error;
pub mod integrity;
pub mod progress;
pub mod reviews;

pub use bulk::{PlatformStats, Snapshot};
pub use credentials::CredentialHasher;
pub use data_service::DataService;
pub use error::{DataError, DataResult};
pub use integrity::CascadeReport;
pub use progress::ProgressState;
pub use reviews::ReviewSubmission;
