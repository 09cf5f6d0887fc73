//! Collection layer over the durable store.
//!
//! # Responsibility
//! - Give each entity type typed CRUD over one serialized collection.
//! - Decode and upgrade the persisted collection envelope.
//!
//! # Invariants
//! - One mutating call is one read-modify-write of the whole collection.
//! - Ids handed out by `insert_with` never collide with existing ids.

pub mod collection;

use crate::clock::Clock;
use crate::model::course::Course;
use crate::model::enrollment::Enrollment;
use crate::model::review::Review;
use crate::model::user::User;
use crate::store::DurableStore;
pub use collection::{Collection, Created, SCHEMA_VERSION};

/// The four entity collections bound to one store and clock.
pub struct Collections<'a> {
    pub users: Collection<'a, User>,
    pub courses: Collection<'a, Course>,
    pub enrollments: Collection<'a, Enrollment>,
    pub reviews: Collection<'a, Review>,
}

impl<'a> Collections<'a> {
    pub fn new(store: &'a dyn DurableStore, clock: &'a dyn Clock) -> Self {
        Self {
            users: Collection::new(store, clock),
            courses: Collection::new(store, clock),
            enrollments: Collection::new(store, clock),
            reviews: Collection::new(store, clock),
        }
    }
}
