//! Generic typed CRUD over one named collection.
//!
//! # Responsibility
//! - Load the full collection, apply one change, persist the full collection.
//! - Assign fresh clock-derived ids on insert.
//!
//! # Invariants
//! - Absent keys read as an empty collection.
//! - Updates and removals of unknown ids are no-ops and do not write.
//! - Cross-collection writes are not atomic; each call covers one key.

use crate::clock::{next_record_id, Clock};
use crate::model::{Record, RecordId};
use crate::store::{DurableStore, StoreError, StoreResult};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

/// Envelope version written by this binary.
pub const SCHEMA_VERSION: u32 = 1;

/// Outcome of a uniqueness-guarded insert.
#[derive(Debug, Clone, PartialEq)]
pub enum Created<T> {
    New(T),
    /// A record with the same unique key already existed; nothing was written.
    AlreadyExists(T),
}

impl<T> Created<T> {
    pub fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }

    pub fn record(&self) -> &T {
        match self {
            Self::New(record) | Self::AlreadyExists(record) => record,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            Self::New(record) | Self::AlreadyExists(record) => record,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeOut<'r, T> {
    schema_version: u32,
    records: &'r [T],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeIn {
    schema_version: u32,
    records: Value,
}

pub struct Collection<'a, T: Record> {
    store: &'a dyn DurableStore,
    clock: &'a dyn Clock,
    _record: PhantomData<T>,
}

impl<'a, T: Record> Collection<'a, T> {
    pub fn new(store: &'a dyn DurableStore, clock: &'a dyn Clock) -> Self {
        Self {
            store,
            clock,
            _record: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        T::COLLECTION
    }

    /// Whether the collection has ever been written.
    pub fn exists(&self) -> StoreResult<bool> {
        self.store.contains(T::COLLECTION)
    }

    pub fn list(&self) -> StoreResult<Vec<T>> {
        match self.store.get(T::COLLECTION)? {
            Some(bytes) => decode::<T>(T::COLLECTION, &bytes),
            None => Ok(Vec::new()),
        }
    }

    pub fn get_by_id(&self, id: RecordId) -> StoreResult<Option<T>> {
        self.find(|record| record.id() == id)
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> StoreResult<Option<T>> {
        Ok(self.list()?.into_iter().find(|record| predicate(record)))
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> StoreResult<Vec<T>> {
        let mut records = self.list()?;
        records.retain(|record| predicate(record));
        Ok(records)
    }

    /// Builds a record around a fresh id and appends it.
    pub fn insert_with(&self, build: impl FnOnce(RecordId) -> T) -> StoreResult<T> {
        self.transact(|records| {
            let record = build(self.fresh_id(records));
            records.push(record.clone());
            (record, true)
        })
    }

    /// Inserts unless a record matching `duplicate_of` exists.
    pub fn insert_unique(
        &self,
        duplicate_of: impl Fn(&T) -> bool,
        build: impl FnOnce(RecordId) -> T,
    ) -> StoreResult<Created<T>> {
        self.transact(|records| {
            if let Some(existing) = records.iter().find(|record| duplicate_of(record)) {
                return (Created::AlreadyExists(existing.clone()), false);
            }
            let record = build(self.fresh_id(records));
            records.push(record.clone());
            (Created::New(record), true)
        })
    }

    pub fn update(&self, id: RecordId, patch: impl FnOnce(&mut T)) -> StoreResult<Option<T>> {
        self.modify_first(
            |record| record.id() == id,
            |record| {
                patch(record);
                true
            },
        )
    }

    /// Mutates the first match; persists only when `change` reports a change.
    pub fn modify_first(
        &self,
        predicate: impl Fn(&T) -> bool,
        change: impl FnOnce(&mut T) -> bool,
    ) -> StoreResult<Option<T>> {
        self.transact(|records| match records.iter_mut().find(|r| predicate(r)) {
            Some(record) => {
                let changed = change(record);
                (Some(record.clone()), changed)
            }
            None => (None, false),
        })
    }

    /// Applies `change` to every match; returns how many reported a change.
    pub fn modify_where(
        &self,
        predicate: impl Fn(&T) -> bool,
        mut change: impl FnMut(&mut T) -> bool,
    ) -> StoreResult<usize> {
        self.transact(|records| {
            let changed = records
                .iter_mut()
                .filter(|record| predicate(record))
                .fold(0, |count, record| count + usize::from(change(record)));
            (changed, changed > 0)
        })
    }

    pub fn remove(&self, id: RecordId) -> StoreResult<bool> {
        Ok(self.remove_where(|record| record.id() == id)? > 0)
    }

    pub fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> StoreResult<usize> {
        self.transact(|records| {
            let before = records.len();
            records.retain(|record| !predicate(record));
            let removed = before - records.len();
            (removed, removed > 0)
        })
    }

    pub fn replace_all(&self, records: &[T]) -> StoreResult<()> {
        self.persist(records)
    }

    /// One explicit read-modify-write unit.
    ///
    /// `body` returns its result and whether the collection must be written.
    pub fn transact<R>(&self, body: impl FnOnce(&mut Vec<T>) -> (R, bool)) -> StoreResult<R> {
        let mut records = self.list()?;
        let (result, dirty) = body(&mut records);
        if dirty {
            self.persist(&records)?;
        }
        Ok(result)
    }

    /// Id for a record about to join `records`.
    pub(crate) fn fresh_id(&self, records: &[T]) -> RecordId {
        next_record_id(self.clock, records.iter().map(Record::id).max())
    }

    fn persist(&self, records: &[T]) -> StoreResult<()> {
        let bytes = serde_json::to_vec(&EnvelopeOut {
            schema_version: SCHEMA_VERSION,
            records,
        })
        .map_err(|err| StoreError::Encode(err.to_string()))?;
        self.store.set(T::COLLECTION, &bytes)?;
        debug!(
            "event=collection_write module=repo key={} records={} bytes={}",
            T::COLLECTION,
            records.len(),
            bytes.len()
        );
        Ok(())
    }
}

/// Decodes either the versioned envelope or the legacy bare array (v0).
fn decode<T: Record>(key: &str, bytes: &[u8]) -> StoreResult<Vec<T>> {
    let corrupted = |err: serde_json::Error| StoreError::Corrupted {
        key: key.to_string(),
        message: err.to_string(),
    };

    let raw: Value = serde_json::from_slice(bytes).map_err(corrupted)?;
    let records = match raw {
        Value::Array(_) => raw,
        Value::Object(_) => {
            let envelope: EnvelopeIn = serde_json::from_value(raw).map_err(corrupted)?;
            if envelope.schema_version > SCHEMA_VERSION {
                return Err(StoreError::UnsupportedSchemaVersion {
                    key: key.to_string(),
                    found: envelope.schema_version,
                    supported: SCHEMA_VERSION,
                });
            }
            envelope.records
        }
        other => {
            return Err(StoreError::Corrupted {
                key: key.to_string(),
                message: format!("expected array or envelope, found `{other}`"),
            });
        }
    };

    serde_json::from_value(records).map_err(corrupted)
}

#[cfg(test)]
mod tests {
    use super::{Collection, Created};
    use crate::clock::ManualClock;
    use crate::model::review::Review;
    use crate::store::{DurableStore, MemoryStore, StoreError};

    fn review(id: i64, student_id: i64, rating: u8) -> Review {
        Review {
            id,
            course_id: 1,
            student_id,
            rating,
            review: String::new(),
            date: 0,
        }
    }

    #[test]
    fn absent_key_reads_as_empty() {
        let store = MemoryStore::new("t");
        let clock = ManualClock::new(100);
        let reviews: Collection<'_, Review> = Collection::new(&store, &clock);

        assert!(reviews.list().unwrap().is_empty());
        assert!(!reviews.exists().unwrap());
    }

    #[test]
    fn insert_assigns_increasing_ids_under_a_stalled_clock() {
        let store = MemoryStore::new("t");
        let clock = ManualClock::new(100);
        let reviews = Collection::new(&store, &clock);

        let first = reviews.insert_with(|id| review(id, 1, 4)).unwrap();
        let second = reviews.insert_with(|id| review(id, 2, 5)).unwrap();

        assert_eq!(first.id, 100);
        assert_eq!(second.id, 101);
        assert_eq!(reviews.list().unwrap().len(), 2);
    }

    #[test]
    fn insert_unique_returns_existing_record() {
        let store = MemoryStore::new("t");
        let clock = ManualClock::new(100);
        let reviews = Collection::new(&store, &clock);

        let first = reviews
            .insert_unique(|r: &Review| r.student_id == 7, |id| review(id, 7, 3))
            .unwrap();
        let second = reviews
            .insert_unique(|r: &Review| r.student_id == 7, |id| review(id, 7, 5))
            .unwrap();

        assert!(first.is_new());
        assert!(matches!(second, Created::AlreadyExists(ref r) if r.rating == 3));
        assert_eq!(reviews.list().unwrap().len(), 1);
    }

    #[test]
    fn update_and_remove_of_unknown_id_do_not_write() {
        let store = MemoryStore::new("t");
        let clock = ManualClock::new(100);
        let reviews: Collection<'_, Review> = Collection::new(&store, &clock);

        assert_eq!(reviews.update(9, |r| r.rating = 1).unwrap(), None);
        assert!(!reviews.remove(9).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn legacy_bare_array_is_readable_and_rewritten_with_envelope() {
        let store = MemoryStore::new("t");
        store
            .set(
                "reviews",
                br#"[{"id":1,"courseId":1,"studentId":2,"rating":4,"review":"ok","date":0}]"#,
            )
            .unwrap();
        let clock = ManualClock::new(100);
        let reviews: Collection<'_, Review> = Collection::new(&store, &clock);

        assert_eq!(reviews.list().unwrap()[0].rating, 4);
        reviews.update(1, |r| r.rating = 5).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&store.get("reviews").unwrap().unwrap()).unwrap();
        assert_eq!(raw["schemaVersion"], 1);
        assert_eq!(raw["records"][0]["rating"], 5);
    }

    #[test]
    fn newer_envelope_is_rejected() {
        let store = MemoryStore::new("t");
        store
            .set("reviews", br#"{"schemaVersion":99,"records":[]}"#)
            .unwrap();
        let clock = ManualClock::new(100);
        let reviews: Collection<'_, Review> = Collection::new(&store, &clock);

        let err = reviews.list().unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedSchemaVersion { found: 99, .. }
        ));
    }

    #[test]
    fn garbage_bytes_are_reported_as_corruption() {
        let store = MemoryStore::new("t");
        store.set("reviews", b"{not json").unwrap();
        let clock = ManualClock::new(100);
        let reviews: Collection<'_, Review> = Collection::new(&store, &clock);

        assert!(matches!(
            reviews.list().unwrap_err(),
            StoreError::Corrupted { .. }
        ));
    }
}
