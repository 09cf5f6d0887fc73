use super::{DurableStore, StoreResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// In-process store; contents die with the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespace: String,
    entries: RefCell<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RefCell::new(BTreeMap::new()),
        }
    }

    /// Number of keys held under this store's namespace.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}:{key}", self.namespace)
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.borrow().get(&self.scoped(key)).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.entries
            .borrow_mut()
            .insert(self.scoped(key), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.borrow_mut().remove(&self.scoped(key));
        Ok(())
    }
}
