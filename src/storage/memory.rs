use super::KeyValueStore;
use crate::errors::{AppError, AppResult};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// In-memory blob store with switchable failures, for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, Value>>,
    fail_loads: Cell<bool>,
    fail_saves: Cell<bool>,
    saves: Cell<usize>,
    quarantined: RefCell<Vec<(String, Value)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(self, key: &str, value: Value) -> Self {
        self.slots.borrow_mut().insert(key.to_string(), value);
        self
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.set(fail);
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    pub fn slot(&self, key: &str) -> Option<Value> {
        self.slots.borrow().get(key).cloned()
    }

    /// Blobs moved aside by [`KeyValueStore::quarantine`], oldest first.
    pub fn quarantined(&self) -> Vec<(String, Value)> {
        self.quarantined.borrow().clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn load_named(&self, key: &str) -> AppResult<Option<Value>> {
        if self.fail_loads.get() {
            return Err(AppError::Storage(format!("load of '{key}' failed")));
        }
        Ok(self.slot(key))
    }

    fn save_named(&self, key: &str, value: &Value) -> AppResult<()> {
        if self.fail_saves.get() {
            return Err(AppError::Storage(format!("save of '{key}' failed")));
        }
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn quarantine(&self, key: &str) -> AppResult<Option<String>> {
        let Some(value) = self.slots.borrow_mut().remove(key) else {
            return Ok(None);
        };
        self.quarantined
            .borrow_mut()
            .push((key.to_string(), value));
        Ok(Some(format!("{key} (quarantined)")))
    }
}
