//! Named JSON blob persistence.
//!
//! The store and the location tracker only ever need "load the blob saved
//! under this name" and "save this blob under this name". Anything that can
//! do that implements [`KeyValueStore`].

pub mod file;
pub mod memory;

use crate::errors::AppResult;
use serde_json::Value;
use std::rc::Rc;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Slot holding the event list and the attendance map.
pub const EVENT_STORAGE_KEY: &str = "event-storage";
/// Slot holding the location permission flags.
pub const LOCATION_STORAGE_KEY: &str = "location-storage";

pub trait KeyValueStore {
    /// `Ok(None)` when nothing was ever saved under `key`.
    fn load_named(&self, key: &str) -> AppResult<Option<Value>>;

    fn save_named(&self, key: &str, value: &Value) -> AppResult<()>;

    /// Move the blob under `key` out of the way, keeping its content, so a
    /// later save cannot overwrite it. Returns where it went, or `None`
    /// when there was nothing to move.
    fn quarantine(&self, key: &str) -> AppResult<Option<String>>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn load_named(&self, key: &str) -> AppResult<Option<Value>> {
        (**self).load_named(key)
    }

    fn save_named(&self, key: &str, value: &Value) -> AppResult<()> {
        (**self).save_named(key, value)
    }

    fn quarantine(&self, key: &str) -> AppResult<Option<String>> {
        (**self).quarantine(key)
    }
}
