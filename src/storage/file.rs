//! File-backed blob store: one pretty-printed `<key>.json` per slot.

use super::KeyValueStore;
use crate::errors::{AppError, AppResult};
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn check_key(key: &str) -> AppResult<()> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(AppError::Storage(format!("invalid slot name '{key}'")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn load_named(&self, key: &str) -> AppResult<Option<Value>> {
        check_key(key)?;
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Writes to a sibling temp file first, then renames over the slot, so
    /// a crash mid-write never leaves a truncated blob behind.
    fn save_named(&self, key: &str, value: &Value) -> AppResult<()> {
        check_key(key)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.slot_path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Renames the slot to `<key>.json.corrupt-<millis>` next to it.
    fn quarantine(&self, key: &str) -> AppResult<Option<String>> {
        check_key(key)?;
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let aside = self.dir.join(format!(
            "{key}.json.corrupt-{}",
            Utc::now().timestamp_millis()
        ));
        fs::rename(&path, &aside)?;
        Ok(Some(aside.display().to_string()))
    }
}
