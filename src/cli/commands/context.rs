use crate::config::Config;
use crate::core::{AttendanceEngine, EventStore, PassReport};
use crate::storage::JsonFileStore;
use crate::ui::messages::{entered, exited};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Everything a command handler needs, resolved once per invocation.
pub struct Context {
    pub cfg: Config,
    pub data_dir: PathBuf,
    pub now: DateTime<Utc>,
}

impl Context {
    pub fn storage(&self) -> JsonFileStore {
        JsonFileStore::new(&self.data_dir)
    }

    pub fn open_engine(&self) -> AttendanceEngine<JsonFileStore> {
        AttendanceEngine::new(EventStore::open(self.storage()))
    }
}

/// Print the transitions of one pass, by event name.
pub(crate) fn print_transitions(engine: &AttendanceEngine<JsonFileStore>, report: &PassReport) {
    let store = engine.store();
    let name = |id: &str| {
        store
            .get_event(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    for id in &report.entered {
        entered(name(id));
    }
    for id in &report.exited {
        let total = store
            .get_attendance(id)
            .map(|r| r.total_time_at_event)
            .unwrap_or(0);
        exited(name(id), total);
    }
}
