// src/export/model.rs

use crate::core::AttendanceEngine;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Flat per-event attendance row for CSV / JSON.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct AttendanceExport {
    pub event_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub is_active: bool,
    pub is_at_event: bool,
    pub entered_at: Option<String>,
    pub exited_at: Option<String>,
    /// Includes the open session when the user is currently inside.
    pub total_minutes: i64,
    pub last_checked_at: Option<String>,
}

/// One row per catalog event (active or not), in catalog order.
pub fn build_rows<S: KeyValueStore>(
    engine: &AttendanceEngine<S>,
    now: DateTime<Utc>,
) -> Vec<AttendanceExport> {
    let store = engine.store();
    store
        .events()
        .iter()
        .map(|ev| {
            let rec = store.get_attendance(&ev.id);
            AttendanceExport {
                event_id: ev.id.clone(),
                name: ev.name.clone(),
                latitude: ev.latitude,
                longitude: ev.longitude,
                radius_meters: ev.radius_meters,
                is_active: ev.is_active_at(now),
                is_at_event: rec.is_some_and(|r| r.is_at_event),
                entered_at: rec.and_then(|r| r.entered_at).map(|t| t.to_rfc3339()),
                exited_at: rec.and_then(|r| r.exited_at).map(|t| t.to_rfc3339()),
                total_minutes: engine.get_total_time_at_event(&ev.id, now),
                last_checked_at: rec.map(|r| r.last_checked_at.to_rfc3339()),
            }
        })
        .collect()
}
