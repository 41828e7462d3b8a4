use super::{attendance::AttendanceRecord, geo_event::GeoEvent};
use serde::Serialize;

/// Read-only view of one event as seen from the latest fix.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventStatus {
    pub is_at_event: bool,
    pub distance_meters: Option<f64>,
    pub event: Option<GeoEvent>,
    pub attendance: Option<AttendanceRecord>,
}

impl EventStatus {
    /// Shape returned when there is no live fix or the event is unknown.
    pub fn no_data() -> Self {
        Self::default()
    }

    pub fn has_data(&self) -> bool {
        self.event.is_some()
    }
}
