use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live attendance state of one event, keyed by the event id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub event_id: String,
    pub is_at_event: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exited_at: Option<DateTime<Utc>>,
    /// Whole minutes of completed sessions. The open session is not included.
    pub total_time_at_event: i64,
    pub last_checked_at: DateTime<Utc>,
}

/// Partial attendance update. `entered_at` and `exited_at` take a nested
/// option so that a transition can explicitly clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendancePatch {
    pub is_at_event: Option<bool>,
    pub entered_at: Option<Option<DateTime<Utc>>>,
    pub exited_at: Option<Option<DateTime<Utc>>>,
    pub total_time_at_event: Option<i64>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
    /// Record synthesized the first time an event is touched: outside,
    /// no dwell time, checked at `now`.
    pub fn outside(event_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            event_id: event_id.into(),
            is_at_event: false,
            entered_at: None,
            exited_at: None,
            total_time_at_event: 0,
            last_checked_at: now,
        }
    }

    /// Shallow merge of `patch` over `self`.
    pub fn apply(&mut self, patch: AttendancePatch) {
        if let Some(v) = patch.is_at_event {
            self.is_at_event = v;
        }
        if let Some(v) = patch.entered_at {
            self.entered_at = v;
        }
        if let Some(v) = patch.exited_at {
            self.exited_at = v;
        }
        if let Some(v) = patch.total_time_at_event {
            self.total_time_at_event = v;
        }
        if let Some(v) = patch.last_checked_at {
            self.last_checked_at = v;
        }
    }
}

impl AttendancePatch {
    pub fn enter(now: DateTime<Utc>) -> Self {
        Self {
            is_at_event: Some(true),
            entered_at: Some(Some(now)),
            exited_at: Some(None),
            ..Default::default()
        }
    }

    /// Exit transition. `entered_at` is cleared so that it stays set only
    /// while the record is inside.
    pub fn exit(now: DateTime<Utc>, total_time_at_event: i64) -> Self {
        Self {
            is_at_event: Some(false),
            entered_at: Some(None),
            exited_at: Some(Some(now)),
            total_time_at_event: Some(total_time_at_event),
            ..Default::default()
        }
    }

    pub fn unchanged(is_at_event: bool, now: DateTime<Utc>) -> Self {
        Self {
            is_at_event: Some(is_at_event),
            last_checked_at: Some(now),
            ..Default::default()
        }
    }
}
