//! Attendance engine: turns position fixes into enter/exit transitions and
//! dwell time.
//!
//! Every event is a two-state machine (outside / inside). One evaluation
//! pass walks the active events in catalog order and fires exactly one of
//! enter, exit or unchanged per event. Dwell time is credited only on exit;
//! the open session is projected at read time and never written back.

use super::store::EventStore;
use crate::errors::{AppError, AppResult};
use crate::models::{
    AttendancePatch, EventStatus, GeoEvent, PositionFix, Transition,
};
use crate::storage::KeyValueStore;
use crate::utils::geo::{distance_meters, is_within_radius};
use crate::utils::time::minutes_between;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Summary of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Events evaluated (transition or not).
    pub evaluated: usize,
    pub entered: Vec<String>,
    pub exited: Vec<String>,
    /// Events left untouched because their record was malformed.
    pub skipped: Vec<String>,
    /// The fix itself was unusable; nothing was evaluated.
    pub fix_rejected: bool,
}

impl PassReport {
    pub fn has_transitions(&self) -> bool {
        !self.entered.is_empty() || !self.exited.is_empty()
    }
}

pub struct AttendanceEngine<S: KeyValueStore> {
    store: EventStore<S>,
    current_fix: Option<PositionFix>,
}

impl<S: KeyValueStore> AttendanceEngine<S> {
    /// Containment state starts from whatever records the store loaded.
    pub fn new(store: EventStore<S>) -> Self {
        Self {
            store,
            current_fix: None,
        }
    }

    pub fn store(&self) -> &EventStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EventStore<S> {
        &mut self.store
    }

    pub fn current_fix(&self) -> Option<&PositionFix> {
        self.current_fix.as_ref()
    }

    /// Remember `fix` as the live position without evaluating anything.
    pub fn observe_fix(&mut self, fix: PositionFix) {
        self.current_fix = Some(fix);
    }

    /// Record `fix` as the live position and run one evaluation pass.
    ///
    /// A fix with non-finite coordinates is rejected: the previous live fix
    /// and every attendance record stay as they were.
    pub fn process_fix(&mut self, fix: PositionFix, now: DateTime<Utc>) -> PassReport {
        let report = self.check_event_attendance(&fix, now);
        if !report.fix_rejected {
            self.current_fix = Some(fix);
        }
        report
    }

    /// One evaluation pass over the events active at `now`. An unusable fix
    /// evaluates nothing, so it can never be read as leaving an event.
    pub fn check_event_attendance(&mut self, fix: &PositionFix, now: DateTime<Utc>) -> PassReport {
        if !(fix.latitude.is_finite() && fix.longitude.is_finite()) {
            warn!(
                lat = fix.latitude,
                lon = fix.longitude,
                "ignoring position fix with invalid coordinates"
            );
            return PassReport {
                fix_rejected: true,
                ..Default::default()
            };
        }

        let mut report = PassReport::default();

        for event in self.store.get_active_events(now) {
            match self.evaluate(&event, fix, now) {
                Ok(transition) => {
                    report.evaluated += 1;
                    match transition {
                        Transition::Enter => report.entered.push(event.id),
                        Transition::Exit => report.exited.push(event.id),
                        Transition::Unchanged => {}
                    }
                }
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "skipping event");
                    report.skipped.push(event.id);
                }
            }
        }

        report
    }

    fn evaluate(
        &mut self,
        event: &GeoEvent,
        fix: &PositionFix,
        now: DateTime<Utc>,
    ) -> AppResult<Transition> {
        if !event.has_valid_center() {
            return Err(AppError::InvalidCoordinate(format!(
                "event '{}' has center ({}, {})",
                event.id, event.latitude, event.longitude
            )));
        }

        let is_at_event = is_within_radius(
            fix.latitude,
            fix.longitude,
            event.latitude,
            event.longitude,
            event.radius_meters,
        );

        let previous = self.store.get_attendance(&event.id).cloned();
        let was_at_event = previous.as_ref().is_some_and(|r| r.is_at_event);
        let transition = Transition::between(was_at_event, is_at_event);

        let patch = match transition {
            Transition::Enter => {
                debug!(event_id = %event.id, "entered event");
                AttendancePatch::enter(now)
            }
            Transition::Exit => {
                let prior_total = previous.as_ref().map_or(0, |r| r.total_time_at_event);
                // An inside record without an entry time credits nothing.
                let session = previous
                    .as_ref()
                    .and_then(|r| r.entered_at)
                    .map_or(0, |entered| minutes_between(entered, now).max(0));
                debug!(event_id = %event.id, minutes = session, "left event");
                AttendancePatch::exit(now, prior_total + session)
            }
            Transition::Unchanged => AttendancePatch::unchanged(is_at_event, now),
        };

        self.store.upsert_attendance(&event.id, patch, now);
        Ok(transition)
    }

    // ---------------------------
    // Read-only projections
    // ---------------------------

    /// Containment, live distance, event and record for one event.
    /// No live fix or an unknown id yields [`EventStatus::no_data`].
    pub fn get_event_status(&self, event_id: &str) -> EventStatus {
        let (Some(event), Some(fix)) = (self.store.get_event(event_id), self.current_fix) else {
            return EventStatus::no_data();
        };

        let attendance = self.store.get_attendance(event_id).cloned();
        EventStatus {
            is_at_event: attendance.as_ref().is_some_and(|r| r.is_at_event),
            distance_meters: Some(distance_meters(
                fix.latitude,
                fix.longitude,
                event.latitude,
                event.longitude,
            )),
            event: Some(event.clone()),
            attendance,
        }
    }

    /// Status of every event active at `now`, in catalog order. The event is
    /// always filled in, even when there is no live fix yet.
    ///
    /// Without a live fix this is not the bare no-data shape: the stored
    /// record and its containment flag are reported, so a status listing in
    /// a fresh process reflects the persisted state. Only the distance stays
    /// empty.
    pub fn get_all_event_statuses(&self, now: DateTime<Utc>) -> Vec<EventStatus> {
        self.store
            .get_active_events(now)
            .into_iter()
            .map(|event| {
                let mut status = self.get_event_status(&event.id);
                if status.attendance.is_none() {
                    status.attendance = self.store.get_attendance(&event.id).cloned();
                    status.is_at_event = status.attendance.as_ref().is_some_and(|r| r.is_at_event);
                }
                status.event = Some(event);
                status
            })
            .collect()
    }

    /// Completed minutes plus, while inside, the open session up to `now`.
    pub fn get_total_time_at_event(&self, event_id: &str, now: DateTime<Utc>) -> i64 {
        let Some(record) = self.store.get_attendance(event_id) else {
            return 0;
        };

        let open_session = match (record.is_at_event, record.entered_at) {
            (true, Some(entered)) => minutes_between(entered, now).max(0),
            _ => 0,
        };
        record.total_time_at_event + open_session
    }
}
