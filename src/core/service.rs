//! Wiring of a location tracker to the attendance engine.

use super::attendance::{AttendanceEngine, PassReport};
use super::location::{LocationProvider, LocationTracker, WatchOptions};
use super::store::EventStore;
use crate::models::PositionFix;
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};

pub struct AttendanceService<P: LocationProvider, S: KeyValueStore + Clone> {
    tracker: LocationTracker<P, S>,
    engine: AttendanceEngine<S>,
}

impl<P: LocationProvider, S: KeyValueStore + Clone> AttendanceService<P, S> {
    /// Both the event store and the permission flags live in `kv`.
    pub fn open(provider: P, kv: S, options: WatchOptions) -> Self {
        let engine = AttendanceEngine::new(EventStore::open(kv.clone()));
        let tracker = LocationTracker::open(provider, kv, options);
        Self { tracker, engine }
    }

    pub fn tracker(&self) -> &LocationTracker<P, S> {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut LocationTracker<P, S> {
        &mut self.tracker
    }

    pub fn engine(&self) -> &AttendanceEngine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AttendanceEngine<S> {
        &mut self.engine
    }

    /// Process every queued fix in arrival order, one full pass per fix.
    /// `clock` supplies the evaluation time of each fix.
    pub fn pump<F>(&mut self, clock: F) -> Vec<PassReport>
    where
        F: Fn(&PositionFix) -> DateTime<Utc>,
    {
        self.tracker
            .drain_fixes()
            .into_iter()
            .map(|fix| {
                let now = clock(&fix);
                self.engine.process_fix(fix, now)
            })
            .collect()
    }

    /// [`pump`](Self::pump) with the same evaluation time for every fix.
    pub fn pump_at(&mut self, now: DateTime<Utc>) -> Vec<PassReport> {
        self.pump(|_| now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::location::ReplayProvider;
    use crate::models::NewGeoEvent;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};
    use std::rc::Rc;

    #[test]
    fn replayed_track_accrues_dwell_time() {
        let t0 = Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap();
        let fixes = vec![
            PositionFix::new(0.0, 0.0, t0),
            PositionFix::new(0.0, 0.0002, t0 + Duration::minutes(4)),
            PositionFix::new(0.0, 0.01, t0 + Duration::minutes(9)),
        ];
        let kv = Rc::new(MemoryStore::new());
        let mut service =
            AttendanceService::open(ReplayProvider::new(fixes), Rc::clone(&kv), WatchOptions::default());
        let id = service
            .engine_mut()
            .store_mut()
            .add_event(NewGeoEvent::new("Market", 0.0, 0.0, 100.0), t0);

        assert!(service.tracker_mut().request_permission());
        let reports = service.pump(|fix| fix.timestamp);

        // three replayed fixes and the duplicate current fix
        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0].entered, vec![id.clone()]);
        assert_eq!(reports[2].exited, vec![id.clone()]);
        assert!(!reports[3].has_transitions());

        let end = t0 + Duration::minutes(20);
        assert_eq!(service.engine().get_total_time_at_event(&id, end), 9);
        assert_eq!(
            service.engine().current_fix().map(|f| f.longitude),
            Some(0.01)
        );
    }

    #[test]
    fn denied_permission_leaves_the_engine_idle() {
        let kv = Rc::new(MemoryStore::new());
        let mut service =
            AttendanceService::open(ReplayProvider::denying(), kv, WatchOptions::default());
        let now = Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap();
        service
            .engine_mut()
            .store_mut()
            .add_event(NewGeoEvent::new("Market", 0.0, 0.0, 100.0), now);

        service.tracker_mut().request_permission();

        assert!(service.pump_at(now).is_empty());
        assert!(service.engine().store().attendance().is_empty());
        assert!(service.tracker().last_error().is_some());
    }
}
