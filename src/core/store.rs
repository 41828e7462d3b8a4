//! Event catalog and attendance records, with write-through persistence.
//!
//! The store is the single source of truth for events and attendance. It
//! loads its state once when opened and saves the whole durable subset
//! after every mutation. Persistence failures never reach the caller: the
//! in-memory state stays authoritative and the save is retried on the next
//! mutation.

use crate::errors::{AppError, AppResult};
use crate::models::{AttendancePatch, AttendanceRecord, GeoEvent, GeoEventPatch, NewGeoEvent};
use crate::storage::{EVENT_STORAGE_KEY, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The persisted subset of the store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    events: Vec<GeoEvent>,
    #[serde(default)]
    attendance: BTreeMap<String, AttendanceRecord>,
}

/// What changed, as reported to observers after every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    EventAdded(String),
    EventUpdated(String),
    EventRemoved(String),
    AttendanceChanged(String),
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Resolved attendance write: a brand new record built on the defaults, or
/// the existing record with the patch applied on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceUpsert {
    Insert(AttendanceRecord),
    Update(AttendanceRecord),
}

impl AttendanceUpsert {
    pub fn record(&self) -> &AttendanceRecord {
        match self {
            AttendanceUpsert::Insert(r) | AttendanceUpsert::Update(r) => r,
        }
    }

    fn into_record(self) -> AttendanceRecord {
        match self {
            AttendanceUpsert::Insert(r) | AttendanceUpsert::Update(r) => r,
        }
    }
}

type Observer = Box<dyn FnMut(&StoreChange)>;

pub struct EventStore<S: KeyValueStore> {
    kv: S,
    events: Vec<GeoEvent>,
    attendance: BTreeMap<String, AttendanceRecord>,
    last_id: i64,
    dirty: bool,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl<S: KeyValueStore> EventStore<S> {
    /// Open the store on top of `kv`, loading whatever was saved before.
    /// An unreadable slot is moved aside (never overwritten) and the store
    /// starts empty.
    pub fn open(kv: S) -> Self {
        let loaded = kv.load_named(EVENT_STORAGE_KEY).and_then(|blob| {
            blob.map(serde_json::from_value::<Snapshot>)
                .transpose()
                .map_err(AppError::from)
        });

        let snapshot = match loaded {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "event storage unreadable, starting empty");
                match kv.quarantine(EVENT_STORAGE_KEY) {
                    Ok(Some(aside)) => warn!(kept_at = %aside, "unreadable event storage moved aside"),
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "could not move unreadable event storage aside"),
                }
                Snapshot::default()
            }
        };

        let last_id = snapshot
            .events
            .iter()
            .filter_map(|e| e.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        debug!(
            events = snapshot.events.len(),
            records = snapshot.attendance.len(),
            "event store loaded"
        );

        Self {
            kv,
            events: snapshot.events,
            attendance: snapshot.attendance,
            last_id,
            dirty: false,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    // ---------------------------
    // Events
    // ---------------------------

    /// Append a new event and return its id.
    ///
    /// Ids are the creation time in milliseconds, bumped past the last
    /// issued id so that calls within the same millisecond stay unique.
    pub fn add_event(&mut self, event: NewGeoEvent, now: DateTime<Utc>) -> String {
        let candidate = now.timestamp_millis();
        let id_num = if candidate > self.last_id {
            candidate
        } else {
            self.last_id + 1
        };
        self.last_id = id_num;

        let id = id_num.to_string();
        self.events.push(event.into_event(id.clone()));
        debug!(event_id = %id, "event added");

        self.commit(StoreChange::EventAdded(id.clone()));
        id
    }

    /// Merge `patch` into the event. Returns `false` (and changes nothing)
    /// when the id is unknown.
    pub fn update_event(&mut self, id: &str, patch: GeoEventPatch) -> bool {
        let Some(event) = self.events.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        event.apply(patch);
        self.commit(StoreChange::EventUpdated(id.to_string()));
        true
    }

    /// Delete the event together with its attendance record.
    pub fn remove_event(&mut self, id: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        let removed_event = self.events.len() != before;
        let removed_record = self.attendance.remove(id).is_some();

        if !removed_event && !removed_record {
            return false;
        }
        self.commit(StoreChange::EventRemoved(id.to_string()));
        true
    }

    pub fn get_event(&self, id: &str) -> Option<&GeoEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Like [`get_event`](Self::get_event), but unknown ids are an error.
    pub fn require_event(&self, id: &str) -> AppResult<&GeoEvent> {
        self.get_event(id)
            .ok_or_else(|| AppError::EventNotFound(id.to_string()))
    }

    /// All events in insertion order.
    pub fn events(&self) -> &[GeoEvent] {
        &self.events
    }

    /// Events flagged active whose window contains `now`, in insertion order.
    pub fn get_active_events(&self, now: DateTime<Utc>) -> Vec<GeoEvent> {
        self.events
            .iter()
            .filter(|e| e.is_active_at(now))
            .cloned()
            .collect()
    }

    // ---------------------------
    // Attendance
    // ---------------------------

    /// Resolve an attendance write without applying it.
    ///
    /// Fill order: defaults (outside, zero minutes, checked now), then the
    /// existing record, then `last_checked_at = now`, then the patch. Every
    /// write refreshes `last_checked_at` unless the patch carries its own.
    pub fn plan_upsert(
        &self,
        event_id: &str,
        patch: AttendancePatch,
        now: DateTime<Utc>,
    ) -> AttendanceUpsert {
        match self.attendance.get(event_id) {
            None => {
                let mut record = AttendanceRecord::outside(event_id, now);
                record.apply(patch);
                AttendanceUpsert::Insert(record)
            }
            Some(existing) => {
                let mut record = existing.clone();
                record.last_checked_at = now;
                record.apply(patch);
                AttendanceUpsert::Update(record)
            }
        }
    }

    pub fn upsert_attendance(
        &mut self,
        event_id: &str,
        patch: AttendancePatch,
        now: DateTime<Utc>,
    ) -> &AttendanceRecord {
        let op = self.plan_upsert(event_id, patch, now);
        if let AttendanceUpsert::Insert(_) = op {
            debug!(event_id, "attendance record created");
        }

        self.attendance
            .insert(event_id.to_string(), op.into_record());
        self.commit(StoreChange::AttendanceChanged(event_id.to_string()));

        &self.attendance[event_id]
    }

    pub fn get_attendance(&self, event_id: &str) -> Option<&AttendanceRecord> {
        self.attendance.get(event_id)
    }

    pub fn attendance(&self) -> &BTreeMap<String, AttendanceRecord> {
        &self.attendance
    }

    /// Drop every event and every attendance record.
    pub fn reset_all(&mut self) {
        self.events.clear();
        self.attendance.clear();
        self.commit(StoreChange::Reset);
    }

    // ---------------------------
    // Observers
    // ---------------------------

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&StoreChange) + 'static,
    {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    // ---------------------------
    // Persistence
    // ---------------------------

    /// True while the last save attempt failed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Save now and report the outcome, for callers that want to know.
    pub fn flush(&mut self) -> AppResult<()> {
        let result = self.save();
        self.dirty = result.is_err();
        result
    }

    fn save(&self) -> AppResult<()> {
        let value = serde_json::json!({
            "events": &self.events,
            "attendance": &self.attendance,
        });
        self.kv.save_named(EVENT_STORAGE_KEY, &value)
    }

    fn commit(&mut self, change: StoreChange) {
        let retrying = self.dirty;
        match self.save() {
            Ok(()) => {
                if retrying {
                    debug!("pending event storage save succeeded");
                }
                self.dirty = false;
            }
            Err(e) => {
                warn!(error = %e, "event storage save failed, will retry on next change");
                self.dirty = true;
            }
        }

        for (_, observer) in self.observers.iter_mut() {
            observer(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{Duration, TimeZone};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 10, 0, 0).unwrap()
    }

    fn fair() -> NewGeoEvent {
        NewGeoEvent::new("Fair", 0.0, 0.0, 100.0)
    }

    fn open_mem() -> (Rc<MemoryStore>, EventStore<Rc<MemoryStore>>) {
        let kv = Rc::new(MemoryStore::new());
        let store = EventStore::open(Rc::clone(&kv));
        (kv, store)
    }

    #[test]
    fn ids_are_unique_within_the_same_millisecond() {
        let (_, mut store) = open_mem();
        let a = store.add_event(fair(), t0());
        let b = store.add_event(fair(), t0());
        let c = store.add_event(fair(), t0() - Duration::seconds(5));

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(store.events().len(), 3);
        assert_eq!(a, t0().timestamp_millis().to_string());
    }

    #[test]
    fn update_merges_and_ignores_unknown_ids() {
        let (_, mut store) = open_mem();
        let id = store.add_event(fair(), t0());

        assert!(store.update_event(
            &id,
            GeoEventPatch {
                name: Some("County fair".into()),
                ..Default::default()
            }
        ));
        assert!(!store.update_event("nope", GeoEventPatch::default()));

        let ev = store.get_event(&id).unwrap();
        assert_eq!(ev.name, "County fair");
        assert_eq!(ev.radius_meters, 100.0);
    }

    #[test]
    fn remove_cascades_to_attendance() {
        let (_, mut store) = open_mem();
        let id = store.add_event(fair(), t0());
        store.upsert_attendance(&id, AttendancePatch::enter(t0()), t0());

        assert!(store.remove_event(&id));
        assert!(store.get_attendance(&id).is_none());
        assert!(store.get_active_events(t0()).is_empty());
        assert!(!store.remove_event(&id));
    }

    #[test]
    fn active_events_keep_insertion_order_and_respect_windows() {
        let (_, mut store) = open_mem();
        let past = store.add_event(
            fair().with_window(None, Some(t0() - Duration::hours(1))),
            t0(),
        );
        let b = store.add_event(NewGeoEvent::new("B", 1.0, 1.0, 10.0), t0());
        let future = store.add_event(
            fair().with_window(Some(t0() + Duration::hours(1)), None),
            t0(),
        );
        let a = store.add_event(NewGeoEvent::new("A", 2.0, 2.0, 10.0), t0());
        let off = store.add_event(fair(), t0());
        store.update_event(
            &off,
            GeoEventPatch {
                is_active: Some(false),
                ..Default::default()
            },
        );

        let ids: Vec<String> = store
            .get_active_events(t0())
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![b, a]);
        assert!(!ids.contains(&past));
        assert!(!ids.contains(&future));
    }

    #[test]
    fn first_upsert_synthesizes_defaults() {
        let (_, mut store) = open_mem();
        let rec = store
            .upsert_attendance("42", AttendancePatch::default(), t0())
            .clone();

        assert_eq!(rec, AttendanceRecord::outside("42", t0()));
    }

    #[test]
    fn plan_upsert_tags_insert_and_update() {
        let (_, mut store) = open_mem();
        assert!(matches!(
            store.plan_upsert("1", AttendancePatch::default(), t0()),
            AttendanceUpsert::Insert(_)
        ));

        store.upsert_attendance("1", AttendancePatch::enter(t0()), t0());
        let later = t0() + Duration::minutes(3);
        let op = store.plan_upsert("1", AttendancePatch::default(), later);

        assert!(matches!(op, AttendanceUpsert::Update(_)));
        assert!(op.record().is_at_event);
        assert_eq!(op.record().entered_at, Some(t0()));
        assert_eq!(op.record().last_checked_at, later);
    }

    #[test]
    fn every_update_refreshes_last_checked_unless_supplied() {
        let (_, mut store) = open_mem();
        store.upsert_attendance("1", AttendancePatch::enter(t0()), t0());

        let t1 = t0() + Duration::minutes(1);
        let rec = store.upsert_attendance(
            "1",
            AttendancePatch {
                total_time_at_event: Some(3),
                ..Default::default()
            },
            t1,
        );
        assert_eq!(rec.last_checked_at, t1);

        let explicit = t0() - Duration::days(1);
        let rec = store.upsert_attendance(
            "1",
            AttendancePatch {
                last_checked_at: Some(explicit),
                ..Default::default()
            },
            t1 + Duration::minutes(1),
        );
        assert_eq!(rec.last_checked_at, explicit);
        assert_eq!(rec.total_time_at_event, 3);
    }

    #[test]
    fn reset_clears_everything() {
        let (_, mut store) = open_mem();
        let id = store.add_event(fair(), t0());
        store.upsert_attendance(&id, AttendancePatch::enter(t0()), t0());

        store.reset_all();

        assert!(store.events().is_empty());
        assert!(store.attendance().is_empty());
    }

    #[test]
    fn state_survives_reopen() {
        let (kv, mut store) = open_mem();
        let id = store.add_event(fair(), t0());
        store.upsert_attendance(&id, AttendancePatch::enter(t0()), t0());
        drop(store);

        let mut reopened = EventStore::open(Rc::clone(&kv));
        assert_eq!(reopened.events().len(), 1);
        assert!(reopened.get_attendance(&id).unwrap().is_at_event);

        // ids keep increasing after a reload
        let next = reopened.add_event(fair(), t0());
        assert!(next.parse::<i64>().unwrap() > id.parse::<i64>().unwrap());
    }

    #[test]
    fn failed_save_is_retried_on_next_mutation() {
        let (kv, mut store) = open_mem();
        kv.set_fail_saves(true);

        let id = store.add_event(fair(), t0());
        assert!(store.is_dirty());
        assert_eq!(store.get_event(&id).map(|e| e.name.as_str()), Some("Fair"));
        assert!(kv.slot(EVENT_STORAGE_KEY).is_none());

        kv.set_fail_saves(false);
        store.upsert_attendance(&id, AttendancePatch::enter(t0()), t0());

        assert!(!store.is_dirty());
        let saved = kv.slot(EVENT_STORAGE_KEY).unwrap();
        assert_eq!(saved["events"].as_array().unwrap().len(), 1);
        assert_eq!(saved["attendance"][&id]["is_at_event"], true);
    }

    #[test]
    fn unavailable_storage_starts_empty() {
        let kv = Rc::new(MemoryStore::new());
        kv.set_fail_loads(true);
        let mut store = EventStore::open(Rc::clone(&kv));

        assert!(store.events().is_empty());
        store.add_event(fair(), t0());
        assert_eq!(kv.save_count(), 1);
    }

    #[test]
    fn unreadable_snapshot_is_set_aside_before_first_save() {
        let broken = serde_json::json!({ "events": "not a list" });
        let kv = Rc::new(MemoryStore::new().with_slot(EVENT_STORAGE_KEY, broken.clone()));
        let mut store = EventStore::open(Rc::clone(&kv));

        assert!(store.events().is_empty());
        assert_eq!(kv.quarantined(), vec![(EVENT_STORAGE_KEY.to_string(), broken)]);

        store.add_event(fair(), t0());
        let saved = kv.slot(EVENT_STORAGE_KEY).unwrap();
        assert_eq!(saved["events"].as_array().unwrap().len(), 1);
        assert_eq!(kv.quarantined().len(), 1);
    }

    #[test]
    fn observers_see_every_change_until_unsubscribed() {
        let (_, mut store) = open_mem();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let obs = store.subscribe(move |c| sink.borrow_mut().push(c.clone()));

        let id = store.add_event(fair(), t0());
        store.upsert_attendance(&id, AttendancePatch::enter(t0()), t0());
        assert!(store.unsubscribe(obs));
        store.reset_all();

        assert_eq!(
            *seen.borrow(),
            vec![
                StoreChange::EventAdded(id.clone()),
                StoreChange::AttendanceChanged(id),
            ]
        );
    }
}
