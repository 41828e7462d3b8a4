//! Location provider seam and the subscription tracker built on it.
//!
//! Providers push fixes through a callback. The tracker queues them in
//! arrival order and hands them out in batches, so evaluation passes run
//! one after another and never overlap.

use crate::errors::{AppError, AppResult};
use crate::models::PositionFix;
use crate::storage::{KeyValueStore, LOCATION_STORAGE_KEY};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, warn};

pub const PERMISSION_DENIED: &str = "Location permission denied";
pub const PERMISSION_REQUEST_FAILED: &str = "Failed to request location permission";
pub const CURRENT_FIX_FAILED: &str = "Failed to get current location";
pub const TRACKING_START_FAILED: &str = "Failed to start location tracking";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyTier {
    Lowest,
    Low,
    Balanced,
    #[default]
    High,
    Highest,
}

/// Subscription options: fixes arrive at most every `min_interval_ms`
/// and only after moving `min_distance_meters`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WatchOptions {
    pub accuracy: AccuracyTier,
    pub min_interval_ms: u64,
    pub min_distance_meters: f64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            accuracy: AccuracyTier::High,
            min_interval_ms: 30_000,
            min_distance_meters: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(pub u64);

pub type FixSink = Box<dyn FnMut(PositionFix)>;

pub trait LocationProvider {
    /// Ask the user for permission. `Ok(false)` is a denial.
    fn request_permission(&mut self) -> AppResult<bool>;

    /// Current permission, without prompting.
    fn permission_status(&mut self) -> AppResult<bool>;

    fn current_fix(&mut self) -> AppResult<PositionFix>;

    fn subscribe(&mut self, options: WatchOptions, on_fix: FixSink) -> AppResult<SubscriptionHandle>;

    fn unsubscribe(&mut self, handle: SubscriptionHandle);
}

// ---------------------------
// Replay provider
// ---------------------------

/// Provider that replays a recorded track.
///
/// Subscribing delivers every recorded fix to the new subscriber at once.
/// Later calls to [`deliver`](ReplayProvider::deliver) fan out to every live
/// subscription.
pub struct ReplayProvider {
    fixes: Vec<PositionFix>,
    granted: bool,
    subscribers: BTreeMap<SubscriptionHandle, FixSink>,
    next_handle: u64,
}

impl ReplayProvider {
    pub fn new(fixes: Vec<PositionFix>) -> Self {
        Self {
            fixes,
            granted: true,
            subscribers: BTreeMap::new(),
            next_handle: 1,
        }
    }

    pub fn denying() -> Self {
        Self {
            granted: false,
            ..Self::new(Vec::new())
        }
    }

    /// One JSON fix per line; blank lines and `#` comments are ignored.
    pub fn from_json_lines(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        let mut fixes = Vec::new();
        for (n, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fix: PositionFix = serde_json::from_str(line).map_err(|e| {
                AppError::Location(format!("{}:{}: {}", path.display(), n + 1, e))
            })?;
            fixes.push(fix);
        }
        Ok(Self::new(fixes))
    }

    pub fn fixes(&self) -> &[PositionFix] {
        &self.fixes
    }

    pub fn live_subscriptions(&self) -> usize {
        self.subscribers.len()
    }

    pub fn deliver(&mut self, fix: PositionFix) {
        self.fixes.push(fix);
        for sink in self.subscribers.values_mut() {
            sink(fix);
        }
    }
}

impl LocationProvider for ReplayProvider {
    fn request_permission(&mut self) -> AppResult<bool> {
        Ok(self.granted)
    }

    fn permission_status(&mut self) -> AppResult<bool> {
        Ok(self.granted)
    }

    fn current_fix(&mut self) -> AppResult<PositionFix> {
        if !self.granted {
            return Err(AppError::Permission);
        }
        self.fixes
            .last()
            .copied()
            .ok_or_else(|| AppError::Location("no recorded fixes".into()))
    }

    fn subscribe(&mut self, _options: WatchOptions, mut on_fix: FixSink) -> AppResult<SubscriptionHandle> {
        if !self.granted {
            return Err(AppError::Permission);
        }
        for fix in &self.fixes {
            on_fix(*fix);
        }
        let handle = SubscriptionHandle(self.next_handle);
        self.next_handle += 1;
        self.subscribers.insert(handle, on_fix);
        Ok(handle)
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) {
        self.subscribers.remove(&handle);
    }
}

// ---------------------------
// Tracker
// ---------------------------

/// Persisted permission flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionState {
    pub has_permission: Option<bool>,
    pub permission_asked: bool,
}

/// Owns at most one live subscription on a [`LocationProvider`].
///
/// Failures never propagate: they are kept as a user-facing message in
/// [`last_error`](Self::last_error) and the queued fixes stay as they were.
pub struct LocationTracker<P: LocationProvider, S: KeyValueStore> {
    provider: P,
    kv: S,
    options: WatchOptions,
    subscription: Option<SubscriptionHandle>,
    queue: Rc<RefCell<VecDeque<PositionFix>>>,
    permission: PermissionState,
    current_fix: Option<PositionFix>,
    last_error: Option<String>,
    is_loading: bool,
}

impl<P: LocationProvider, S: KeyValueStore> LocationTracker<P, S> {
    pub fn open(provider: P, kv: S, options: WatchOptions) -> Self {
        let permission = match kv.load_named(LOCATION_STORAGE_KEY) {
            Ok(Some(v)) => serde_json::from_value(v).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unreadable location storage");
                PermissionState::default()
            }),
            Ok(None) => PermissionState::default(),
            Err(e) => {
                warn!(error = %e, "location storage unavailable");
                PermissionState::default()
            }
        };

        Self {
            provider,
            kv,
            options,
            subscription: None,
            queue: Rc::new(RefCell::new(VecDeque::new())),
            permission,
            current_fix: None,
            last_error: None,
            is_loading: false,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_tracking(&self) -> bool {
        self.subscription.is_some()
    }

    /// Latest fix handed out by [`drain_fixes`](Self::drain_fixes).
    pub fn current_fix(&self) -> Option<&PositionFix> {
        self.current_fix.as_ref()
    }

    /// Prompt for permission and start tracking when granted.
    pub fn request_permission(&mut self) -> bool {
        self.is_loading = true;
        self.last_error = None;

        let granted = match self.provider.request_permission() {
            Ok(granted) => {
                self.permission = PermissionState {
                    has_permission: Some(granted),
                    permission_asked: true,
                };
                self.save_permission();
                if granted {
                    self.start();
                } else {
                    self.last_error = Some(PERMISSION_DENIED.to_string());
                }
                granted
            }
            Err(e) => {
                warn!(error = %e, "permission request failed");
                self.last_error = Some(PERMISSION_REQUEST_FAILED.to_string());
                false
            }
        };

        self.is_loading = false;
        granted
    }

    /// Refresh the permission flag silently; start tracking if it is granted
    /// and no fix was received yet.
    pub fn check_permission_status(&mut self) {
        match self.provider.permission_status() {
            Ok(granted) => {
                self.permission.has_permission = Some(granted);
                self.save_permission();
                if granted && self.current_fix.is_none() && !self.is_tracking() {
                    self.start();
                }
            }
            Err(e) => warn!(error = %e, "permission status check failed"),
        }
    }

    /// Subscribe to the provider, replacing any live subscription, then
    /// queue an immediate fix.
    pub fn start(&mut self) {
        self.is_loading = true;
        self.last_error = None;
        self.stop();

        let queue = Rc::clone(&self.queue);
        let sink: FixSink = Box::new(move |fix| queue.borrow_mut().push_back(fix));

        match self.provider.subscribe(self.options, sink) {
            Ok(handle) => {
                debug!(handle = handle.0, "location subscription started");
                self.subscription = Some(handle);
                self.refresh_current_fix();
            }
            Err(e) => {
                warn!(error = %e, "location subscription failed");
                self.last_error = Some(TRACKING_START_FAILED.to_string());
            }
        }

        self.is_loading = false;
    }

    /// Tear down the live subscription. Safe when not subscribed.
    pub fn stop(&mut self) {
        if let Some(handle) = self.subscription.take() {
            self.provider.unsubscribe(handle);
            debug!(handle = handle.0, "location subscription stopped");
        }
    }

    /// Ask the provider for a fix right now and queue it.
    pub fn refresh_current_fix(&mut self) {
        match self.provider.current_fix() {
            Ok(fix) => self.queue.borrow_mut().push_back(fix),
            Err(e) => {
                warn!(error = %e, "could not get current location");
                self.last_error = Some(CURRENT_FIX_FAILED.to_string());
            }
        }
    }

    /// Take every queued fix in arrival order.
    pub fn drain_fixes(&mut self) -> Vec<PositionFix> {
        let fixes: Vec<PositionFix> = self.queue.borrow_mut().drain(..).collect();
        if let Some(last) = fixes.last() {
            self.current_fix = Some(*last);
        }
        fixes
    }

    /// Forget permission flags, the live fix and any error.
    pub fn reset(&mut self) {
        self.stop();
        self.queue.borrow_mut().clear();
        self.permission = PermissionState::default();
        self.current_fix = None;
        self.last_error = None;
        self.is_loading = false;
        self.save_permission();
    }

    fn save_permission(&self) {
        let result = serde_json::to_value(self.permission)
            .map_err(AppError::from)
            .and_then(|v| self.kv.save_named(LOCATION_STORAGE_KEY, &v));
        if let Err(e) = result {
            warn!(error = %e, "location storage save failed");
        }
    }
}

impl<P: LocationProvider, S: KeyValueStore> Drop for LocationTracker<P, S> {
    fn drop(&mut self) {
        self.stop();
    }
}
