use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A circular geofence bound to an optional time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoEvent {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Fields of a new event, everything but the id (assigned by the store).
#[derive(Debug, Clone, PartialEq)]
pub struct NewGeoEvent {
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub is_active: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Partial update of an event.
///
/// `None` leaves a field untouched. Nullable fields use a nested option:
/// `Some(None)` clears the value, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoEventPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<f64>,
    pub is_active: Option<bool>,
    pub start_time: Option<Option<DateTime<Utc>>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
}

impl NewGeoEvent {
    /// Active, unbounded event with no description.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, radius_meters: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            latitude,
            longitude,
            radius_meters,
            is_active: true,
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_window(
        mut self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn into_event(self, id: String) -> GeoEvent {
        GeoEvent {
            id,
            name: self.name,
            description: self.description,
            latitude: self.latitude,
            longitude: self.longitude,
            radius_meters: self.radius_meters,
            is_active: self.is_active,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

impl GeoEvent {
    /// True when the event is flagged active and `now` falls inside the
    /// inclusive `[start_time, end_time]` window. Missing bounds are open.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(start) = self.start_time
            && now < start
        {
            return false;
        }
        if let Some(end) = self.end_time
            && now > end
        {
            return false;
        }
        true
    }

    /// A center that can be fed to the distance formula.
    pub fn has_valid_center(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    pub fn apply(&mut self, patch: GeoEventPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(latitude) = patch.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            self.longitude = longitude;
        }
        if let Some(radius) = patch.radius_meters {
            self.radius_meters = radius;
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        if let Some(start) = patch.start_time {
            self.start_time = start;
        }
        if let Some(end) = patch.end_time {
            self.end_time = end;
        }
    }
}

impl GeoEventPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
