pub mod attendance;
pub mod geo_event;
pub mod position;
pub mod status;
pub mod transition;

pub use attendance::{AttendancePatch, AttendanceRecord};
pub use geo_event::{GeoEvent, GeoEventPatch, NewGeoEvent};
pub use position::PositionFix;
pub use status::EventStatus;
pub use transition::Transition;
