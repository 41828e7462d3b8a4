pub mod attendance;
pub mod location;
pub mod service;
pub mod store;

pub use attendance::{AttendanceEngine, PassReport};
pub use location::{LocationProvider, LocationTracker, ReplayProvider, WatchOptions};
pub use service::AttendanceService;
pub use store::{EventStore, StoreChange};
