pub mod formatting;
pub mod geo;
pub mod path;
pub mod table;
pub mod time;

pub use formatting::mins2readable;
pub use geo::{distance_meters, format_distance, is_within_radius};
pub use time::minutes_between;
