use crate::export::ExportFormat;
use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for geoattend
/// Track attendance at geofenced events from position fixes
#[derive(Parser)]
#[command(
    name = "geoattend",
    version = env!("CARGO_PKG_VERSION"),
    about = "Geofenced event attendance: feed position fixes, track enter/exit and time spent at events",
    long_about = None
)]
pub struct Cli {
    /// Override the data directory; relative paths are taken from the config directory
    #[arg(global = true, long = "data-dir")]
    pub data_dir: Option<String>,

    /// Evaluate as if the current time were this (RFC 3339 or "YYYY-MM-DD HH:MM", UTC)
    #[arg(global = true, long = "at")]
    pub at: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration file and the data directory
    Init,

    /// Show the configuration
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "path", help = "Print the configuration file path")]
        path: bool,
    },

    /// Manage geofenced events
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Process a single position fix
    Fix {
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        #[arg(allow_negative_numbers = true)]
        lon: f64,

        #[arg(long = "accuracy", help = "Horizontal accuracy in meters")]
        accuracy: Option<f64>,
    },

    /// Replay a recorded track (one JSON fix per line) through the engine
    Track {
        #[arg(long = "replay", value_name = "FILE")]
        replay: String,
    },

    /// Show attendance status of the active events
    Status {
        #[arg(long = "event", help = "Only this event id")]
        event: Option<String>,

        #[arg(long = "lat", allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,

        #[arg(long = "lon", allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,
    },

    /// Remove every event and every attendance record
    Reset {
        #[arg(long = "yes", help = "Confirm the reset")]
        yes: bool,
    },

    /// Export attendance per event
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum EventAction {
    /// Add a new event
    Add {
        name: String,

        #[arg(long = "lat", allow_negative_numbers = true)]
        lat: f64,

        #[arg(long = "lon", allow_negative_numbers = true)]
        lon: f64,

        #[arg(long = "radius", help = "Geofence radius in meters (default from config)")]
        radius: Option<f64>,

        #[command(flatten)]
        details: EventDetails,

        #[arg(long = "inactive", help = "Create the event disabled")]
        inactive: bool,
    },

    /// Update fields of an existing event
    Update {
        id: String,

        #[arg(long = "name")]
        name: Option<String>,

        #[arg(long = "lat", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long = "lon", allow_negative_numbers = true)]
        lon: Option<f64>,

        #[arg(long = "radius")]
        radius: Option<f64>,

        #[command(flatten)]
        details: EventDetails,

        #[arg(long = "active", conflicts_with = "inactive")]
        active: bool,

        #[arg(long = "inactive")]
        inactive: bool,

        #[arg(long = "clear-window", help = "Remove start and end time")]
        clear_window: bool,
    },

    /// Remove an event and its attendance record
    Remove { id: String },

    /// List all events
    List,
}

#[derive(Args, Default)]
pub struct EventDetails {
    #[arg(long = "description")]
    pub description: Option<String>,

    #[arg(long = "start", help = "Window start (RFC 3339 or YYYY-MM-DD HH:MM)")]
    pub start: Option<String>,

    #[arg(long = "end", help = "Window end (RFC 3339 or YYYY-MM-DD HH:MM)")]
    pub end: Option<String>,
}
