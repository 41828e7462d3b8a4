//! User-facing console messages.
//!
//! Diagnostics go through `tracing`; these helpers are for the lines the
//! user is meant to read.

use ansi_term::{Colour, Style};
use std::fmt;

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";
const ICON_ERR: &str = "❌";
const ICON_ENTER: &str = "📍";
const ICON_EXIT: &str = "🚶";

fn tag(colour: Colour, icon: &str) -> String {
    Style::new().bold().fg(colour).paint(icon).to_string()
}

pub fn info<T: fmt::Display>(msg: T) {
    println!("{} {}", tag(Colour::Blue, ICON_INFO), msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{} {}", tag(Colour::Green, ICON_OK), msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{} {}", tag(Colour::Yellow, ICON_WARN), msg);
}

pub fn error<T: fmt::Display>(msg: T) {
    eprintln!("{} {}", tag(Colour::Red, ICON_ERR), msg);
}

pub fn entered<T: fmt::Display>(event: T) {
    println!("{} entered {}", tag(Colour::Green, ICON_ENTER), event);
}

pub fn exited<T: fmt::Display>(event: T, minutes: i64) {
    println!(
        "{} left {} (total {} min)",
        tag(Colour::Purple, ICON_EXIT),
        event,
        minutes
    );
}

pub fn header<T: fmt::Display>(msg: T) {
    println!("{}", Colour::Blue.bold().paint(format!("=== {msg} ===")));
}
