//! Formatting utilities used for CLI and export outputs.

use ansi_term::Colour;

pub fn pad_right(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

/// `02h 25m` (long) or `02:25` (short).
pub fn mins2readable(mins: i64, short: bool) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let abs_m = mins.abs();
    let hours = abs_m / 60;
    let minutes = abs_m % 60;

    if short {
        format!("{}{:02}:{:02}", sign, hours, minutes)
    } else {
        format!("{}{:02}h {:02}m", sign, hours, minutes)
    }
}

/// Label and colour for a containment flag.
pub fn describe_presence(is_at_event: bool) -> (&'static str, Colour) {
    if is_at_event {
        ("inside", Colour::Green)
    } else {
        ("outside", Colour::Fixed(245))
    }
}
