use crate::cli::commands::Context;
use crate::cli::parser::{Commands, EventAction, EventDetails};
use crate::errors::{AppError, AppResult};
use crate::models::{GeoEvent, GeoEventPatch, NewGeoEvent};
use crate::ui::messages::{info, success, warning};
use crate::utils::format_distance;
use crate::utils::geo::{check_lat, check_lon, check_radius};
use crate::utils::table::{Column, Table};
use crate::utils::time::{format_timestamp, parse_optional_datetime};
use chrono::{DateTime, Utc};

fn check_window(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> AppResult<()> {
    if let (Some(s), Some(e)) = (start, end)
        && e < s
    {
        return Err(AppError::InvalidDate(format!(
            "end {} is before start {}",
            e.to_rfc3339(),
            s.to_rfc3339()
        )));
    }
    Ok(())
}

/// Manage events: add, update, remove, list.
pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    let Commands::Event { action } = cmd else {
        return Ok(());
    };

    let mut engine = ctx.open_engine();
    let store = engine.store_mut();

    match action {
        EventAction::Add {
            name,
            lat,
            lon,
            radius,
            details,
            inactive,
        } => {
            let EventDetails {
                description,
                start,
                end,
            } = details;

            let start_time = parse_optional_datetime(start.as_ref())?;
            let end_time = parse_optional_datetime(end.as_ref())?;
            check_window(start_time, end_time)?;

            let new_event = NewGeoEvent {
                name: name.clone(),
                description: description.clone(),
                latitude: check_lat(*lat)?,
                longitude: check_lon(*lon)?,
                radius_meters: check_radius(radius.unwrap_or(ctx.cfg.default_radius_meters))?,
                is_active: !*inactive,
                start_time,
                end_time,
            };

            let id = store.add_event(new_event, ctx.now);
            success(format!("Added event '{}' with id {}", name, id));
        }

        EventAction::Update {
            id,
            name,
            lat,
            lon,
            radius,
            details,
            active,
            inactive,
            clear_window,
        } => {
            let mut patch = GeoEventPatch {
                name: name.clone(),
                latitude: lat.map(check_lat).transpose()?,
                longitude: lon.map(check_lon).transpose()?,
                radius_meters: radius.map(check_radius).transpose()?,
                description: details.description.clone().map(Some),
                ..Default::default()
            };

            if *active {
                patch.is_active = Some(true);
            } else if *inactive {
                patch.is_active = Some(false);
            }

            if *clear_window {
                patch.start_time = Some(None);
                patch.end_time = Some(None);
            }
            if let Some(s) = parse_optional_datetime(details.start.as_ref())? {
                patch.start_time = Some(Some(s));
            }
            if let Some(e) = parse_optional_datetime(details.end.as_ref())? {
                patch.end_time = Some(Some(e));
            }

            if patch.is_empty() {
                warning("Nothing to update.");
                return Ok(());
            }

            // the window is checked as it will be after the merge
            if let Some(current) = store.get_event(id) {
                check_window(
                    patch.start_time.unwrap_or(current.start_time),
                    patch.end_time.unwrap_or(current.end_time),
                )?;
            }

            if store.update_event(id, patch) {
                success(format!("Event {} updated.", id));
            } else {
                warning(format!("No event with id {}; nothing changed.", id));
            }
        }

        EventAction::Remove { id } => {
            if store.remove_event(id) {
                success(format!("Event {} removed.", id));
            } else {
                warning(format!("No event with id {}; nothing removed.", id));
            }
        }

        EventAction::List => {
            if store.events().is_empty() {
                info("No events defined.");
                return Ok(());
            }
            println!("{}", render_events(store.events(), ctx));
        }
    }

    Ok(())
}

fn render_events(events: &[GeoEvent], ctx: &Context) -> String {
    let mut table = Table::new(vec![
        Column::new("ID", 14),
        Column::new("NAME", 20),
        Column::new("CENTER", 22),
        Column::new("RADIUS", 8),
        Column::new("ACTIVE", 6),
        Column::new("START", 16),
        Column::new("END", 16),
    ]);

    for ev in events {
        table.add_row(vec![
            ev.id.clone(),
            ev.name.clone(),
            format!("{:.5}, {:.5}", ev.latitude, ev.longitude),
            format_distance(ev.radius_meters),
            if ev.is_active_at(ctx.now) { "yes" } else { "no" }.to_string(),
            format_timestamp(ev.start_time),
            format_timestamp(ev.end_time),
        ]);
    }

    table.render()
}
