use crate::cli::commands::Context;
use crate::cli::parser::Commands;
use crate::core::AttendanceEngine;
use crate::errors::{AppError, AppResult};
use crate::models::{EventStatus, PositionFix};
use crate::storage::JsonFileStore;
use crate::ui::messages::{header, info};
use crate::utils::formatting::{describe_presence, mins2readable, pad_right};
use crate::utils::table::{Column, Table};
use crate::utils::time::format_timestamp;
use crate::utils::format_distance;
use crate::utils::geo::{check_lat, check_lon};

/// Show the status of active events, optionally from a given position.
pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Status { event, lat, lon } = cmd {
        let mut engine = ctx.open_engine();

        if let (Some(lat), Some(lon)) = (lat, lon) {
            engine.observe_fix(PositionFix::new(check_lat(*lat)?, check_lon(*lon)?, ctx.now));
        }

        let statuses = match event {
            Some(id) => {
                engine.store().require_event(id)?;
                let mut status = engine.get_event_status(id);
                if !status.has_data() {
                    // no live position: still show the stored record
                    status.event = engine.store().get_event(id).cloned();
                    status.attendance = engine.store().get_attendance(id).cloned();
                    status.is_at_event = status.attendance.as_ref().is_some_and(|r| r.is_at_event);
                }
                vec![status]
            }
            None => engine.get_all_event_statuses(ctx.now),
        };

        if statuses.is_empty() {
            info("No active events.");
            return Ok(());
        }

        header(format!("Attendance at {}", ctx.now.format("%Y-%m-%d %H:%M UTC")));
        println!("{}", render(&engine, &statuses, ctx)?);
    }
    Ok(())
}

fn render(
    engine: &AttendanceEngine<JsonFileStore>,
    statuses: &[EventStatus],
    ctx: &Context,
) -> AppResult<String> {
    let mut table = Table::new(vec![
        Column::new("ID", 14),
        Column::new("NAME", 20),
        Column::new("STATE", 8),
        Column::new("DISTANCE", 9),
        Column::new("ENTERED", 16),
        Column::new("EXITED", 16),
        Column::new("TOTAL", 8),
    ]);

    for status in statuses {
        let ev = status
            .event
            .as_ref()
            .ok_or_else(|| AppError::Other("status without event".into()))?;
        let rec = status.attendance.as_ref();
        let (label, colour) = describe_presence(status.is_at_event);

        table.add_row(vec![
            ev.id.clone(),
            ev.name.clone(),
            // pad before painting so escape codes do not break alignment
            colour.paint(pad_right(label, 8)).to_string(),
            status
                .distance_meters
                .map(format_distance)
                .unwrap_or_else(|| "--".to_string()),
            format_timestamp(rec.and_then(|r| r.entered_at)),
            format_timestamp(rec.and_then(|r| r.exited_at)),
            mins2readable(engine.get_total_time_at_event(&ev.id, ctx.now), false),
        ]);
    }

    Ok(table.render())
}
