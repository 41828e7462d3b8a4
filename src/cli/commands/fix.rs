use crate::cli::commands::Context;
use crate::cli::commands::context::print_transitions;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::models::PositionFix;
use crate::ui::messages::{info, warning};
use crate::utils::geo::{check_lat, check_lon};

/// Process one position fix taken at the invocation time.
pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Fix { lat, lon, accuracy } = cmd {
        let mut engine = ctx.open_engine();

        let mut fix = PositionFix::new(check_lat(*lat)?, check_lon(*lon)?, ctx.now);
        if let Some(acc) = accuracy {
            fix = fix.with_accuracy(*acc);
        }

        let report = engine.process_fix(fix, ctx.now);
        print_transitions(&engine, &report);
        for id in &report.skipped {
            warning(format!("Event {} skipped: malformed record.", id));
        }
        info(format!(
            "Evaluated {} active event(s), {} transition(s).",
            report.evaluated,
            report.entered.len() + report.exited.len()
        ));

        if engine.store().is_dirty() {
            warning("Attendance could not be saved; it will be retried on the next change.");
        }
    }
    Ok(())
}
