use crate::cli::commands::Context;
use crate::cli::commands::context::print_transitions;
use crate::cli::parser::Commands;
use crate::core::{AttendanceService, ReplayProvider};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use crate::utils::path::expand_tilde;

/// Replay a recorded track: subscribe, then evaluate every fix in order at
/// its own timestamp.
pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Track { replay } = cmd {
        let provider = ReplayProvider::from_json_lines(&expand_tilde(replay))?;
        info(format!("Replaying {} fix(es) from {}", provider.fixes().len(), replay));

        let mut service = AttendanceService::open(provider, ctx.storage(), ctx.cfg.watch_options());

        if !service.tracker_mut().request_permission() {
            let msg = service
                .tracker()
                .last_error()
                .unwrap_or("location unavailable")
                .to_string();
            return Err(AppError::Location(msg));
        }

        let reports = service.pump(|fix| fix.timestamp);
        for report in &reports {
            print_transitions(service.engine(), report);
        }

        if let Some(msg) = service.tracker().last_error() {
            return Err(AppError::Location(msg.to_string()));
        }

        let transitions: usize = reports
            .iter()
            .map(|r| r.entered.len() + r.exited.len())
            .sum();
        success(format!(
            "Processed {} evaluation pass(es), {} transition(s).",
            reports.len(),
            transitions
        ));
        service.tracker_mut().stop();
    }
    Ok(())
}
