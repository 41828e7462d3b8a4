use crate::cli::commands::Context;
use crate::cli::parser::Commands;
use crate::core::{LocationTracker, ReplayProvider};
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

use std::io::{self, Write};

/// Ask a yes/no confirmation from the user
fn ask_confirmation(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Reset { yes } = cmd {
        if !*yes
            && !ask_confirmation("Remove ALL events, attendance records and location state? This is irreversible.")
        {
            info("Operation cancelled.");
            return Ok(());
        }

        let mut engine = ctx.open_engine();
        let events = engine.store().events().len();
        engine.store_mut().reset_all();
        engine.store_mut().flush()?;

        // permission flags go too; no fixes are needed to clear them
        let mut tracker = LocationTracker::open(
            ReplayProvider::new(Vec::new()),
            ctx.storage(),
            ctx.cfg.watch_options(),
        );
        tracker.reset();

        success(format!(
            "Removed {} event(s), all attendance records and location permission state.",
            events
        ));
    }
    Ok(())
}
