use crate::cli::commands::Context;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::utils::path::expand_tilde;

pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Export { format, file, force } = cmd {
        let engine = ctx.open_engine();
        ExportLogic::export(&engine, *format, &expand_tilde(file), *force, ctx.now)?;
    }
    Ok(())
}
