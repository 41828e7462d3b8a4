use crate::cli::commands::Context;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Config { print_config, path } = cmd {
        if *path {
            println!("{}", Config::config_file().display());
        }

        if *print_config || !*path {
            println!("📄 Current configuration:\n");
            println!("{}", ctx.cfg.to_yaml()?);
            println!("# data directory in use: {}", ctx.data_dir.display());
        }
    }

    Ok(())
}
