use crate::cli::parser::Cli;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (existing values are kept)
///  - the data directory holding the storage slots
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.data_dir.as_deref())?;

    println!("⚙️  Initializing geoattend…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Data dir    : {}", cfg.data_path().display());

    success("geoattend initialization completed!");
    Ok(())
}
