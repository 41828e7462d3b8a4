//! geoattend library root.
//! Exposes the attendance engine, the event store, the location seam,
//! the CLI parser and the high-level run() function.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod export;
pub mod models;
pub mod storage;
pub mod ui;
pub mod utils;

use chrono::Utc;
use clap::Parser;
use cli::commands::{self, Context};
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use utils::path::resolve_against;
use utils::time::parse_datetime;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, ctx: &Context) -> AppResult<()> {
    match &cli.command {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, ctx),
        Commands::Event { .. } => commands::event::handle(&cli.command, ctx),
        Commands::Fix { .. } => commands::fix::handle(&cli.command, ctx),
        Commands::Track { .. } => commands::track::handle(&cli.command, ctx),
        Commands::Status { .. } => commands::status::handle(&cli.command, ctx),
        Commands::Reset { .. } => commands::reset::handle(&cli.command, ctx),
        Commands::Export { .. } => commands::export::handle(&cli.command, ctx),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // config is loaded once and shared by every handler
    let cfg = Config::load()?;

    let data_dir = match &cli.data_dir {
        // same resolution as a data_dir written by `init --data-dir`
        Some(custom) => resolve_against(&Config::config_dir(), custom),
        None => cfg.data_path(),
    };

    let now = match &cli.at {
        Some(at) => parse_datetime(at)?,
        None => Utc::now(),
    };

    let ctx = Context { cfg, data_dir, now };
    dispatch(&cli, &ctx)
}
