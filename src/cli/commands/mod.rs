pub mod config;
pub mod context;
pub mod event;
pub mod export;
pub mod fix;
pub mod init;
pub mod reset;
pub mod status;
pub mod track;

pub use context::Context;
