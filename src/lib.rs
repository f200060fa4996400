//! Records the online player count of a Minecraft server and serves the
//! history over HTTP.
pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod monitor;

pub const PROJECT_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
