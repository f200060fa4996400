use std::{net::SocketAddr, path::Path};

use axum::http::StatusCode;
use log::{debug, error, info, warn};
use net::{QueryError, ServerAddress};

pub struct McstatLogger;

impl McstatLogger {
    /// Debug level in debug builds, `RUST_LOG` otherwise.
    pub fn init() {
        #[cfg(debug_assertions)]
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .try_init();
        #[cfg(not(debug_assertions))]
        let _ = env_logger::try_init();
    }

    pub fn starting(name: &str, version: &str) {
        info!("Starting {name} version {version}");
    }

    pub fn preparing_socket(address: &SocketAddr) {
        info!("Preparing socket {}", address);
    }

    pub fn status_updated(target: &ServerAddress, online: i64, max: i64) {
        info!("Updated status of {target}: {online}/{max} players online");
    }

    pub fn poll_failed(target: &ServerAddress, err: &QueryError) {
        error!(
            "Error occurred while updating status of {target} ({} error): {err}",
            err.kind()
        );
    }

    pub fn poll_panicked(target: &ServerAddress, err: &dyn std::fmt::Display) {
        error!("Status query for {target} did not complete: {err}");
    }

    pub fn history_write_failed(path: &Path, err: &dyn std::fmt::Display) {
        error!("Failed to append sample to {}: {err}", path.display());
    }

    pub fn history_line_skipped(line_no: usize, line: &str) {
        debug!("Skipping malformed history line {line_no}: {line:?}");
    }

    pub fn target_changed(target: &ServerAddress) {
        info!("Target server set to {target}");
    }

    pub fn task_toggled(paused: bool, terminated: bool) {
        info!("Poll task control changed: paused={paused} terminated={terminated}");
    }

    pub fn task_stopped() {
        info!("Poll task stopped");
    }

    pub fn request_failed(status: StatusCode, err: &dyn std::fmt::Display) {
        warn!("Request failed with {status}: {err}");
    }
}
