use crate::util::hex::format_hex_spaced;
use log::{debug, error, info, log_enabled, warn, Level};

/// Initializes the logger with the `env_logger` crate.
///
/// Progress lines are emitted at `info`, so the default filter is `info`
/// unless `RUST_LOG` says otherwise.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Logs an error message.
pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs a debug message.
pub fn log_debug(message: &str) {
    if log_enabled!(Level::Debug) {
        debug!("{message}");
    }
}

/// Dumps raw bytes at debug level, e.g. `rx frame (10 bytes): B5 62 05 01 ...`.
pub fn log_frame_hex(label: &str, data: &[u8]) {
    if log_enabled!(Level::Debug) {
        debug!("{label} ({} bytes): {}", data.len(), format_hex_spaced(data));
    }
}
