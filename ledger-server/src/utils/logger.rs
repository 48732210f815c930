//! Logging Infrastructure
//!
//! `RUST_LOG` drives the filter. When a log directory is given, output goes
//! to a daily rolling file instead of stdout.

use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "ledger_server=info,tower_http=info";

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional JSON formatting and file output
pub fn init_logger_with_file(json: Option<bool>, log_dir: Option<&str>) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if std::fs::create_dir_all(log_path).is_ok() {
            let file_appender = tracing_appender::rolling::daily(log_path, "ledger-server");
            let builder = builder.with_ansi(false).with_writer(file_appender);
            if json.unwrap_or(false) {
                builder.json().init();
            } else {
                builder.init();
            }
            return;
        }
    }

    if json.unwrap_or(false) {
        builder.json().init();
    } else {
        builder.init();
    }
}
