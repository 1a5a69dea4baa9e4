//! Logging setup - console plus daily-rotating files
//!
//! Diagnostics for dropped rows and fetch traffic go to both the terminal
//! and `<log_dir>/profiler_viz.YYYY-MM-DD.log`.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with a console layer and a rotating file layer
pub fn init_logging(log_dir: &str) {
    if !Path::new(log_dir).exists() {
        std::fs::create_dir_all(log_dir).expect("Failed to create log directory");
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "profiler_viz.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The writer guard must outlive the process; leak it once at startup
    std::mem::forget(guard);

    // RUST_LOG overrides; default keeps our own modules at debug
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,profiler_viz=debug"));

    let console_layer = fmt::layer().with_target(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized. Log directory: {}", log_dir);
}
