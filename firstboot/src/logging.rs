//! Log subscriber setup.
//!
//! Logs go to stderr so stdout stays free for JSON output. An optional log
//! file receives the same events without ANSI colours.

use crate::config::LogConfig;
use firstboot_shared::errors::{FirstbootError, FirstbootResult};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Install the global log subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// flushes the log file on drop and must be held until exit.
pub fn init_logging(config: &LogConfig) -> FirstbootResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| {
            FirstbootError::Config(format!("invalid log level '{}': {}", config.level, e))
        })?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);
    if config.show_time {
        layers.push(stderr.boxed());
    } else {
        layers.push(stderr.without_time().boxed());
    }

    let guard = match &config.file {
        Some(path) => {
            let file_name = path.file_name().ok_or_else(|| {
                FirstbootError::Config(format!("log file has no file name: {}", path.display()))
            })?;
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            std::fs::create_dir_all(dir).map_err(|e| {
                FirstbootError::Storage(format!(
                    "Failed to create log directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            layers.push(fmt::layer().with_writer(writer).with_ansi(false).boxed());
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| FirstbootError::Internal(format!("Failed to install log subscriber: {}", e)))?;

    Ok(guard)
}
