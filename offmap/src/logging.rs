//! Tracing subscriber setup.
//!
//! Logs go to stderr and, optionally, to a daily rolling file. The filter
//! defaults to `offmap=info` and honors `RUST_LOG`.

use std::path::Path;

pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "offmap=info";

/// Base name of rolling log files.
pub const LOG_FILE_PREFIX: &str = "offmap.log";

/// Install the global subscriber.
///
/// With `log_dir`, a second layer writes plain-text logs to a daily file in
/// that directory; keep the returned guard alive so buffered lines are
/// flushed on exit. If the directory is unusable only stderr logging is
/// installed. Calling this twice is harmless: the second call leaves
/// the first subscriber in place.
pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::rfc_3339())
        .with_target(false)
        .with_filter(filter());

    let appender = log_dir.and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .build(dir)
            .map_err(|e| eprintln!("File logging disabled for {}: {}", dir.display(), e))
            .ok()
    });

    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::rfc_3339())
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Tracing subscriber already installed");
    }

    guard
}
