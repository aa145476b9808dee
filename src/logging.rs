use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "keystroke_overlay.log";

/// Initialise logging. With `debug` the level is `debug` and can be
/// overridden through `RUST_LOG`; otherwise it is fixed at `info`.
///
/// When `log_dir` is given, logs are also written to a daily rotated file.
/// The returned guard must be kept alive for the file writer to flush.
pub fn init(debug: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Ignore RUST_LOG unless debug logging was asked for, so a stray variable
    // in the user's environment cannot make the overlay chatty.
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true));

    match log_dir {
        Some(dir) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = registry
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init();
            Some(guard)
        }
        None => {
            let _ = registry.try_init();
            None
        }
    }
}
