use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Initialise logging. In debug mode the default level is `debug` and the
/// `RUST_LOG` environment variable may override it; otherwise the level is
/// pinned to `info`.
///
/// When `log_file` is given, events are also appended to that file through a
/// non-blocking writer. Only the first successful call installs a subscriber.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // Ignore RUST_LOG unless debug logging was asked for, so a stray
    // variable in the user's environment cannot make the hook path noisy.
    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let file_layer = log_file.and_then(|path| {
        let dir = path.parent().map(PathBuf::from).unwrap_or_default();
        let name = path.file_name()?.to_owned();
        let appender = tracing_appender::rolling::never(dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        Some(fmt::layer().with_ansi(false).with_writer(writer))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init();
}
