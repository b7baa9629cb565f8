use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static FILE_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Initialise logging. The default level is `info`; `debug` is enabled via the
/// settings file, in which case `RUST_LOG` may override it.
/// When `log_file` is given, events are also appended to that file.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    // Without debug logging we force `info` regardless of `RUST_LOG` so a stray
    // variable in the user's environment does not flood the console.
    let filter = build_filter(debug);

    let file_layer = log_file
        .as_deref()
        .and_then(open_file_writer)
        .map(|writer| fmt::layer().with_ansi(false).with_writer(writer));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init();
}

fn build_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}

fn open_file_writer(path: &Path) -> Option<tracing_appender::non_blocking::NonBlocking> {
    let file_name = path.file_name()?.to_string_lossy().into_owned();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(&dir)
    {
        Ok(appender) => appender,
        Err(err) => {
            eprintln!("failed to open log file {}: {err}", path.display());
            return None;
        }
    };

    let (writer, guard) = tracing_appender::non_blocking(appender);
    if let Ok(mut slot) = FILE_GUARD.lock() {
        *slot = Some(guard);
    }
    Some(writer)
}
