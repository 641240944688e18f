use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use crate::error::StorageError;

const LOG_FILE_PREFIX: &str = "ebd-manager.log";

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

fn env_filter() -> EnvFilter {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        from_env
    } else if cfg!(debug_assertions) {
        EnvFilter::new("info,wgpu=warn,iced_wgpu=warn,cosmic_text=warn,ebd_manager=debug")
    } else {
        EnvFilter::new("warn,ebd_manager=info")
    }
}

fn stdout_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_timer(LocalTimer)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stdout)
}

fn file_appender(data_dir: &Path) -> Result<RollingFileAppender, StorageError> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(&log_dir)?;
    Ok(appender)
}

/// Installs the global subscriber: stdout plus a daily file under
/// `<data_dir>/logs`. `RUST_LOG` overrides the default filter.
///
/// When the log directory cannot be used the subscriber logs to stdout only
/// and `None` is returned. Otherwise keep the returned guard alive for as
/// long as the app runs, or buffered file output is lost.
pub fn init(data_dir: &Path) -> Option<WorkerGuard> {
    match file_appender(data_dir) {
        Ok(appender) => {
            let (non_blocking_file, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .with_timer(LocalTimer)
                .with_ansi(false)
                .with_target(true)
                .with_level(true)
                .with_line_number(true)
                .with_writer(non_blocking_file);

            let installed = tracing_subscriber::registry()
                .with(env_filter())
                .with(file_layer)
                .with(stdout_layer())
                .try_init();
            if let Err(e) = installed {
                eprintln!("logging already initialised: {e}");
            }
            Some(guard)
        }
        Err(file_err) => {
            let installed = tracing_subscriber::registry()
                .with(env_filter())
                .with(stdout_layer())
                .try_init();
            if let Err(e) = installed {
                eprintln!("logging already initialised: {e}");
            }
            tracing::warn!(
                dir = %data_dir.display(),
                error = %file_err,
                "file logging disabled, logging to stdout only"
            );
            None
        }
    }
}
