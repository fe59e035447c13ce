use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "FURITYPE_LOG";
const LOG_FILE: &str = "furitype.log";

/// Sends tracing output to a daily log file under `dir`; the terminal belongs
/// to the TUI. The returned guard flushes the writer when dropped.
pub fn init_tracing(dir: &Path) -> Option<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_level(true)
        .with_target(true);

    if subscriber.try_init().is_ok() {
        tracing::info!(dir = %dir.display(), "tracing initialized");
        Some(guard)
    } else {
        None
    }
}
