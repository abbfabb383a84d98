use std::fs;
use std::path::PathBuf;
use std::thread;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "KEYCHENGA_LOG";
const LOG_FILE: &str = "keychenga.log";

pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keychenga")
}

/// Sends `tracing` output to a file; the terminal belongs to the UI.
///
/// The returned guard flushes the writer when dropped and must outlive the app.
pub fn init() -> Result<WorkerGuard> {
    let dir = log_dir();
    fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    install_panic_hook();
    Ok(guard)
}

fn install_panic_hook() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let thread = thread::current();
        let name = thread.name().unwrap_or("unnamed");
        tracing::error!(target: "keychenga::panic", thread = name, %info, "panic");
        // The drill worker recovers from its own panics; stderr would only
        // scribble over the alternate screen.
        if name != "drill-worker" {
            default_panic(info);
        }
    }));
}
