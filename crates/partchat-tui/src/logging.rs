use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Overrides where the TUI writes its log file.
const LOG_DIR_ENV: &str = "PARTCHAT_LOG_DIR";

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("partchat=debug,partchat_core=debug")
        } else {
            EnvFilter::new("partchat=info,partchat_core=info")
        }
    })
}

fn log_dir() -> Option<PathBuf> {
    std::env::var(LOG_DIR_ENV)
        .ok()
        .map(PathBuf::from)
        .or_else(|| dirs::cache_dir().map(|dir| dir.join("partchat")))
}

/// Log to a file. The terminal belongs to the UI, so if no file can be
/// opened logging stays off. Returns the log path when enabled.
pub fn init_file(verbose: bool) -> Option<PathBuf> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir).ok()?;

    let path = dir.join("partchat.log");
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(file_layer)
        .init();

    tracing::info!(path = ?path, "tracing initialized");
    Some(path)
}

pub fn init_stderr(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .init();
}
