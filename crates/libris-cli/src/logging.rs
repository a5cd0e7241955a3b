//! Logging setup
//!
//! The level comes from LIBRIS_LOG (default `warn`), so failed saves and
//! inconsistent loan records reach the user without extra flags. Logs go
//! to stderr, or to `config.log_file` when one is set. Errors such as
//! failed saves are always echoed to stderr as well.

use std::fs::OpenOptions;
use std::sync::Mutex;

use libris_core::Config;
use tracing::{info, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LEVEL: &str = "warn";

/// Filter directive for our own crates at the given level
fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("libris_core={},libris_cli={}", level, level))
        .unwrap_or_else(|_| EnvFilter::new(format!("libris_core={0},libris_cli={0}", DEFAULT_LEVEL)))
}

/// Full log to `log`, errors only to `echo`
fn file_subscriber<L, E>(log: L, echo: E, level: &str) -> impl Subscriber + Send + Sync + 'static
where
    L: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    E: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(log)
                .with_filter(filter_for(level)),
        )
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(echo)
                .with_filter(LevelFilter::ERROR),
        )
}

/// Install the global subscriber (ignored if one is already installed)
pub fn init(config: &Config) {
    let level = std::env::var("LIBRIS_LOG").unwrap_or_else(|_| DEFAULT_LEVEL.to_string());

    if let Some(ref log_path) = config.log_file {
        match OpenOptions::new().create(true).append(true).open(log_path) {
            Ok(file) => {
                let _ = file_subscriber(Mutex::new(file), std::io::stderr, &level).try_init();
                info!("Logging to {:?}", log_path);
                return;
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(&level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
