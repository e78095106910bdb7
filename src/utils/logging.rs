//! Diagnostic logging.
//!
//! The terminal belongs to the chat UI, so `tracing` output goes to a file
//! chosen with `--log`. Without one, no subscriber is installed and events are
//! discarded.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "gemchat=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Subscriber writing plain-text events to `file`.
pub fn file_subscriber(file: File, filter: EnvFilter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .finish()
}

/// Install the global subscriber. Returns `Ok(false)` when logging is off.
pub fn init_logging(log_file: Option<&Path>) -> Result<bool, Box<dyn std::error::Error>> {
    let Some(path) = log_file else {
        return Ok(false);
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing::subscriber::set_global_default(file_subscriber(file, env_filter()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn events_are_written_to_the_file() {
        let log = NamedTempFile::new().expect("temp file");
        let file = log.reopen().expect("reopen");
        let subscriber = file_subscriber(file, EnvFilter::new("debug"));

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(turn = 3, "provider failure: timed out");
            tracing::trace!("filtered out");
        });

        let contents = fs::read_to_string(log.path()).expect("read log");
        assert!(contents.contains("ERROR"));
        assert!(contents.contains("provider failure: timed out"));
        assert!(contents.contains("turn=3"));
        assert!(!contents.contains("filtered out"));
    }

    #[test]
    fn no_file_means_no_subscriber() {
        assert!(!init_logging(None).expect("init"));
    }
}
