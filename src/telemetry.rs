//! Tracing setup.
//!
//! - QUIZBANK_LOG sets the filter (default "warn"), e.g. "quizbank=debug".
//! - QUIZBANK_LOG_FORMAT=json switches to JSON lines.
//!
//! The CLI logs to stderr. The TUI owns the terminal, so it logs to a file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::Result;

const LOG_ENV: &str = "QUIZBANK_LOG";
const LOG_FORMAT_ENV: &str = "QUIZBANK_LOG_FORMAT";
const DEFAULT_FILTER: &str = "warn";

pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn wants_json() -> bool {
    matches!(std::env::var(LOG_FORMAT_ENV).as_deref(), Ok("json"))
}

// A second call is a no-op: the first installed subscriber stays
pub fn init_tracing(target: LogTarget) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_target(true);

    let installed = match target {
        LogTarget::Stderr => {
            let builder = builder.with_writer(std::io::stderr);
            if wants_json() {
                builder.json().try_init()
            } else {
                builder.try_init()
            }
        }
        LogTarget::File(path) => {
            crate::config::ensure_parent_dir(path)?;
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let builder = builder.with_writer(Mutex::new(file)).with_ansi(false);
            if wants_json() {
                builder.json().try_init()
            } else {
                builder.try_init()
            }
        }
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_target_creates_log_file() {
        let dir = std::env::temp_dir().join(format!("quizbank-log-{}", std::process::id()));
        let path = dir.join("test.log");

        init_tracing(LogTarget::File(&path)).unwrap();
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn repeated_init_is_harmless() {
        assert!(init_tracing(LogTarget::Stderr).is_ok());
        assert!(init_tracing(LogTarget::Stderr).is_ok());
    }
}
