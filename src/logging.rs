use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

/// Where diagnostics go. Stdout belongs to the TUI, so the subscriber
/// writes to a log file under the platform state directory instead.
fn log_path() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        let state_dir = PathBuf::from(home).join(".local").join("state").join("typr");
        Some(state_dir.join("typr.log"))
    } else {
        ProjectDirs::from("", "", "typr").map(|pd| pd.data_local_dir().join("typr.log"))
    }
}

/// Install the global subscriber. Filter comes from `TYPR_LOG` (off by
/// default). Logging is best-effort: an unwritable log file just disables
/// it rather than failing startup.
pub fn init() {
    let Some(path) = log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env("TYPR_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_under_state_dir() {
        if let Some(path) = log_path() {
            assert!(path.ends_with("typr.log"));
        }
    }

    #[test]
    fn test_init_is_safe_to_call_twice() {
        init();
        init();
    }
}
