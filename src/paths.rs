//! Path resolution for Opportunities Hub configuration and data directories.
//!
//! OPPHUB_HOME resolution order:
//! 1. OPPHUB_HOME environment variable (if set)
//! 2. ~/.config/opphub (default)

use std::path::PathBuf;

/// Returns the Opportunities Hub home directory.
///
/// Checks OPPHUB_HOME env var first, falls back to ~/.config/opphub
pub fn opphub_home() -> PathBuf {
    if let Ok(home) = std::env::var("OPPHUB_HOME") {
        return PathBuf::from(home);
    }

    dirs::home_dir()
        .map(|h| h.join(".config").join("opphub"))
        .expect("Could not determine home directory")
}

/// Returns the path to the config.toml file.
pub fn config_path() -> PathBuf {
    opphub_home().join("config.toml")
}

/// Returns the path to the session store file.
pub fn session_path() -> PathBuf {
    opphub_home().join("session.json")
}

/// Returns the directory used for log files.
pub fn logs_dir() -> PathBuf {
    opphub_home().join("logs")
}
