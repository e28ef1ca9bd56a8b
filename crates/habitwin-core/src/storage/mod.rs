mod config;
pub mod database;
pub mod migrations;

pub use config::EngineConfig;
pub use database::Database;

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/habitwin[-dev]/` based on HABITWIN_ENV.
///
/// Set HABITWIN_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITWIN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitwin-dev")
    } else {
        base_dir.join("habitwin")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
