pub mod config;
pub mod habit;
pub mod query;
pub mod settings;
pub mod template;

use std::path::PathBuf;

use habitwin_core::{Database, Day, EngineConfig};

/// Global options shared by every command.
pub struct Session {
    pub db_path: Option<PathBuf>,
    pub user: Option<String>,
}

impl Session {
    pub fn config(&self) -> EngineConfig {
        EngineConfig::load_or_default()
    }

    pub fn user(&self, config: &EngineConfig) -> String {
        self.user
            .clone()
            .unwrap_or_else(|| config.default_user.clone())
    }

    /// Open the database from `--db`, then the config path, then the data dir.
    pub fn open_db(&self, config: &EngineConfig) -> habitwin_core::Result<Database> {
        match self.db_path.as_ref().or(config.database_path.as_ref()) {
            Some(path) => Database::open_at(path),
            None => Database::open(),
        }
    }
}

/// Parse an optional day argument, defaulting to today.
pub fn parse_day(arg: Option<&str>) -> Result<Day, Box<dyn std::error::Error>> {
    match arg {
        Some(s) => Ok(s.parse::<Day>()?),
        None => Ok(habitwin_core::calendar::today()),
    }
}
