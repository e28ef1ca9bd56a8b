//! `config` subcommand: inspect and edit `config.toml`.

use clap::Subcommand;
use habitwin_core::EngineConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value
    Get {
        /// Dot-path key, e.g. "streaks.lookback_days"
        key: String,
    },
    /// Change one value; streak limits must stay at least 1
    Set { key: String, value: String },
    /// Print the whole config as JSON
    List,
    /// Print the settable keys
    Keys,
    /// Print where config.toml lives
    Path,
    /// Restore defaults (120-day lookback, 52 weeks, 24 months)
    Reset,
}

fn unknown_key(key: &str) -> Box<dyn std::error::Error> {
    format!(
        "unknown key '{key}' (expected one of: {})",
        EngineConfig::KEYS.join(", ")
    )
    .into()
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = EngineConfig::load()?;
            let value = config.get(&key).ok_or_else(|| unknown_key(&key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            if !EngineConfig::KEYS.contains(&key.as_str()) {
                return Err(unknown_key(&key));
            }
            let mut config = EngineConfig::load()?;
            config.set(&key, &value)?;
            let stored = config.get(&key).unwrap_or(value);
            println!("{key} = {stored}");
        }
        ConfigAction::List => {
            let config = EngineConfig::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Keys => {
            for key in EngineConfig::KEYS {
                println!("{key}");
            }
        }
        ConfigAction::Path => {
            println!("{}", EngineConfig::path()?.display());
        }
        ConfigAction::Reset => {
            EngineConfig::default().save()?;
            println!("config reset: {}", EngineConfig::path()?.display());
        }
    }
    Ok(())
}
