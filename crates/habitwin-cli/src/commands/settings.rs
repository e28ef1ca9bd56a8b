//! Win settings and core habit commands for CLI.

use clap::Subcommand;
use habitwin_core::{HabitSource, UserSettings, WinMode};
use serde_json::json;

use super::Session;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show stored settings, resolved settings and the core set
    Show,
    /// Update settings; omitted flags keep their stored value
    Set {
        /// points or core
        #[arg(long)]
        mode: Option<String>,
        /// Win threshold percent (50-100)
        #[arg(long, value_parser = clap::value_parser!(u32).range(50..=100))]
        threshold: Option<u32>,
        /// Wins needed per week (1-7)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=7))]
        weekly: Option<u32>,
        /// Wins needed per month (1-31)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
        monthly: Option<u32>,
    },
    /// Replace the core habit set (no ids clears it)
    Core { habits: Vec<String> },
}

pub fn run(session: &Session, action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = session.config();
    let db = session.open_db(&config)?;
    let user = session.user(&config);

    match action {
        SettingsAction::Show => {
            let stored = db.user_settings(&user)?;
            let mut core: Vec<String> = db.core_habit_ids(&user)?.into_iter().collect();
            core.sort();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "settings": stored,
                    "resolved": stored.resolve(),
                    "core_habit_ids": core,
                }))?
            );
        }
        SettingsAction::Set {
            mode,
            threshold,
            weekly,
            monthly,
        } => {
            let current = db.user_settings(&user)?;
            let updated = UserSettings {
                win_mode: match mode {
                    Some(m) => Some(m.parse::<WinMode>()?),
                    None => current.win_mode,
                },
                win_threshold_percent: threshold.or(current.win_threshold_percent),
                weekly_win_target: weekly.or(current.weekly_win_target),
                monthly_win_target: monthly.or(current.monthly_win_target),
            };
            db.save_settings(&user, &updated)?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        SettingsAction::Core { habits } => {
            let ids: Vec<&str> = habits.iter().map(String::as_str).collect();
            db.set_core_habits(&user, &ids)?;
            println!("Core set has {} habits", ids.len());
        }
    }
    Ok(())
}
