//! Habit seeding commands for CLI.

use clap::Subcommand;
use habitwin_core::{Habit, HabitSection, HabitSource};
use uuid::Uuid;

use super::{parse_day, Session};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a habit
    Add {
        /// Habit name
        name: String,
        /// Points earned when checked
        #[arg(long, default_value_t = 1)]
        points: u32,
        /// Morning, Work or Evening
        #[arg(long, default_value = "Morning")]
        section: String,
        #[arg(long, default_value_t = 0)]
        sort_order: i64,
        /// Explicit id (random if omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// List active habits
    List,
    /// Mark a habit inactive
    Archive { id: String },
    /// Restore an archived habit
    Restore { id: String },
    /// Check a habit for a day (default today)
    Check { id: String, day: Option<String> },
    /// Uncheck a habit for a day (default today)
    Uncheck { id: String, day: Option<String> },
}

pub fn run(session: &Session, action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = session.config();
    let db = session.open_db(&config)?;
    let user = session.user(&config);

    match action {
        HabitAction::Add {
            name,
            points,
            section,
            sort_order,
            id,
        } => {
            let habit = Habit {
                id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                name,
                points,
                section: section.parse::<HabitSection>()?,
                sort_order,
                active: true,
            };
            db.insert_habit(&user, &habit)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List => {
            let habits = db.active_habits(&user)?;
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Archive { id } => {
            db.set_habit_active(&id, false)?;
            println!("Habit archived: {id}");
        }
        HabitAction::Restore { id } => {
            db.set_habit_active(&id, true)?;
            println!("Habit restored: {id}");
        }
        HabitAction::Check { id, day } => {
            let day = parse_day(day.as_deref())?;
            db.set_check(&user, day, &id, true)?;
            println!("Checked {id} on {day}");
        }
        HabitAction::Uncheck { id, day } => {
            let day = parse_day(day.as_deref())?;
            db.set_check(&user, day, &id, false)?;
            println!("Unchecked {id} on {day}");
        }
    }
    Ok(())
}
