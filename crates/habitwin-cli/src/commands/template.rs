//! Template and day plan commands for CLI.

use clap::Subcommand;
use habitwin_core::Template;
use uuid::Uuid;

use super::{parse_day, Session};

#[derive(Subcommand)]
pub enum TemplateAction {
    /// Create a template with its habit ids
    Add {
        name: String,
        /// Member habit ids
        habits: Vec<String>,
        /// Explicit id (random if omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Replace a template's habit ids
    SetHabits { id: String, habits: Vec<String> },
    /// Use a template for a day (default today)
    Plan { id: String, day: Option<String> },
    /// Clear a day's template so all active habits apply
    Unplan { day: Option<String> },
}

pub fn run(session: &Session, action: TemplateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = session.config();
    let db = session.open_db(&config)?;
    let user = session.user(&config);

    match action {
        TemplateAction::Add { name, habits, id } => {
            let template = Template {
                id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                name,
            };
            db.insert_template(&user, &template)?;
            let ids: Vec<&str> = habits.iter().map(String::as_str).collect();
            db.set_template_habits(&template.id, &ids)?;
            println!("{}", serde_json::to_string_pretty(&template)?);
        }
        TemplateAction::SetHabits { id, habits } => {
            let ids: Vec<&str> = habits.iter().map(String::as_str).collect();
            db.set_template_habits(&id, &ids)?;
            println!("Template {id} now has {} habits", ids.len());
        }
        TemplateAction::Plan { id, day } => {
            let day = parse_day(day.as_deref())?;
            db.set_day_plan(&user, day, Some(&id))?;
            println!("Planned {id} for {day}");
        }
        TemplateAction::Unplan { day } => {
            let day = parse_day(day.as_deref())?;
            db.set_day_plan(&user, day, None)?;
            println!("Cleared plan for {day}");
        }
    }
    Ok(())
}
