//! Day outcome and streak queries.

use habitwin_core::{Day, Engine, YearMonth};
use serde_json::json;

use super::{parse_day, Session};

/// Exit code for "stats unavailable": a storage read failed mid-query.
const EXIT_UNAVAILABLE: i32 = 2;

pub fn day(session: &Session, day: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = session.config();
    let day = parse_day(day)?;
    let engine = Engine::with_config(session.open_db(&config)?, &config)?;

    let outcome = engine.evaluate_day(&session.user(&config), day)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

pub fn range(session: &Session, start: &str, end: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = session.config();
    let start: Day = start.parse()?;
    let end: Day = end.parse()?;
    let engine = Engine::with_config(session.open_db(&config)?, &config)?;

    let days = engine.evaluate_range(&session.user(&config), start, end)?;
    println!("{}", serde_json::to_string_pretty(&json!({ "days": days }))?);
    Ok(())
}

pub fn month(session: &Session, month: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = session.config();
    let month: YearMonth = month.parse()?;
    let engine = Engine::with_config(session.open_db(&config)?, &config)?;

    let range = month.range();
    let days = engine.evaluate_month(&session.user(&config), month)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "month": month.to_string(),
            "start": range.start,
            "end": range.end,
            "days": days,
        }))?
    );
    Ok(())
}

/// Prints the streak bundle. A dependency failure, including a database
/// that cannot be opened, prints a neutral unavailable document instead of
/// any partial numbers.
pub fn stats(session: &Session, day: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = session.config();
    let day = parse_day(day)?;
    let user = session.user(&config);

    let result = session.open_db(&config).and_then(|db| {
        Engine::with_config(db, &config)?.compute_streaks_and_stats(&user, day)
    });
    match result {
        Ok(bundle) => {
            println!("{}", serde_json::to_string_pretty(&bundle)?);
            Ok(())
        }
        Err(e) if e.is_dependency_failure() => {
            tracing::warn!(error = %e, "stats unavailable");
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "day": day,
                    "status": "stats_unavailable",
                }))?
            );
            std::process::exit(EXIT_UNAVAILABLE);
        }
        Err(e) => Err(e.into()),
    }
}
