//! Basic CLI E2E tests.
//!
//! Each test gets its own home directory and database file, seeds data
//! through the binary, then checks the JSON it prints.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

struct Env {
    home: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
        }
    }

    fn db(&self) -> String {
        self.home.path().join("test.db").display().to_string()
    }

    /// Run a CLI command and return (exit code, stdout, stderr).
    fn run(&self, args: &[&str]) -> (i32, String, String) {
        run_in(self.home.path(), &self.db(), args)
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let (code, stdout, stderr) = self.run(args);
        assert_eq!(code, 0, "{args:?} failed: {stderr}");
        stdout
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        serde_json::from_str(&self.run_ok(args)).unwrap()
    }
}

fn run_in(home: &Path, db: &str, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_habitwin-cli"))
        .env("HOME", home)
        .env_remove("HABITWIN_ENV")
        .env_remove("RUST_LOG")
        .args(["--db", db, "--user", "tester"])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

fn seed_two_habits(env: &Env) {
    env.run_ok(&["habit", "add", "Stretch", "--points", "10", "--id", "h1"]);
    env.run_ok(&[
        "habit", "add", "Read", "--points", "10", "--section", "Evening", "--id", "h2",
    ]);
}

#[test]
fn test_day_points_threshold() {
    let env = Env::new();
    seed_two_habits(&env);
    env.run_ok(&["habit", "check", "h1", "2024-06-01"]);

    let out = env.json(&["day", "2024-06-01"]);
    assert_eq!(out["done_points"], 10);
    assert_eq!(out["total_points"], 20);
    assert_eq!(out["is_win"], false);
    assert_eq!(out["mode_used"], "points");

    env.run_ok(&["habit", "check", "h2", "2024-06-01"]);
    assert_eq!(env.json(&["day", "2024-06-01"])["is_win"], true);

    env.run_ok(&["habit", "uncheck", "h2", "2024-06-01"]);
    assert_eq!(env.json(&["day", "2024-06-01"])["is_win"], false);
}

#[test]
fn test_core_mode_and_fallback() {
    let env = Env::new();
    seed_two_habits(&env);
    env.run_ok(&["settings", "set", "--mode", "core"]);
    env.run_ok(&["habit", "check", "h1", "2024-06-01"]);
    env.run_ok(&["habit", "check", "h2", "2024-06-01"]);

    let fallback = env.json(&["day", "2024-06-01"]);
    assert_eq!(fallback["mode_used"], "points");
    assert_eq!(fallback["used_fallback"], true);

    env.run_ok(&["settings", "core", "h1", "h2"]);
    env.run_ok(&["habit", "check", "h1", "2024-06-02"]);
    let core = env.json(&["day", "2024-06-02"]);
    assert_eq!(core["mode_used"], "core");
    assert_eq!(core["used_fallback"], false);
    assert_eq!(core["is_win"], false);
}

#[test]
fn test_template_plan_scopes_points() {
    let env = Env::new();
    seed_two_habits(&env);
    env.run_ok(&["template", "add", "Light", "h1", "--id", "light"]);
    env.run_ok(&["template", "plan", "light", "2024-06-03"]);
    env.run_ok(&["habit", "check", "h1", "2024-06-03"]);

    let out = env.json(&["day", "2024-06-03"]);
    assert_eq!(out["template_id"], "light");
    assert_eq!(out["total_points"], 10);
    assert_eq!(out["is_win"], true);

    env.run_ok(&["template", "unplan", "2024-06-03"]);
    let out = env.json(&["day", "2024-06-03"]);
    assert!(out["template_id"].is_null());
    assert_eq!(out["total_points"], 20);
}

#[test]
fn test_range_and_month() {
    let env = Env::new();
    seed_two_habits(&env);

    let range = env.json(&["range", "2024-02-27", "2024-03-02"]);
    let days = range["days"].as_array().unwrap();
    assert_eq!(days.len(), 5);
    assert_eq!(days[2]["day"], "2024-02-29");

    let empty = env.json(&["range", "2024-03-02", "2024-02-27"]);
    assert!(empty["days"].as_array().unwrap().is_empty());

    let month = env.json(&["month", "2024-02"]);
    assert_eq!(month["days"].as_array().unwrap().len(), 29);
    assert_eq!(month["end"], "2024-02-29");
}

#[test]
fn test_stats_weekly_streak() {
    let env = Env::new();
    seed_two_habits(&env);
    env.run_ok(&["settings", "set", "--weekly", "2"]);
    // Week of Mon 2024-06-10 through Sun 2024-06-16
    for day in ["2024-06-11", "2024-06-12"] {
        env.run_ok(&["habit", "check", "h1", day]);
        env.run_ok(&["habit", "check", "h2", day]);
    }

    let stats = env.json(&["stats", "2024-06-12"]);
    assert_eq!(stats["daily_streak"], 2);
    assert_eq!(stats["wins_this_week"], 2);
    assert_eq!(stats["weekly_streak"], 1);
    assert_eq!(stats["weekly_target"], 2);
    assert_eq!(stats["week"]["start"], "2024-06-10");
    assert_eq!(stats["current_day_outcome"]["is_win"], true);
}

#[test]
fn test_stats_unreadable_database_is_unavailable() {
    let env = Env::new();
    let broken = env.home.path().join("broken.db");
    std::fs::write(&broken, "this is not a sqlite database\n".repeat(200)).unwrap();

    let (code, stdout, _) = run_in(
        env.home.path(),
        &broken.display().to_string(),
        &["stats", "2024-06-12"],
    );
    assert_eq!(code, 2);
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["status"], "stats_unavailable");
    assert_eq!(out["day"], "2024-06-12");
    assert!(out.get("daily_streak").is_none());

    // Other queries report the same failure as a plain error
    let (code, _, stderr) = run_in(
        env.home.path(),
        &broken.display().to_string(),
        &["day", "2024-06-12"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_settings_show_and_validation() {
    let env = Env::new();
    let shown = env.json(&["settings", "show"]);
    assert_eq!(shown["resolved"]["threshold_percent"], 70);
    assert_eq!(shown["resolved"]["weekly_target"], 5);
    assert_eq!(shown["resolved"]["monthly_target"], 20);

    let (code, _, _) = env.run(&["settings", "set", "--threshold", "40"]);
    assert_ne!(code, 0);
    let (code, _, _) = env.run(&["settings", "set", "--mode", "Core"]);
    assert_ne!(code, 0);

    env.run_ok(&["settings", "set", "--threshold", "50"]);
    let shown = env.json(&["settings", "show"]);
    assert_eq!(shown["settings"]["win_threshold_percent"], 50);
    assert!(shown["settings"]["weekly_win_target"].is_null());
}

#[test]
fn test_invalid_day_is_rejected() {
    let env = Env::new();
    for bad in ["2024-6-1", "2024-02-30", "yesterday"] {
        let (code, _, stderr) = env.run(&["day", bad]);
        assert_eq!(code, 1, "accepted {bad}");
        assert!(stderr.contains("error:"));
    }
}

#[test]
fn test_config_get_set() {
    let env = Env::new();
    let lookback = env.run_ok(&["config", "get", "streaks.lookback_days"]);
    assert_eq!(lookback.trim(), "120");

    let echoed = env.run_ok(&["config", "set", "streaks.lookback_days", "30"]);
    assert_eq!(echoed.trim(), "streaks.lookback_days = 30");
    let lookback = env.run_ok(&["config", "get", "streaks.lookback_days"]);
    assert_eq!(lookback.trim(), "30");

    let (code, _, _) = env.run(&["config", "set", "streaks.lookback_days", "0"]);
    assert_ne!(code, 0);

    env.run_ok(&["config", "reset"]);
    let list = env.json(&["config", "list"]);
    assert_eq!(list["streaks"]["lookback_days"], 120);
    assert_eq!(list["default_user"], "local");
}

#[test]
fn test_config_keys_and_path() {
    let env = Env::new();
    let keys = env.run_ok(&["config", "keys"]);
    assert!(keys.lines().any(|k| k == "streaks.max_month_iterations"));
    assert!(keys.lines().any(|k| k == "memoize_reads"));

    let path = env.run_ok(&["config", "path"]);
    assert!(path.trim().ends_with("habitwin/config.toml"));
    assert!(path.trim().starts_with(&env.home.path().display().to_string()));

    let (code, _, stderr) = env.run(&["config", "set", "streaks.lookback", "30"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("streaks.lookback_days"));
}
