use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::Session;

#[derive(Parser)]
#[command(name = "habitwin-cli", version, about = "Habit day outcomes and streaks")]
struct Cli {
    /// Database file (overrides config)
    #[arg(long, global = true)]
    db: Option<std::path::PathBuf>,
    /// User id (overrides config default_user)
    #[arg(long, global = true)]
    user: Option<String>,
    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Outcome for one day (default today)
    Day {
        /// Day as YYYY-MM-DD
        day: Option<String>,
    },
    /// Outcomes for every day from START through END
    Range { start: String, end: String },
    /// Outcomes for every day of a month
    Month {
        /// Month as YYYY-MM
        month: String,
    },
    /// Streaks and win-rates as of a day (default today)
    Stats {
        /// Day as YYYY-MM-DD
        day: Option<String>,
    },
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// Template and day plan management
    Template {
        #[command(subcommand)]
        action: commands::template::TemplateAction,
    },
    /// Win settings and core habit set
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let session = Session {
        db_path: cli.db,
        user: cli.user,
    };
    let result = match cli.command {
        Commands::Day { day } => commands::query::day(&session, day.as_deref()),
        Commands::Range { start, end } => commands::query::range(&session, &start, &end),
        Commands::Month { month } => commands::query::month(&session, &month),
        Commands::Stats { day } => commands::query::stats(&session, day.as_deref()),
        Commands::Habit { action } => commands::habit::run(&session, action),
        Commands::Template { action } => commands::template::run(&session, action),
        Commands::Settings { action } => commands::settings::run(&session, action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
