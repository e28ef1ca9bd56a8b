//! # Habitwin Core Library
//!
//! Decides, per calendar day, whether a user "won" their habits, and rolls
//! those daily results up into streaks and win-rates.
//!
//! ## Architecture
//!
//! - **Calendar**: timezone-naive day arithmetic (Monday weeks, calendar months)
//! - **Stats**: points aggregation, win evaluation with core-mode fallback,
//!   bounded streak scans
//! - **Engine**: query API (`evaluate_day`, `evaluate_range`,
//!   `compute_streaks_and_stats`) over any [`HabitSource`]
//! - **Storage**: SQLite-backed source and TOML engine configuration
//!
//! Outcomes are never stored. Every query reads current state, so editing a
//! habit or a setting changes past outcomes too.
//!
//! ## Key Components
//!
//! - [`Engine`]: query entry point
//! - [`HabitSource`]: read contract the engine depends on
//! - [`Database`]: SQLite implementation of that contract
//! - [`EngineConfig`]: lookback horizon and iteration caps

pub mod calendar;
pub mod engine;
pub mod error;
pub mod model;
pub mod source;
pub mod stats;
pub mod storage;

pub use calendar::{Day, DayRange, YearMonth};
pub use engine::Engine;
pub use error::{ConfigError, CoreError, Result, SourceError, ValidationError};
pub use model::{
    DayOutcome, Habit, HabitSection, ResolvedSettings, Template, UserSettings, WinMode,
};
pub use source::{CachingSource, HabitSource, MemorySource};
pub use stats::{PointsSummary, StreakBundle, StreakLimits};
pub use storage::{Database, EngineConfig};
