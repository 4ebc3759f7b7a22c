// Library interface for squadrs modules
// The CLI and the integration tests both go through this crate root

pub mod chat;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod flags;
pub mod import;
pub mod load;
pub mod logging;
pub mod models;
pub mod schedule;
pub mod validation;
pub mod wellness;

// Re-export commonly used types for convenience
pub use models::*;
pub use config::AppConfig;
pub use dashboard::{PlayerSnapshot, SquadAnalyzer, SquadOverview};
pub use error::{Result, SquadError};
pub use flags::{detect_red_flags, RedFlag, RedFlagDetector, RedFlagInputs, RedFlagKind, RedFlagThresholds};
pub use load::{monotony, session_load, strain, LoadCalculator, MetricsConfig, WeeklyLoadSummary};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use wellness::{
    average_sleep_hours, average_wellness, readiness_score, sleep_duration_hours,
    wellness_average_from_row, ReadinessInputs, ReadinessLevel,
};

/// Round half away from zero to a number of decimal places
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
