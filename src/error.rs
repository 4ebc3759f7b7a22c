//! Unified error hierarchy for squadrs
//!
//! The metric calculators never fail; everything that validates, imports,
//! exports or checks permissions reports through [`SquadError`].

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all squadrs operations
#[derive(Debug, Error)]
pub enum SquadError {
    /// Submission or record validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Caller's role does not allow the operation
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Referenced record does not exist
    #[error("Not found: {kind} {id}")]
    NotFound { kind: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Validation failures for player submissions and staff-entered records
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Numeric value outside its accepted range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Clock time did not match HH:MM
    #[error("Invalid clock time for {field}: '{value}'")]
    InvalidClockTime { field: String, value: String },

    /// End time before start time
    #[error("End time {end} is before start time {start}")]
    InvalidTimeRange { start: String, end: String },

    /// A wellness entry already exists for this user and day
    #[error("Wellness already submitted for {user_id} on {date}")]
    AlreadySubmitted { user_id: String, date: String },

    /// Required field missing or blank
    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

/// Import errors
#[derive(Debug, Error)]
pub enum ImportError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// CSV reader or deserialization failure
    #[error("Parse error in {path} at row {row}: {reason}")]
    ParseError {
        path: PathBuf,
        row: u64,
        reason: String,
    },

    /// Row parsed but failed validation
    #[error("Invalid row {row} in {path}: {source}")]
    InvalidRow {
        path: PathBuf,
        row: u64,
        #[source]
        source: ValidationError,
    },
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Serialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Output could not be written
    #[error("Export failed to {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
}

/// Result type alias for squadrs operations
pub type Result<T> = std::result::Result<T, SquadError>;

impl SquadError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SquadError::Validation(_) => ErrorSeverity::Warning,
            SquadError::NotFound { .. } => ErrorSeverity::Warning,
            SquadError::Import(ImportError::InvalidRow { .. }) => ErrorSeverity::Warning,
            SquadError::Authorization(_) => ErrorSeverity::Error,
            SquadError::Configuration(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            SquadError::Validation(ValidationError::AlreadySubmitted { date, .. }) => {
                format!("You have already submitted your wellness for {}.", date)
            }
            SquadError::Validation(err) => format!("Please check your entry: {}", err),
            SquadError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find data file: {}", path.display())
            }
            SquadError::Authorization(_) => {
                "Only staff and admins can do that.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents the operation
    Error,
    /// Rejected input the user can correct
    Warning,
}

/// Severity and message to show for an error that reached the command line
///
/// Library errors keep their friendly message even under added context;
/// anything else is shown with its full context chain.
pub fn cli_report(err: &anyhow::Error) -> (ErrorSeverity, String) {
    match err.downcast_ref::<SquadError>() {
        Some(squad_err) => (squad_err.severity(), squad_err.user_message()),
        None => (ErrorSeverity::Error, format!("{:#}", err)),
    }
}
