use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input from validator: {0}")]
    ValidationError(#[from] garde::Report),

    #[error("DB error: {0}")]
    DbError(String),

    #[error("error migrating database: {0}")]
    MigrationError(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),

    #[error("error initializing Config: {0}")]
    ConfigError(String),

    #[error("error parsing env value: {0}")]
    EnvError(String),

    #[error("error sending request: {0}")]
    SendingRequest(String),

    #[error("file error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("error reading or writing csv: {0}")]
    CsvError(String),

    #[error("invalid schedule `{expr}`: {reason}")]
    ScheduleError { expr: String, reason: String },
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::DbError(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::CsvError(e.to_string())
    }
}
