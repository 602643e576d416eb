use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Logging initialization failed: {0}")]
    Logging(#[from] tracing_appender::rolling::InitError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    #[error("Table '{0}' does not exist")]
    MissingTable(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Invalid category token '{token}': {reason}")]
    InvalidCategoryToken { token: String, reason: String },

    #[error("Category '{column}' in row {row} has non-numeric value '{token}'")]
    NonNumericCategory {
        row: usize,
        column: String,
        token: String,
    },
}

impl EtlError {
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        EtlError::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
