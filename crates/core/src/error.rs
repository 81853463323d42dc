use thiserror::Error;

/// Fatal dataset load failures.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(String),

    #[error("Parquet error: {0}")]
    Parquet(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Row {row}: missing value in column '{column}'")]
    MissingValue { row: usize, column: String },

    #[error("Row {row}: unparseable timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    #[error("Row {row}: unparseable temperature '{value}'")]
    InvalidTemperature { row: usize, value: String },

    #[error("Row {row}: unknown season '{value}'")]
    InvalidSeason { row: usize, value: String },

    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),
}

impl From<arrow::error::ArrowError> for DataError {
    fn from(e: arrow::error::ArrowError) -> Self {
        DataError::Arrow(e.to_string())
    }
}

impl From<parquet::errors::ParquetError> for DataError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        DataError::Parquet(e.to_string())
    }
}
