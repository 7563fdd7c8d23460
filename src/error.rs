use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Invalid rate {field} = {value}: must be between 0.0 and 1.0")]
    InvalidRate { field: &'static str, value: f64 },

    #[error("Currency list must contain at least one currency")]
    EmptyCurrencyList,

    #[error("max_line_items_per_doc must be at least 1, got {0}")]
    InvalidLineItemCount(usize),

    #[error("{n_docs} documents requested but vendor or customer count is zero")]
    EmptyMasterData { n_docs: usize },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
