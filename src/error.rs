#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Plant resolution failed: {0}")]
    Resolution(String),

    #[error("Invalid value {value:?} for column '{column}' at {time_key}")]
    InvalidValue {
        time_key: String,
        column: String,
        value: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, ExportError>;
