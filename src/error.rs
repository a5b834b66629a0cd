use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("{0}")]
    ValidationRejected(String),

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl LedgerError {
    /// HTTP status the routing layer answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            LedgerError::MalformedInput(_) => 400,
            LedgerError::ValidationRejected(_) => 406,
            LedgerError::Encoding(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
