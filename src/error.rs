use thiserror::Error;

use crate::subprocess::ProcessError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Error generating document: {0}")]
    Generation(String),

    #[error("PDF conversion unavailable: {0}")]
    ConversionUnavailable(String),

    #[error("PDF conversion failed: {0}")]
    Conversion(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Collapse any failure raised while loading, filling or saving a
    /// template into a generation failure. Not-found and conversion errors
    /// keep their kind so callers can still tell them apart.
    pub fn into_generation(self) -> Self {
        match self {
            Error::NotFound(_)
            | Error::Generation(_)
            | Error::ConversionUnavailable(_)
            | Error::Conversion(_) => self,
            other => Error::Generation(other.to_string()),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
