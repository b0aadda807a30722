use thiserror::Error;

use crate::core::binary_reader::BinaryReaderError;
use crate::types::ClassifiedAccount;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("invalid base64 account data: {0}")]
    InvalidBase64(String),
    #[error("binary reader error: {0}")]
    BinaryReader(#[from] BinaryReaderError),
    #[error("account lookup failed: {0}")]
    Resolver(String),
    #[error("metadata lookup failed: {0}")]
    Metadata(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to deserialize value: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EnrichError {
    pub fn resolver(message: impl Into<String>) -> Self {
        Self::Resolver(message.into())
    }

    pub fn metadata(message: impl Into<String>) -> Self {
        Self::Metadata(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// The classifier had to guess between a mint and a holding layout.
/// `guess` is what the layout heuristic picked.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("ambiguous {len}-byte account owned by {owner}: {reason}")]
pub struct AmbiguousLayout {
    pub owner: String,
    pub len: usize,
    pub reason: String,
    pub guess: ClassifiedAccount,
}

impl AmbiguousLayout {
    pub fn into_guess(self) -> ClassifiedAccount {
        self.guess
    }
}
