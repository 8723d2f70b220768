

use thiserror::Error;

use crate::db::StoreError;


#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Word {word} not found in {language} table")]
    NotFound { word: String, language: String },

    #[error("Concept store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("Invalid language key: {0}")]
    InvalidPairKey(String),

    #[error("Reload failed: {0}")]
    ReloadFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DictionaryError {
    pub fn not_found(word: impl Into<String>, language: impl Into<String>) -> Self {
        Self::NotFound {
            word: word.into(),
            language: language.into(),
        }
    }

    /// Only a missing word is worth retrying in the opposite direction.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<config::ConfigError> for DictionaryError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}


pub type Result<T> = std::result::Result<T, DictionaryError>;
