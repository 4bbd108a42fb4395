//! Error types for Stowage.

use thiserror::Error;

/// The main error type for Stowage operations.
///
/// Absence of a key or value is never reported through this type; engines
/// return `Ok(None)` (or an empty collection) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying medium
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A raw value was rejected by a key type's own validation
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A key could not be translated between two engines' key types
    #[error("key translation failed: {0}")]
    KeyTranslation(String),

    /// A value could not be translated between two engines' representations
    #[error("value translation failed: {0}")]
    ValueTranslation(String),

    /// Encoding or decoding of a stored payload failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend-specific failure
    #[error("storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Returns true for failures converting keys or values between
    /// representations, as opposed to failures of the medium.
    pub fn is_translation(&self) -> bool {
        matches!(
            self,
            Error::InvalidKey(_)
                | Error::KeyTranslation(_)
                | Error::ValueTranslation(_)
                | Error::Serialization(_)
        )
    }
}

/// A specialized `Result` type for Stowage operations.
pub type Result<T> = std::result::Result<T, Error>;
