//! Error types for galleria.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised below the HTTP layer.
///
/// Owner scoping is enforced in the repositories, so a row belonging to
/// someone else surfaces as `MediaNotFound` or `CategoryNotFound`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Missing blob or other resource without an id.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Media item not found: {0}")]
    MediaNotFound(uuid::Uuid),

    #[error("Category not found: {0}")]
    CategoryNotFound(uuid::Uuid),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The vision model answered with an error or unusable output.
    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The vision endpoint could not be reached.
    #[error("Request error: {0}")]
    Request(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    /// The URL is dropped from the message; it may carry credentials.
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else {
            Error::Request(e.to_string())
        }
    }
}
