// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for the Perspective client

use thiserror::Error;

/// Result type alias for Perspective operations
pub type Result<T> = std::result::Result<T, PerspectiveError>;

/// Perspective error types
#[derive(Error, Debug)]
pub enum PerspectiveError {
    #[error("The text cannot be empty")]
    EmptyText,

    #[error("No attributes were requested")]
    MissingAttributes,

    #[error("Attribute \"{0}\" is unknown")]
    UnknownAttribute(String),

    #[error("Attribute group \"{0}\" is unknown")]
    UnknownGroup(String),

    #[error("Invalid attribute format: {0}")]
    InvalidFormat(String),

    #[error("Attribute \"{attribute}\" does not support language \"{language}\"")]
    UnsupportedLanguage { attribute: String, language: String },

    #[error(
        "The token is not a valid API key. \
         See https://developers.perspectiveapi.com/s/docs-get-started to get a new one"
    )]
    InvalidToken,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unable to reach the API: {0}")]
    Unreachable(String),

    /// Rejection returned by the service, before it is translated
    #[error("API returned status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("The response is empty")]
    EmptyResponse,

    #[error("The filename cannot be empty")]
    EmptyFileName,

    #[error("Unknown sort order: {0}")]
    UnknownSorting(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chart error: {0}")]
    Chart(String),
}

impl From<reqwest::Error> for PerspectiveError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            PerspectiveError::Unreachable(e.to_string())
        } else {
            PerspectiveError::Http(e.to_string())
        }
    }
}
