/*!
 * Error types for the vttai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching provider error
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Whether another attempt at the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RequestFailed(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors that can occur while translating a document
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The backend could not produce a translation for the batch
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend returned a different number of lines than it was given
    #[error("Backend returned {actual} translations for a batch of {expected} lines")]
    Cardinality {
        /// Number of lines sent to the backend
        expected: usize,
        /// Number of lines the backend returned
        actual: usize,
    },

    /// Emitting translated or structural lines to the output failed
    #[error("Failed to write output: {0}")]
    Output(String),
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        Self::Output(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// The source subtitle file does not exist or is not a regular file
    #[error("Input file not found: {0:?}")]
    InputNotFound(PathBuf),

    /// Invalid batch size, language code or provider settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
