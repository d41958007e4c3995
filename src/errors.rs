/*!
 * Error types for the doctrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

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
        message: String,
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
    /// Whether a retry of the same request could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// Errors that make a provider unusable before any request is sent
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The selected provider requires a credential and none was found
    #[error("Provider '{provider}' requires an API key but none is configured")]
    MissingCredential {
        /// Provider identifier
        provider: String,
    },

    /// The provider identifier is not in the registry
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// The endpoint override is not a valid URL
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint {
        /// The rejected URL text
        url: String,
        /// Parser message
        reason: String,
    },

    /// The requested model is not offered by the provider
    #[error("Provider '{provider}' does not offer model '{model}'")]
    UnknownModel {
        /// Provider identifier
        provider: String,
        /// The rejected model name
        model: String,
    },
}

/// Errors that can occur while processing a single document
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Error reading or writing a document file
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// The document contains no translatable text
    #[error("Document is empty: {0}")]
    EmptyDocument(String),

    /// The document type is not handled by this processor
    #[error("Unsupported document type: {0}")]
    UnsupportedFormat(String),

    /// A chunk translation failed
    #[error("Translation failed: {0}")]
    Translation(#[from] ProviderError),

    /// The processor finished without producing an output file
    #[error("No output was produced for: {0}")]
    MissingOutput(String),
}

/// Errors from the credential store itself
///
/// Encryption or decryption failure is deliberately absent: the vault
/// degrades to plaintext storage with a warning instead of failing.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Error reading or writing the credential document
    #[error("Vault I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error serializing or deserializing the credential document
    #[error("Vault serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No usable per-user location for the credential document
    #[error("No data directory available for the credential vault")]
    NoDataDir,
}

/// Errors from batch lifecycle management
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// A batch is already running
    #[error("A translation batch is already running")]
    Busy,

    /// start() was called with no files
    #[error("No files to translate")]
    EmptyBatch,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from provider configuration
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Error from document processing
    #[error("Processing error: {0}")]
    Processing(#[from] ProcessingError),

    /// Error from the credential vault
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    /// Error from batch orchestration
    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),

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
