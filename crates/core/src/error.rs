//! Error types for the AirAdvisor domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator has its own error enum; only [`StoreError`] and
//! [`ValidationError`] ever abort an advisory request.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all AirAdvisor operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Storage errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Air quality errors ---
    #[error("Air quality error: {0}")]
    AirQuality(#[from] AirQualityError),

    // --- Rule resource errors ---
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    // --- Language model errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Request shape ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AirQualityError {
    #[error("City '{0}' not found")]
    CityNotFound(String),

    #[error("Geocoding service failed: {0}")]
    GeoService(String),

    #[error("Pollution service failed: {0}")]
    PollutionService(String),

    #[error("Air quality lookup timed out after {0}s")]
    Timeout(u64),
}

#[derive(Debug, Clone, Error)]
pub enum RuleError {
    #[error("Failed to read rules at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse rules at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned no text: {0}")]
    EmptyResponse(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}
