//! Unified error handling for Call Informer
//!
//! This module provides a single error type covering every failure scenario
//! in the application, split along the lines that matter operationally:
//! errors that block startup, errors that drive the reconnect loop, and
//! errors that are logged and dropped.

use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Configuration Errors ====================
    // Block startup, surfaced to the operator, never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ==================== Connection Errors ====================
    // Drive the reconnect loop. AuthFailed is kept distinct from
    // Transport so callers can tell bad credentials from a flaky network.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    // ==================== Protocol Errors ====================
    // Logged at debug level and dropped, never propagated.
    #[error("Protocol parse error: {0}")]
    ProtocolParse(String),

    // ==================== Lookup Errors ====================
    // Non-fatal: the display degrades to the raw number.
    #[error("Caller lookup failed: {0}")]
    Lookup(String),

    // ==================== Internal Errors ====================
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the reconnect loop should treat this as a transient failure.
    ///
    /// Auth failures are retried too (credentials may be fixed server-side),
    /// but they are reported differently and never counted as network churn.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Transport(_))
    }

    /// Whether this error must stop startup and reach the operator.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::Validation(_))
    }

    /// Returns the error code used in diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::Validation(_) => "validation_error",
            AppError::AuthFailed(_) => "auth_failed",
            AppError::Transport(_) => "transport_error",
            AppError::ProtocolParse(_) => "protocol_parse_error",
            AppError::Lookup(_) => "lookup_failed",
            AppError::Serialization(_) => "serialization_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
