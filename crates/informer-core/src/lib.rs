//! Call Informer Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for Call Informer. It includes:
//!
//! - Domain models (ContactInfo, CallState, CallEvent)
//! - The notification surface consumed by the UI layer
//! - Unified error handling
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
