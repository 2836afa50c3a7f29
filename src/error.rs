//! Error types for Kagami

use thiserror::Error;

/// Main error type for Kagami
#[derive(Error, Debug)]
pub enum KagamiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tracking error: {0}")]
    Tracking(#[from] TrackingError),

    #[error("Rig error: {0}")]
    Rig(#[from] RigError),

    #[error("Web server error: {0}")]
    Web(#[from] WebError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration value: {field} - {message}")]
    InvalidValue { field: String, message: String },
}

/// Tracking-related errors
///
/// Only source construction and transport failures surface here; a frame
/// with no detected face is not an error and is absorbed by the pipeline.
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("Detection source unavailable: {0}")]
    Unavailable(String),

    #[error("Tracker receiver error: {0}")]
    Receiver(String),

    #[error("Tracker parse error: {0}")]
    Parse(String),

    #[error("Tracker subprocess error: {0}")]
    Subprocess(String),
}

/// Avatar rig errors
#[derive(Error, Debug)]
pub enum RigError {
    #[error("Avatar asset not found: {0}")]
    AssetNotFound(String),

    #[error("Failed to load avatar: {0}")]
    Load(String),

    #[error("Avatar is missing required joint: {0}")]
    MissingJoint(String),

    #[error("Unknown avatar name: {0}")]
    UnknownAvatar(String),
}

/// Web server errors
#[derive(Error, Debug)]
pub enum WebError {
    #[error("Failed to bind to address: {0}")]
    Bind(String),

    #[error("Server startup failed: {0}")]
    Startup(String),
}

/// Result type alias for Kagami operations
pub type Result<T> = std::result::Result<T, KagamiError>;
