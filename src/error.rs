//! # Error Types
//!
//! Custom error types for the Hoermann bridge using `thiserror`.
//!
//! The wire core never produces these on its byte or tick paths: malformed
//! frames are dropped and counted there. Errors only surface from one-shot
//! frame encoding/decoding, configuration and the host serial layer.

use thiserror::Error;

/// Main error type for the Hoermann bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Wire protocol errors
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(String),

    /// None of the candidate serial ports could be opened
    #[error("No serial port could be opened (tried: {0})")]
    SerialPortNotFound(String),

    /// Action name not understood by the command parser
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

/// Result type alias for the Hoermann bridge
pub type Result<T> = std::result::Result<T, BridgeError>;
