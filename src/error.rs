//! # UBX Fuzzer Error Handling
//!
//! This module defines the FuzzError enum, which represents the fatal error
//! types that can occur while running a campaign.
//!
//! A device that times out or answers with a malformed frame is not an error:
//! those outcomes are verdicts (see [`crate::ubx::classify::Verdict`]) and end
//! the campaign through archiving rather than through `Err`.

use thiserror::Error;

/// Represents the different error types that can occur in the crate.
#[derive(Debug, Error)]
pub enum FuzzError {
    /// A required directory or configuration file is missing or unusable.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Opening, writing to or reading from the serial link failed.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Reading a corpus file or writing a crash artifact failed.
    #[error("I/O failure: {0}")]
    IoFailure(String),

    /// Indicates an error when parsing or packing a UBX frame.
    #[error("Error parsing UBX frame: {0}")]
    FrameParseError(String),

    /// An operation was attempted in a campaign state that does not allow it.
    #[error("Invalid campaign state: {0}")]
    InvalidState(String),
}
