//! Core types for the CAN codec library
//!
//! This module defines the error type shared by every layer of the codec and
//! the decoded-signal records the float-facing API hands back to callers.

use crate::raw::RawValue;
use serde::Serialize;
use std::fmt;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors that can occur while building layouts or packing/unpacking frames
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Buffer shorter than the message's declared length
    #[error("Buffer too small for message '{message}': need {required} bytes, got {available}")]
    Capacity {
        message: String,
        required: usize,
        available: usize,
    },

    /// Value object does not describe the layout it is used with
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Raised only when range enforcement is configured
    #[error("Signal '{signal}' value {value} is outside its allowed range")]
    OutOfRange { signal: String, value: String },

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Failed to parse DBC file: {0}")]
    DbcParseError(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),
}

/// A signal read out of a frame, with both representations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedSignal {
    /// Signal name from the layout
    pub name: String,
    /// Bit pattern interpreted with the signal's signedness
    pub raw: RawValue,
    /// `raw * scale + offset`
    pub physical: f64,
    /// Engineering unit, carried through untouched
    pub unit: Option<String>,
}

impl fmt::Display for DecodedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{}: {} {} (raw {})", self.name, self.physical, unit, self.raw),
            None => write!(f, "{}: {} (raw {})", self.name, self.physical, self.raw),
        }
    }
}

/// All signals of one frame, decoded to physical values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedMessage {
    /// Frame identifier from the layout
    pub frame_id: u32,
    /// Message name from the layout
    pub name: String,
    pub signals: Vec<DecodedSignal>,
}

impl DecodedMessage {
    /// Look up a decoded signal by name
    pub fn signal(&self, name: &str) -> Option<&DecodedSignal> {
        self.signals.iter().find(|s| s.name == name)
    }
}
