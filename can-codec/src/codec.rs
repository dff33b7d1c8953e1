//! Main codec API
//!
//! The [`Codec`] struct is the entry point for loading signal definitions
//! and encoding or decoding frames by message name or frame ID.

use crate::config::CodecConfig;
use crate::frame::FrameCodec;
use crate::layout::MessageLayout;
use crate::signals::{DatabaseStats, LayoutDatabase};
use crate::types::{CodecError, DecodedMessage, Result};
use std::fmt;
use std::path::Path;

/// Identifies a message in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey<'a> {
    Id(u32),
    Name(&'a str),
}

impl From<u32> for MessageKey<'_> {
    fn from(frame_id: u32) -> Self {
        MessageKey::Id(frame_id)
    }
}

impl<'a> From<&'a str> for MessageKey<'a> {
    fn from(name: &'a str) -> Self {
        MessageKey::Name(name)
    }
}

impl fmt::Display for MessageKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKey::Id(id) => write!(f, "0x{:X}", id),
            MessageKey::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Layout database plus the frame codec that applies it
#[derive(Debug, Default)]
pub struct Codec {
    /// Internal layout database (loaded from DBC files or built by hand)
    database: LayoutDatabase,
    frame_codec: FrameCodec,
}

impl Codec {
    /// Create a codec with the default configuration and no layouts
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            database: LayoutDatabase::new(),
            frame_codec: FrameCodec::new(config),
        }
    }

    pub fn config(&self) -> &CodecConfig {
        self.frame_codec.config()
    }

    /// Load a DBC file and add its messages to the database
    ///
    /// # Example
    /// ```no_run
    /// use can_codec::Codec;
    /// use std::path::Path;
    ///
    /// let mut codec = Codec::new();
    /// codec.add_dbc(Path::new("powertrain.dbc")).unwrap();
    /// ```
    pub fn add_dbc(&mut self, path: &Path) -> Result<()> {
        log::info!("Loading DBC file: {:?}", path);

        for message in crate::signals::dbc::parse_dbc_file(path)? {
            self.database.add_message(message);
        }

        log::info!("DBC file loaded successfully: {:?}", path);
        Ok(())
    }

    /// Add every message of DBC text to the database
    pub fn add_dbc_str(&mut self, content: &str) -> Result<()> {
        for message in crate::signals::dbc::parse_dbc_str(content)? {
            self.database.add_message(message);
        }
        Ok(())
    }

    /// Register a hand-built layout
    pub fn add_message(&mut self, message: MessageLayout) {
        self.database.add_message(message);
    }

    pub fn database(&self) -> &LayoutDatabase {
        &self.database
    }

    /// Get statistics about loaded layouts
    pub fn database_stats(&self) -> DatabaseStats {
        self.database.stats()
    }

    /// Look up a message by frame ID or name
    pub fn message<'a>(&self, key: impl Into<MessageKey<'a>>) -> Result<&MessageLayout> {
        let key = key.into();
        let found = match key {
            MessageKey::Id(frame_id) => self.database.get_message(frame_id),
            MessageKey::Name(name) => self.database.get_message_by_name(name),
        };
        found.ok_or_else(|| CodecError::MessageNotFound(key.to_string()))
    }

    /// Encode physical signal values into a new frame of the message's length
    ///
    /// # Example
    /// ```no_run
    /// use can_codec::Codec;
    /// use std::path::Path;
    ///
    /// let mut codec = Codec::new();
    /// codec.add_dbc(Path::new("motohawk.dbc")).unwrap();
    /// let frame = codec
    ///     .encode_message("ExampleMessage", &[("Temperature", 250.55), ("AverageRadius", 3.2), ("Enable", 1.0)])
    ///     .unwrap();
    /// assert_eq!(frame.len(), 8);
    /// ```
    pub fn encode_message<'a>(&self, key: impl Into<MessageKey<'a>>, signals: &[(&str, f64)]) -> Result<Vec<u8>> {
        let layout = self.message(key)?;
        let mut frame = vec![0u8; layout.length_bytes()];
        self.frame_codec.pack_physical(layout, signals, &mut frame)?;
        Ok(frame)
    }

    /// Decode a frame into physical signal values
    pub fn decode_message(&self, frame_id: u32, data: &[u8]) -> Result<DecodedMessage> {
        let layout = self.message(frame_id)?;
        log::debug!("Decoding message: {} (ID 0x{:X})", layout.name(), frame_id);
        self.frame_codec.unpack_physical(layout, data)
    }
}
