//! Layout database
//!
//! Collects message layouts from any number of DBC files (or hand-built
//! tables) into one registry, queryable by frame ID and by name.

use crate::layout::{MessageLayout, SignalLayout};
use std::collections::HashMap;

/// Registry of message layouts
#[derive(Debug, Default)]
pub struct LayoutDatabase {
    /// Key: frame ID
    messages: HashMap<u32, MessageLayout>,

    /// Key: message name, value: frame ID
    message_lookup: HashMap<String, u32>,
}

impl LayoutDatabase {
    /// Create a new empty layout database
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message layout, replacing any layout already registered under
    /// the same frame ID
    pub fn add_message(&mut self, message: MessageLayout) {
        let frame_id = message.frame_id();

        if let Some(previous) = self.messages.get(&frame_id) {
            log::warn!(
                "Duplicate frame ID 0x{:X}: {} replaces {}",
                frame_id,
                message.name(),
                previous.name()
            );
            let previous_name = previous.name().to_string();
            self.message_lookup.remove(&previous_name);
        }

        if let Some(other_id) = self.message_lookup.get(message.name()) {
            log::warn!(
                "Message name {} already used by ID 0x{:X}, now points to 0x{:X}",
                message.name(),
                other_id,
                frame_id
            );
        }

        log::debug!(
            "Registered message {} (ID 0x{:X}, {} signals)",
            message.name(),
            frame_id,
            message.signals().len()
        );
        self.message_lookup.insert(message.name().to_string(), frame_id);
        self.messages.insert(frame_id, message);
    }

    /// Get the layout registered for a frame ID
    pub fn get_message(&self, frame_id: u32) -> Option<&MessageLayout> {
        self.messages.get(&frame_id)
    }

    /// Get a layout by message name
    pub fn get_message_by_name(&self, name: &str) -> Option<&MessageLayout> {
        self.message_lookup
            .get(name)
            .and_then(|frame_id| self.messages.get(frame_id))
    }

    /// Find all messages containing a specific signal name
    pub fn find_signal(&self, signal_name: &str) -> Vec<(u32, &SignalLayout)> {
        let mut found: Vec<(u32, &SignalLayout)> = self
            .messages
            .values()
            .filter_map(|msg| msg.signal(signal_name).map(|sig| (msg.frame_id(), sig)))
            .collect();
        found.sort_unstable_by_key(|(frame_id, _)| *frame_id);
        found
    }

    /// All layouts, ordered by frame ID
    pub fn messages(&self) -> Vec<&MessageLayout> {
        let mut messages: Vec<&MessageLayout> = self.messages.values().collect();
        messages.sort_unstable_by_key(|msg| msg.frame_id());
        messages
    }

    /// Get database statistics
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            num_messages: self.messages.len(),
            num_signals: self.messages.values().map(|msg| msg.signals().len()).sum(),
        }
    }

    /// Get all frame IDs in the database, sorted
    pub fn get_all_can_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.messages.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Total number of message layouts
    pub num_messages: usize,
    /// Total number of signal layouts
    pub num_signals: usize,
}
