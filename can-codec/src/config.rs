//! Codec configuration types
//!
//! Knobs that change how the frame codec treats input it could otherwise
//! accept silently. By default ranges are advisory, short buffers are
//! errors, unknown signal names are rejected and unused bits pack as 0.

use serde::{Deserialize, Serialize};

/// What to do with values outside a signal's raw range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Encode as-is; the field width masks whatever does not fit
    #[default]
    Permissive,
    /// Fail the pack with `OutOfRange` and leave the buffer alone
    Enforce,
}

/// Configuration for the codec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub range_policy: RangePolicy,

    /// Decode the signals that fit in a short source buffer instead of
    /// failing with a capacity error
    pub allow_truncated: bool,

    /// Reject unknown signal names when encoding by name
    pub strict: bool,

    /// Byte pattern for bits no signal covers; `None` packs them as 0
    pub padding: Option<u8>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            range_policy: RangePolicy::Permissive,
            allow_truncated: false,
            strict: true,
            padding: None,
        }
    }
}

impl CodecConfig {
    /// Create a new codec configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the range policy
    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = policy;
        self
    }

    /// Builder method: accept frames shorter than the message length
    pub fn with_allow_truncated(mut self, enabled: bool) -> Self {
        self.allow_truncated = enabled;
        self
    }

    /// Builder method: reject or skip unknown signal names
    pub fn with_strict(mut self, enabled: bool) -> Self {
        self.strict = enabled;
        self
    }

    /// Builder method: fill unused bits from `pattern` instead of zeros
    pub fn with_padding(mut self, pattern: u8) -> Self {
        self.padding = Some(pattern);
        self
    }

    pub fn enforces_ranges(&self) -> bool {
        self.range_policy == RangePolicy::Enforce
    }
}
