//! Signal and message layouts
//!
//! Layouts are the only contract between the codec engine and whatever
//! describes the frames (a DBC file, a generator, hand-written tables).
//! They are validated once when built and are read-only afterwards, so a
//! single layout can be shared by any number of concurrent pack/unpack
//! calls.

use crate::bits::{self, BitSpan};
use crate::range::RawRange;
use crate::raw::RawValue;
use crate::transform;
use crate::types::{CodecError, Result};
use serde::{Deserialize, Serialize};

/// Byte order for signal extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// Little-endian (Intel format)
    LittleEndian,
    /// Big-endian (Motorola format)
    BigEndian,
}

/// Value type for signal interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Two's-complement over the signal's width
    Signed,
    Unsigned,
}

/// Where one signal lives in a frame and how its raw value maps to a
/// physical one
#[derive(Debug, Clone, PartialEq)]
pub struct SignalLayout {
    name: String,
    start_bit: u16,
    length: u16,
    byte_order: ByteOrder,
    value_type: ValueType,
    scale: f64,
    offset: f64,
    range: RawRange,
    default_raw: RawValue,
    unit: Option<String>,
    spans: Vec<BitSpan>,
}

impl SignalLayout {
    /// Start describing a signal. Scale defaults to 1, offset to 0, the raw
    /// range to everything the width can carry and the default to 0.
    pub fn builder(
        name: impl Into<String>,
        start_bit: u16,
        length: u16,
        byte_order: ByteOrder,
        value_type: ValueType,
    ) -> SignalLayoutBuilder {
        SignalLayoutBuilder {
            name: name.into(),
            start_bit,
            length,
            byte_order,
            value_type,
            scale: 1.0,
            offset: 0.0,
            raw_range: None,
            physical_range: None,
            default_raw: None,
            unit: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_bit(&self) -> u16 {
        self.start_bit
    }

    /// Width in bits (1..=64)
    pub fn length(&self) -> u16 {
        self.length
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn range(&self) -> &RawRange {
        &self.range
    }

    pub fn default_raw(&self) -> RawValue {
        self.default_raw
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Precomputed per-byte spans used by pack and unpack
    pub fn spans(&self) -> &[BitSpan] {
        &self.spans
    }

    /// Number of leading frame bytes this signal touches
    pub fn required_bytes(&self) -> usize {
        bits::required_bytes(&self.spans)
    }

    /// Physical to raw: `round((physical - offset) / scale)`, half away
    /// from zero
    pub fn encode(&self, physical: f64) -> RawValue {
        transform::encode(physical, self.scale, self.offset, self.value_type)
    }

    /// Raw to physical: `raw * scale + offset`
    pub fn decode(&self, raw: RawValue) -> f64 {
        transform::decode(raw, self.scale, self.offset)
    }

    pub fn is_in_range(&self, raw: RawValue) -> bool {
        self.range.contains(raw)
    }

    /// True when `physical` lies between the decoded raw bounds
    pub fn is_physical_in_range(&self, physical: f64) -> bool {
        self.range.contains_physical(physical, self.scale, self.offset)
    }

    /// Read this signal out of a frame that covers [`Self::required_bytes`]
    pub fn extract(&self, data: &[u8]) -> RawValue {
        RawValue::from_bits(bits::read(data, &self.spans), self.length, self.value_type)
    }

    /// Write this signal into a frame, masking `raw` to the field width
    pub fn insert(&self, data: &mut [u8], raw: RawValue) {
        bits::write(data, &self.spans, raw.to_bits(self.length));
    }
}

/// Builder for [`SignalLayout`]; all validation happens in [`Self::build`]
#[derive(Debug, Clone)]
pub struct SignalLayoutBuilder {
    name: String,
    start_bit: u16,
    length: u16,
    byte_order: ByteOrder,
    value_type: ValueType,
    scale: f64,
    offset: f64,
    raw_range: Option<(RawValue, RawValue)>,
    physical_range: Option<(f64, f64)>,
    default_raw: Option<RawValue>,
    unit: Option<String>,
}

impl SignalLayoutBuilder {
    /// Builder method: set scale and offset
    pub fn with_scaling(mut self, scale: f64, offset: f64) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    /// Builder method: bound the raw value explicitly
    pub fn with_raw_range(mut self, min: impl Into<RawValue>, max: impl Into<RawValue>) -> Self {
        self.raw_range = Some((min.into(), max.into()));
        self.physical_range = None;
        self
    }

    /// Builder method: bound the raw value through the inverse transform of
    /// a physical range
    pub fn with_physical_range(mut self, min: f64, max: f64) -> Self {
        self.physical_range = Some((min, max));
        self.raw_range = None;
        self
    }

    /// Builder method: value used by `init`
    pub fn with_default_raw(mut self, raw: impl Into<RawValue>) -> Self {
        self.default_raw = Some(raw.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        self.unit = if unit.is_empty() { None } else { Some(unit) };
        self
    }

    pub fn build(self) -> Result<SignalLayout> {
        let invalid = |reason: String| {
            CodecError::InvalidLayout(format!("signal '{}': {}", self.name, reason))
        };

        if self.length == 0 || self.length > 64 {
            return Err(invalid(format!("length {} not in 1..=64", self.length)));
        }
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err(invalid(format!("scale {} must be finite and non-zero", self.scale)));
        }
        if !self.offset.is_finite() {
            return Err(invalid(format!("offset {} must be finite", self.offset)));
        }

        let range = match (self.raw_range, self.physical_range) {
            (Some((min, max)), _) => {
                if min.value_type() != self.value_type || max.value_type() != self.value_type {
                    return Err(invalid("raw range signedness differs from the signal".to_string()));
                }
                RawRange::new(min, max)
            }
            (None, Some((min, max))) => {
                RawRange::from_physical(min, max, self.scale, self.offset, self.length, self.value_type)
            }
            (None, None) => RawRange::full(self.length, self.value_type),
        };
        if range.min().as_i128() > range.max().as_i128() {
            return Err(invalid(format!("empty raw range {}..{}", range.min(), range.max())));
        }

        let default_raw = self.default_raw.unwrap_or(RawValue::zero(self.value_type));
        if default_raw.value_type() != self.value_type {
            return Err(invalid("default value signedness differs from the signal".to_string()));
        }

        let spans = bits::compute_spans(self.start_bit, self.length, self.byte_order);

        Ok(SignalLayout {
            name: self.name,
            start_bit: self.start_bit,
            length: self.length,
            byte_order: self.byte_order,
            value_type: self.value_type,
            scale: self.scale,
            offset: self.offset,
            range,
            default_raw,
            unit: self.unit,
            spans,
        })
    }
}

/// A complete CAN message layout
#[derive(Debug, Clone, PartialEq)]
pub struct MessageLayout {
    name: String,
    frame_id: u32,
    length_bytes: usize,
    signals: Vec<SignalLayout>,
}

impl MessageLayout {
    /// Check that every signal fits in `length_bytes` and that names are
    /// unique. Overlap between signals is the describer's responsibility.
    pub fn new(
        name: impl Into<String>,
        frame_id: u32,
        length_bytes: usize,
        signals: Vec<SignalLayout>,
    ) -> Result<Self> {
        let name = name.into();

        for (i, signal) in signals.iter().enumerate() {
            if signal.required_bytes() > length_bytes {
                return Err(CodecError::InvalidLayout(format!(
                    "signal '{}' needs {} bytes but message '{}' is {} bytes long",
                    signal.name(),
                    signal.required_bytes(),
                    name,
                    length_bytes
                )));
            }
            if signals[..i].iter().any(|other| other.name() == signal.name()) {
                return Err(CodecError::InvalidLayout(format!(
                    "duplicate signal '{}' in message '{}'",
                    signal.name(),
                    name
                )));
            }
        }

        Ok(Self {
            name,
            frame_id,
            length_bytes,
            signals,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    /// Fixed frame length
    pub fn length_bytes(&self) -> usize {
        self.length_bytes
    }

    pub fn signals(&self) -> &[SignalLayout] {
        &self.signals
    }

    pub fn signal(&self, name: &str) -> Option<&SignalLayout> {
        self.signals.iter().find(|s| s.name == name)
    }

    pub fn signal_index(&self, name: &str) -> Option<usize> {
        self.signals.iter().position(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temperature() -> SignalLayout {
        SignalLayout::builder("Temperature", 0, 12, ByteOrder::BigEndian, ValueType::Signed)
            .with_scaling(0.01, 250.0)
            .with_physical_range(229.52, 270.47)
            .with_unit("degK")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let signal = SignalLayout::builder("AverageRadius", 6, 6, ByteOrder::BigEndian, ValueType::Unsigned)
            .build()
            .unwrap();
        assert_eq!(signal.scale(), 1.0);
        assert_eq!(signal.offset(), 0.0);
        assert_eq!(signal.range().min(), RawValue::Unsigned(0));
        assert_eq!(signal.range().max(), RawValue::Unsigned(63));
        assert_eq!(signal.default_raw(), RawValue::Unsigned(0));
        assert_eq!(signal.unit(), None);
    }

    #[test]
    fn test_physical_range_maps_to_raw_bounds() {
        let signal = temperature();
        assert_eq!(signal.range().min(), RawValue::Signed(-2048));
        assert_eq!(signal.range().max(), RawValue::Signed(2047));
        assert_eq!(signal.unit(), Some("degK"));
    }

    #[test]
    fn test_rejects_bad_lengths() {
        for length in [0u16, 65] {
            let result = SignalLayout::builder("s", 0, length, ByteOrder::LittleEndian, ValueType::Unsigned).build();
            assert!(matches!(result, Err(CodecError::InvalidLayout(_))), "length {length}");
        }
    }

    #[test]
    fn test_rejects_zero_scale() {
        let result = SignalLayout::builder("s", 0, 8, ByteOrder::LittleEndian, ValueType::Unsigned)
            .with_scaling(0.0, 1.0)
            .build();
        assert!(matches!(result, Err(CodecError::InvalidLayout(_))));
    }

    #[test]
    fn test_rejects_mismatched_signedness() {
        let result = SignalLayout::builder("s", 0, 8, ByteOrder::LittleEndian, ValueType::Unsigned)
            .with_default_raw(-1i64)
            .build();
        assert!(matches!(result, Err(CodecError::InvalidLayout(_))));

        let result = SignalLayout::builder("s", 0, 8, ByteOrder::LittleEndian, ValueType::Signed)
            .with_raw_range(0u64, 10u64)
            .build();
        assert!(matches!(result, Err(CodecError::InvalidLayout(_))));
    }

    #[test]
    fn test_message_rejects_signal_outside_frame() {
        let signal = SignalLayout::builder("s", 60, 8, ByteOrder::LittleEndian, ValueType::Unsigned)
            .build()
            .unwrap();
        let result = MessageLayout::new("M", 1, 8, vec![signal]);
        assert!(matches!(result, Err(CodecError::InvalidLayout(_))));

        // Motorola field whose MSB sits in the last byte runs past the end
        let signal = SignalLayout::builder("s", 63, 9, ByteOrder::BigEndian, ValueType::Unsigned)
            .build()
            .unwrap();
        let result = MessageLayout::new("M", 1, 8, vec![signal]);
        assert!(matches!(result, Err(CodecError::InvalidLayout(_))));
    }

    #[test]
    fn test_message_rejects_duplicate_names() {
        let a = SignalLayout::builder("s", 0, 8, ByteOrder::LittleEndian, ValueType::Unsigned)
            .build()
            .unwrap();
        let b = SignalLayout::builder("s", 8, 8, ByteOrder::LittleEndian, ValueType::Unsigned)
            .build()
            .unwrap();
        let result = MessageLayout::new("M", 1, 8, vec![a, b]);
        assert!(matches!(result, Err(CodecError::InvalidLayout(_))));
    }

    #[test]
    fn test_message_lookup() {
        let message = MessageLayout::new("ExampleMessage", 0x1F0, 8, vec![temperature()]).unwrap();
        assert_eq!(message.frame_id(), 0x1F0);
        assert_eq!(message.length_bytes(), 8);
        assert_eq!(message.signal_index("Temperature"), Some(0));
        assert!(message.signal("Enable").is_none());
    }

    #[test]
    fn test_layouts_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SignalLayout>();
        assert_send_sync::<MessageLayout>();
    }
}
