//! Raw integer model
//!
//! The accessor moves plain `u64` bit patterns in and out of a frame. This
//! module gives those patterns a signedness: sign extension on the way out
//! of the buffer and two's-complement masking on the way in.

use crate::layout::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mask covering the low `length` bits. Safe for `length == 64`.
pub fn mask(length: u16) -> u64 {
    if length >= 64 {
        u64::MAX
    } else {
        (1u64 << length) - 1
    }
}

/// Sign-extend a `length`-bit two's-complement pattern to 64 bits
///
/// A 64-bit pattern already carries its sign bit in place and is
/// reinterpreted as is.
pub fn to_signed(bits: u64, length: u16) -> i64 {
    if length >= 64 {
        return bits as i64;
    }

    let sign_bit = 1u64 << (length - 1);
    if (bits & sign_bit) != 0 {
        // Equivalent to bits - (1 << length)
        (bits | !mask(length)) as i64
    } else {
        bits as i64
    }
}

/// Two's-complement bit pattern of `value`, truncated to `length` bits
pub fn to_unsigned_bits(value: i64, length: u16) -> u64 {
    (value as u64) & mask(length)
}

/// The integer carried by a signal, before scale and offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Unsigned(u64),
    Signed(i64),
}

impl RawValue {
    /// Interpret a pattern read from the frame
    pub fn from_bits(bits: u64, length: u16, value_type: ValueType) -> Self {
        match value_type {
            ValueType::Unsigned => RawValue::Unsigned(bits & mask(length)),
            ValueType::Signed => RawValue::Signed(to_signed(bits, length)),
        }
    }

    /// Pattern to write into a `length`-bit field. Values wider than the
    /// field wrap.
    pub fn to_bits(self, length: u16) -> u64 {
        match self {
            RawValue::Unsigned(v) => v & mask(length),
            RawValue::Signed(v) => to_unsigned_bits(v, length),
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            RawValue::Unsigned(_) => ValueType::Unsigned,
            RawValue::Signed(_) => ValueType::Signed,
        }
    }

    /// Lossless widening used for comparisons across signedness
    pub fn as_i128(self) -> i128 {
        match self {
            RawValue::Unsigned(v) => v as i128,
            RawValue::Signed(v) => v as i128,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            RawValue::Unsigned(v) => v as f64,
            RawValue::Signed(v) => v as f64,
        }
    }

    /// Zero of the given signedness
    pub fn zero(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Unsigned => RawValue::Unsigned(0),
            ValueType::Signed => RawValue::Signed(0),
        }
    }

    /// Smallest value a `length`-bit field can carry
    pub fn min_for(length: u16, value_type: ValueType) -> Self {
        match value_type {
            ValueType::Unsigned => RawValue::Unsigned(0),
            ValueType::Signed => RawValue::Signed(to_signed(1u64 << (length.min(64) - 1), length)),
        }
    }

    /// Largest value a `length`-bit field can carry
    pub fn max_for(length: u16, value_type: ValueType) -> Self {
        match value_type {
            ValueType::Unsigned => RawValue::Unsigned(mask(length)),
            ValueType::Signed => RawValue::Signed((mask(length) >> 1) as i64),
        }
    }

    /// Width of the smallest native integer that holds a `length`-bit field
    pub fn storage_bits(length: u16) -> u8 {
        match length {
            0..=8 => 8,
            9..=16 => 16,
            17..=32 => 32,
            _ => 64,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Unsigned(v) => write!(f, "{}", v),
            RawValue::Signed(v) => write!(f, "{}", v),
        }
    }
}

impl From<u64> for RawValue {
    fn from(value: u64) -> Self {
        RawValue::Unsigned(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Signed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extend_12bit() {
        assert_eq!(to_signed(0x800, 12), -2048);
        assert_eq!(to_signed(0x7FF, 12), 2047);
        assert_eq!(to_signed(0xFFF, 12), -1);
        assert_eq!(to_signed(0xDB6, 12), -586);
    }

    #[test]
    fn test_sign_extend_edges() {
        assert_eq!(to_signed(1, 1), -1);
        assert_eq!(to_signed(0, 1), 0);
        assert_eq!(to_signed(0x4000_0000_0000_0000, 63), -0x4000_0000_0000_0000);
        assert_eq!(to_signed(0x8000_0000_0000_0000, 64), i64::MIN);
        assert_eq!(to_signed(u64::MAX, 64), -1);
    }

    #[test]
    fn test_to_unsigned_bits() {
        assert_eq!(to_unsigned_bits(-1, 3), 0b111);
        assert_eq!(to_unsigned_bits(-586, 12), 0xDB6);
        assert_eq!(to_unsigned_bits(-5, 33), 0x1_FFFF_FFFB);
        assert_eq!(to_unsigned_bits(-1, 64), u64::MAX);
        assert_eq!(to_unsigned_bits(i64::MIN, 64), 0x8000_0000_0000_0000);
    }

    #[test]
    fn test_signed_patterns_survive_masking() {
        for length in 1..=16u16 {
            let min = RawValue::min_for(length, ValueType::Signed).as_i128() as i64;
            let max = RawValue::max_for(length, ValueType::Signed).as_i128() as i64;
            for value in min..=max {
                let bits = to_unsigned_bits(value, length);
                assert_eq!(to_signed(bits, length), value, "length {length}");
            }
        }
    }

    #[test]
    fn test_representable_bounds() {
        assert_eq!(RawValue::min_for(6, ValueType::Unsigned), RawValue::Unsigned(0));
        assert_eq!(RawValue::max_for(6, ValueType::Unsigned), RawValue::Unsigned(63));
        assert_eq!(RawValue::min_for(12, ValueType::Signed), RawValue::Signed(-2048));
        assert_eq!(RawValue::max_for(12, ValueType::Signed), RawValue::Signed(2047));
        assert_eq!(RawValue::min_for(64, ValueType::Signed), RawValue::Signed(i64::MIN));
        assert_eq!(RawValue::max_for(64, ValueType::Signed), RawValue::Signed(i64::MAX));
        assert_eq!(RawValue::max_for(64, ValueType::Unsigned), RawValue::Unsigned(u64::MAX));
        assert_eq!(RawValue::min_for(1, ValueType::Signed), RawValue::Signed(-1));
        assert_eq!(RawValue::max_for(1, ValueType::Signed), RawValue::Signed(0));
    }

    #[test]
    fn test_wide_values_wrap() {
        // 300 does not fit in 8 bits; the write path keeps the low byte
        assert_eq!(RawValue::Unsigned(300).to_bits(8), 44);
        assert_eq!(RawValue::Signed(-129).to_bits(8), 0x7F);
    }

    #[test]
    fn test_storage_bits() {
        assert_eq!(RawValue::storage_bits(1), 8);
        assert_eq!(RawValue::storage_bits(12), 16);
        assert_eq!(RawValue::storage_bits(17), 32);
        assert_eq!(RawValue::storage_bits(33), 64);
        assert_eq!(RawValue::storage_bits(64), 64);
    }
}
