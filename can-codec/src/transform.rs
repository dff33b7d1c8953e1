//! Scale/offset transform
//!
//! `physical = raw * scale + offset` and its inverse. Encoding rounds half
//! away from zero (`f64::round`), so `x.5` quanta always move outward:
//! `2.5 -> 3`, `-2.5 -> -3`. Decoding is done in `f64`.
//!
//! The float-to-integer cast saturates: results beyond the 64-bit type
//! clamp to its bounds and NaN becomes 0. Narrowing to the field width
//! happens later, when the codec masks the value into the frame.

use crate::layout::ValueType;
use crate::raw::RawValue;

/// `(physical - offset) / scale`, rounded half away from zero, before any
/// integer cast
pub fn raw_quotient(physical: f64, scale: f64, offset: f64) -> f64 {
    ((physical - offset) / scale).round()
}

/// Physical to raw
pub fn encode(physical: f64, scale: f64, offset: f64, value_type: ValueType) -> RawValue {
    let raw = raw_quotient(physical, scale, offset);
    match value_type {
        ValueType::Signed => RawValue::Signed(raw as i64),
        ValueType::Unsigned => RawValue::Unsigned(raw as u64),
    }
}

/// Raw to physical
pub fn decode(raw: RawValue, scale: f64, offset: f64) -> f64 {
    raw.as_f64() * scale + offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_bounds() {
        assert_eq!(decode(RawValue::Signed(0), 0.01, 250.0), 250.0);
        assert_eq!(encode(229.52, 0.01, 250.0, ValueType::Signed), RawValue::Signed(-2048));
        assert_eq!(encode(270.47, 0.01, 250.0, ValueType::Signed), RawValue::Signed(2047));
        assert_eq!(encode(250.55, 0.01, 250.0, ValueType::Signed), RawValue::Signed(55));
        assert_eq!(encode(244.14, 0.01, 250.0, ValueType::Signed), RawValue::Signed(-586));
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(encode(2.5, 1.0, 0.0, ValueType::Signed), RawValue::Signed(3));
        assert_eq!(encode(-2.5, 1.0, 0.0, ValueType::Signed), RawValue::Signed(-3));
        assert_eq!(encode(0.5, 1.0, 0.0, ValueType::Unsigned), RawValue::Unsigned(1));
        assert_eq!(encode(2.4999, 1.0, 0.0, ValueType::Signed), RawValue::Signed(2));
        // Halfway after scaling: 0.25 / 0.5 = 0.5
        assert_eq!(encode(0.25, 0.5, 0.0, ValueType::Unsigned), RawValue::Unsigned(1));
    }

    #[test]
    fn test_saturating_cast() {
        assert_eq!(encode(-5.0, 1.0, 0.0, ValueType::Unsigned), RawValue::Unsigned(0));
        assert_eq!(encode(1e30, 1.0, 0.0, ValueType::Signed), RawValue::Signed(i64::MAX));
        assert_eq!(encode(f64::NAN, 1.0, 0.0, ValueType::Signed), RawValue::Signed(0));
    }

    #[test]
    fn test_negative_scale() {
        let raw = encode(-10.0, -0.5, 0.0, ValueType::Unsigned);
        assert_eq!(raw, RawValue::Unsigned(20));
        assert_eq!(decode(raw, -0.5, 0.0), -10.0);
    }

    #[test]
    fn test_round_trip_over_legal_raw_domain() {
        let cases: &[(f64, f64, i64, i64)] = &[
            (0.01, 250.0, -2048, 2047),
            (0.1, 0.0, 0, 50),
            (0.001, -40.0, -32768, 32767),
            (0.25, 1.5, -512, 511),
            (-0.1, 3.0, -1024, 1023),
        ];
        for &(scale, offset, min, max) in cases {
            for raw in min..=max {
                let physical = decode(RawValue::Signed(raw), scale, offset);
                assert_eq!(
                    encode(physical, scale, offset, ValueType::Signed),
                    RawValue::Signed(raw),
                    "scale={scale} offset={offset} raw={raw}"
                );
            }
        }
    }

    #[test]
    fn test_round_trip_wide_integers() {
        // Exact while |raw| stays within the f64 mantissa
        for raw in [0i64, 1, -1, (1 << 53) - 1, -(1 << 53), i64::MIN] {
            let physical = decode(RawValue::Signed(raw), 1.0, 0.0);
            assert_eq!(encode(physical, 1.0, 0.0, ValueType::Signed), RawValue::Signed(raw));
        }
        let physical = decode(RawValue::Unsigned(1 << 63), 1.0, 0.0);
        assert_eq!(encode(physical, 1.0, 0.0, ValueType::Unsigned), RawValue::Unsigned(1 << 63));
    }
}
