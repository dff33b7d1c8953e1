//! Range validation
//!
//! Range checks are advisory. Pack encodes out-of-range values as-is unless
//! the codec is configured with [`crate::config::RangePolicy::Enforce`].

use crate::layout::ValueType;
use crate::raw::RawValue;
use crate::transform;

/// Inclusive bounds on a signal's raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRange {
    min: RawValue,
    max: RawValue,
}

impl RawRange {
    pub fn new(min: RawValue, max: RawValue) -> Self {
        Self { min, max }
    }

    /// Everything a `length`-bit field of the given signedness can carry
    pub fn full(length: u16, value_type: ValueType) -> Self {
        Self {
            min: RawValue::min_for(length, value_type),
            max: RawValue::max_for(length, value_type),
        }
    }

    /// Raw bounds derived from physical ones through the inverse
    /// transform, clamped to what the field can carry. A negative scale
    /// swaps the ends.
    pub fn from_physical(
        min: f64,
        max: f64,
        scale: f64,
        offset: f64,
        length: u16,
        value_type: ValueType,
    ) -> Self {
        let full = Self::full(length, value_type);
        let a = transform::raw_quotient(min, scale, offset);
        let b = transform::raw_quotient(max, scale, offset);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = lo.max(full.min.as_f64()).min(full.max.as_f64());
        let hi = hi.min(full.max.as_f64()).max(full.min.as_f64());

        let to_raw = |v: f64| match value_type {
            ValueType::Signed => RawValue::Signed(v as i64),
            ValueType::Unsigned => RawValue::Unsigned(v as u64),
        };

        Self {
            min: to_raw(lo),
            max: to_raw(hi),
        }
    }

    pub fn min(&self) -> RawValue {
        self.min
    }

    pub fn max(&self) -> RawValue {
        self.max
    }

    /// `min <= raw <= max`, compared across signedness
    pub fn contains(&self, raw: RawValue) -> bool {
        let raw = raw.as_i128();
        self.min.as_i128() <= raw && raw <= self.max.as_i128()
    }

    /// True when `physical` lies within [`Self::physical_bounds`]. The value
    /// is compared unrounded, so nothing past a bound is admitted just
    /// because it quantizes onto it. The slack only absorbs the binary error
    /// of bounds such as 270.47.
    pub fn contains_physical(&self, physical: f64, scale: f64, offset: f64) -> bool {
        if !physical.is_finite() {
            return false;
        }
        let (lo, hi) = self.physical_bounds(scale, offset);
        lo - bound_slack(lo, scale) <= physical && physical <= hi + bound_slack(hi, scale)
    }

    /// Physical values of the two bounds, lowest first
    pub fn physical_bounds(&self, scale: f64, offset: f64) -> (f64, f64) {
        let a = transform::decode(self.min, scale, offset);
        let b = transform::decode(self.max, scale, offset);
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

fn bound_slack(bound: f64, scale: f64) -> f64 {
    scale.abs() * 1e-6 + bound.abs() * f64::EPSILON * 4.0
}
