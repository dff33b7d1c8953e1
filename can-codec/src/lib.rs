//! CAN Signal Codec Library
//!
//! A stateless, data-driven library for packing signal values into CAN
//! frames and unpacking them again, with signal layouts described at
//! runtime (hand-built or loaded from DBC files).
//!
//! # Architecture
//!
//! The engine is layered bottom-up:
//! - [`bits`]: reads and writes one bit-field in Intel or Motorola numbering
//! - [`raw`]: gives the extracted pattern a signedness
//! - [`transform`]: maps raw integers to physical values and back
//! - [`range`]: advisory range checks
//! - [`frame`]: packs and unpacks whole messages
//!
//! [`Codec`] sits on top, pairing a layout database with a configured frame
//! codec.
//!
//! The library does NOT:
//! - Decode value tables (choices)
//! - Handle multiplexed signals, container PDUs or CAN-TP
//! - Read log files
//!
//! # Example Usage
//!
//! ```
//! use can_codec::{pack, unpack, ByteOrder, MessageLayout, MessageValues, SignalLayout, ValueType};
//!
//! let temperature = SignalLayout::builder("Temperature", 0, 12, ByteOrder::BigEndian, ValueType::Signed)
//!     .with_scaling(0.01, 250.0)
//!     .with_unit("degK")
//!     .build()
//!     .unwrap();
//! let layout = MessageLayout::new("ExampleMessage", 0x1F0, 8, vec![temperature]).unwrap();
//!
//! let values = MessageValues::new().with("Temperature", -586i64);
//! let mut frame = [0u8; 8];
//! pack(&layout, &values, &mut frame).unwrap();
//! assert_eq!(frame[..3], [0x01, 0xB6, 0xC0]);
//!
//! let decoded = unpack(&layout, &frame).unwrap();
//! assert_eq!(decoded, values);
//! ```

// Public modules
pub mod bits;
pub mod codec;
pub mod config;
pub mod frame;
pub mod layout;
pub mod range;
pub mod raw;
pub mod signals;
pub mod transform;
pub mod types;

// Re-export main types for convenience
pub use codec::{Codec, MessageKey};
pub use config::{CodecConfig, RangePolicy};
pub use frame::{init, pack, unpack, FrameCodec, MessageValues};
pub use layout::{ByteOrder, MessageLayout, SignalLayout, SignalLayoutBuilder, ValueType};
pub use range::RawRange;
pub use raw::RawValue;
pub use signals::{DatabaseStats, LayoutDatabase};
pub use types::{CodecError, DecodedMessage, DecodedSignal, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: ensure we can create a codec
        let codec = Codec::new();
        let stats = codec.database_stats();
        assert_eq!(stats.num_messages, 0);
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_layouts_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MessageLayout>();
        assert_send_sync::<Codec>();
        assert_send_sync::<FrameCodec>();
    }
}
