//! Frame codec
//!
//! Moves a whole message between a byte buffer and a [`MessageValues`]
//! object. Everything the codec can reject is checked before the
//! destination buffer is touched, so a failed pack leaves it unmodified.

use crate::config::CodecConfig;
use crate::layout::{MessageLayout, SignalLayout};
use crate::raw::RawValue;
use crate::types::{CodecError, DecodedMessage, DecodedSignal, Result};

/// Raw values for one message, keyed by signal name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageValues {
    values: Vec<(String, RawValue)>,
}

impl MessageValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set a signal's raw value
    pub fn with(mut self, name: impl Into<String>, raw: impl Into<RawValue>) -> Self {
        self.set_raw(name, raw);
        self
    }

    /// Set a signal's raw value, returning the previous one
    pub fn set_raw(&mut self, name: impl Into<String>, raw: impl Into<RawValue>) -> Option<RawValue> {
        let name = name.into();
        let raw = raw.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, raw)),
            None => {
                self.values.push((name, raw));
                None
            }
        }
    }

    pub fn raw(&self, name: &str) -> Option<RawValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, raw)| *raw)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, RawValue)> {
        self.values.iter().map(|(n, raw)| (n.as_str(), *raw))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Packs and unpacks frames according to a [`CodecConfig`]
///
/// The codec holds no per-frame state; one instance can serve any number of
/// layouts and threads.
#[derive(Debug, Clone, Default)]
pub struct FrameCodec {
    config: CodecConfig,
}

impl FrameCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Values object with every signal at its default raw value
    pub fn init(&self, layout: &MessageLayout) -> MessageValues {
        MessageValues {
            values: layout
                .signals()
                .iter()
                .map(|s| (s.name().to_string(), s.default_raw()))
                .collect(),
        }
    }

    /// Write every signal of `values` into `dst`
    ///
    /// Fills `dst[..length_bytes]` first, so bits no signal covers come out
    /// as 0, or as the configured padding pattern. Returns the number of
    /// bytes written.
    pub fn pack(&self, layout: &MessageLayout, values: &MessageValues, dst: &mut [u8]) -> Result<usize> {
        check_capacity(layout, dst.len())?;

        if values.len() != layout.signals().len() {
            return Err(CodecError::Argument(format!(
                "message '{}' has {} signals, got {} values",
                layout.name(),
                layout.signals().len(),
                values.len()
            )));
        }

        let mut raws = Vec::with_capacity(layout.signals().len());
        for signal in layout.signals() {
            let raw = values.raw(signal.name()).ok_or_else(|| {
                CodecError::Argument(format!(
                    "no value for signal '{}' of message '{}'",
                    signal.name(),
                    layout.name()
                ))
            })?;
            if raw.value_type() != signal.value_type() {
                return Err(CodecError::Argument(format!(
                    "signal '{}' is {:?}, got a {:?} value",
                    signal.name(),
                    signal.value_type(),
                    raw.value_type()
                )));
            }
            if self.config.enforces_ranges() && !signal.is_in_range(raw) {
                return Err(out_of_range(signal, raw.to_string()));
            }
            raws.push(raw);
        }

        let frame = &mut dst[..layout.length_bytes()];
        frame.fill(self.config.padding.unwrap_or(0));
        for (signal, raw) in layout.signals().iter().zip(raws) {
            signal.insert(frame, raw);
        }

        log::trace!(
            "Packed message {} (ID 0x{:X}): {:02X?}",
            layout.name(),
            layout.frame_id(),
            frame
        );
        Ok(layout.length_bytes())
    }

    /// Read every signal of `layout` out of `src`
    ///
    /// With `allow_truncated`, a short buffer yields only the signals whose
    /// bits are all present.
    pub fn unpack(&self, layout: &MessageLayout, src: &[u8]) -> Result<MessageValues> {
        if src.len() < layout.length_bytes() && self.config.allow_truncated {
            log::warn!(
                "Message {} (ID 0x{:X}) truncated: {} of {} bytes",
                layout.name(),
                layout.frame_id(),
                src.len(),
                layout.length_bytes()
            );
        } else {
            check_capacity(layout, src.len())?;
        }

        let values = layout
            .signals()
            .iter()
            .filter(|s| s.required_bytes() <= src.len())
            .map(|s| (s.name().to_string(), s.extract(src)))
            .collect();

        log::trace!("Unpacked message {} (ID 0x{:X})", layout.name(), layout.frame_id());
        Ok(MessageValues { values })
    }

    /// Encode physical values by signal name, then pack
    ///
    /// Every signal of the message needs a value. Unknown names are an
    /// error unless the codec is non-strict, in which case they are skipped.
    pub fn pack_physical(&self, layout: &MessageLayout, physical: &[(&str, f64)], dst: &mut [u8]) -> Result<usize> {
        check_capacity(layout, dst.len())?;

        let mut values = MessageValues::new();
        for &(name, value) in physical {
            let Some(signal) = layout.signal(name) else {
                if self.config.strict {
                    return Err(CodecError::Argument(format!(
                        "message '{}' has no signal '{}'",
                        layout.name(),
                        name
                    )));
                }
                log::warn!("Skipping unknown signal '{}' for message {}", name, layout.name());
                continue;
            };
            if value.is_nan() {
                return Err(CodecError::Argument(format!("signal '{}' value is NaN", name)));
            }
            if self.config.enforces_ranges() && !signal.is_physical_in_range(value) {
                return Err(out_of_range(signal, value.to_string()));
            }
            if values.set_raw(name, signal.encode(value)).is_some() {
                return Err(CodecError::Argument(format!("signal '{}' given more than once", name)));
            }
        }

        self.pack(layout, &values, dst)
    }

    /// Unpack and convert every raw value to its physical value
    pub fn unpack_physical(&self, layout: &MessageLayout, src: &[u8]) -> Result<DecodedMessage> {
        let values = self.unpack(layout, src)?;

        let signals = values
            .iter()
            .filter_map(|(name, raw)| {
                let signal = layout.signal(name)?;
                Some(DecodedSignal {
                    name: name.to_string(),
                    raw,
                    physical: signal.decode(raw),
                    unit: signal.unit().map(str::to_string),
                })
            })
            .collect();

        Ok(DecodedMessage {
            frame_id: layout.frame_id(),
            name: layout.name().to_string(),
            signals,
        })
    }
}

fn check_capacity(layout: &MessageLayout, available: usize) -> Result<()> {
    if available < layout.length_bytes() {
        return Err(CodecError::Capacity {
            message: layout.name().to_string(),
            required: layout.length_bytes(),
            available,
        });
    }
    Ok(())
}

fn out_of_range(signal: &SignalLayout, value: String) -> CodecError {
    CodecError::OutOfRange {
        signal: signal.name().to_string(),
        value,
    }
}

/// [`FrameCodec::pack`] with the default configuration
pub fn pack(layout: &MessageLayout, values: &MessageValues, dst: &mut [u8]) -> Result<usize> {
    FrameCodec::default().pack(layout, values, dst)
}

/// [`FrameCodec::unpack`] with the default configuration
pub fn unpack(layout: &MessageLayout, src: &[u8]) -> Result<MessageValues> {
    FrameCodec::default().unpack(layout, src)
}

/// [`FrameCodec::init`] with the default configuration
pub fn init(layout: &MessageLayout) -> MessageValues {
    FrameCodec::default().init(layout)
}
