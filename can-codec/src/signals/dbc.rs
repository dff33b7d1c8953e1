//! DBC file parser
//!
//! Parses Vector DBC files with `can-dbc` and converts them into message
//! layouts. Multiplexed signals are not supported and are skipped; the
//! multiplexor switch itself is kept as a plain field.

use crate::layout::{ByteOrder, MessageLayout, SignalLayout, ValueType};
use crate::types::{CodecError, Result};
use std::path::Path;

/// Extended frames carry bit 31 as a flag in DBC message IDs
const CAN_ID_MASK: u32 = 0x1FFF_FFFF;

/// Parse a DBC file and return message layouts
pub fn parse_dbc_file(path: &Path) -> Result<Vec<MessageLayout>> {
    log::info!("Parsing DBC file: {:?}", path);

    // Read the DBC file as bytes first (handle non-UTF8 encodings)
    let bytes = std::fs::read(path)
        .map_err(|e| CodecError::DbcParseError(format!("Failed to read file {:?}: {}", path, e)))?;

    let dbc_content = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            // Latin-1 maps every byte to the code point of the same value
            log::warn!("DBC file is not UTF-8, trying Latin-1 encoding");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    };

    let messages = parse_dbc_str(&dbc_content)?;
    log::info!("Parsed {} messages from {:?}", messages.len(), path);
    Ok(messages)
}

/// Parse DBC text and return message layouts
pub fn parse_dbc_str(content: &str) -> Result<Vec<MessageLayout>> {
    let dbc = can_dbc::DBC::from_slice(content.as_bytes())
        .map_err(|e| CodecError::DbcParseError(format!("{:?}", e)))?;

    let mut messages = Vec::new();
    for dbc_msg in dbc.messages() {
        match convert_message(dbc_msg) {
            Ok(message) => messages.push(message),
            Err(e) => log::warn!(
                "Skipping message {}: {} (continuing...)",
                dbc_msg.message_name(),
                e
            ),
        }
    }

    Ok(messages)
}

/// Convert a can-dbc message to a MessageLayout
fn convert_message(dbc_msg: &can_dbc::Message) -> Result<MessageLayout> {
    let mut signals = Vec::new();

    for dbc_sig in dbc_msg.signals() {
        if !matches!(
            dbc_sig.multiplexer_indicator(),
            can_dbc::MultiplexIndicator::Plain | can_dbc::MultiplexIndicator::Multiplexor
        ) {
            log::warn!(
                "Skipping multiplexed signal {}.{}",
                dbc_msg.message_name(),
                dbc_sig.name()
            );
            continue;
        }
        signals.push(convert_signal(dbc_sig)?);
    }

    MessageLayout::new(
        dbc_msg.message_name().as_str(),
        dbc_msg.message_id().0 & CAN_ID_MASK,
        *dbc_msg.message_size() as usize,
        signals,
    )
}

/// Convert a can-dbc signal to a SignalLayout
fn convert_signal(dbc_sig: &can_dbc::Signal) -> Result<SignalLayout> {
    let byte_order = match *dbc_sig.byte_order() {
        can_dbc::ByteOrder::LittleEndian => ByteOrder::LittleEndian,
        can_dbc::ByteOrder::BigEndian => ByteOrder::BigEndian,
    };

    let value_type = match *dbc_sig.value_type() {
        can_dbc::ValueType::Signed => ValueType::Signed,
        can_dbc::ValueType::Unsigned => ValueType::Unsigned,
    };

    let start_bit = u16::try_from(*dbc_sig.start_bit()).map_err(|_| {
        CodecError::InvalidLayout(format!(
            "signal '{}' start bit {} out of range",
            dbc_sig.name(),
            dbc_sig.start_bit()
        ))
    })?;
    let length = u16::try_from(*dbc_sig.signal_size()).map_err(|_| {
        CodecError::InvalidLayout(format!(
            "signal '{}' length {} out of range",
            dbc_sig.name(),
            dbc_sig.signal_size()
        ))
    })?;

    let mut builder = SignalLayout::builder(dbc_sig.name().as_str(), start_bit, length, byte_order, value_type)
        .with_scaling(*dbc_sig.factor(), *dbc_sig.offset())
        .with_unit(dbc_sig.unit().as_str());

    // [0|0] means unconstrained
    let (min, max) = (*dbc_sig.min(), *dbc_sig.max());
    if min != 0.0 || max != 0.0 {
        builder = builder.with_physical_range(min, max);
    }

    builder.build()
}
