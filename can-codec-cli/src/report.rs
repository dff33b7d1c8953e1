//! Output formatting
//!
//! Text output follows the shape candump users expect: the input line, then
//! `::` and either the decoded message or the reason it could not be
//! decoded. JSON output emits one object per line.

use can_codec::bits;
use can_codec::{ByteOrder, DecodedMessage, MessageLayout, RawValue, SignalLayout, ValueType};
use serde::Serialize;
use std::fmt::Write;

/// Decoded frame in text form
pub fn decoded_text(line: &str, message: &DecodedMessage) -> String {
    let mut out = format!("{} ::\n{}(\n", line.trim_end(), message.name);
    let count = message.signals.len();
    for (i, signal) in message.signals.iter().enumerate() {
        let separator = if i + 1 < count { "," } else { "" };
        match &signal.unit {
            Some(unit) => {
                let _ = writeln!(out, "    {}: {} {}{}", signal.name, signal.physical, unit, separator);
            }
            None => {
                let _ = writeln!(out, "    {}: {}{}", signal.name, signal.physical, separator);
            }
        }
    }
    out.push(')');
    out
}

/// Decoded frame appended to its input line
pub fn decoded_single_line(line: &str, message: &DecodedMessage) -> String {
    let signals: Vec<String> = message
        .signals
        .iter()
        .map(|signal| match &signal.unit {
            Some(unit) => format!("{}: {} {}", signal.name, signal.physical, unit),
            None => format!("{}: {}", signal.name, signal.physical),
        })
        .collect();
    format!("{} :: {}({})", line.trim_end(), message.name, signals.join(", "))
}

/// Line that could not be decoded, with the reason
pub fn error_text(line: &str, error: &str) -> String {
    format!("{} :: {}", line.trim_end(), error)
}

#[derive(Debug, Serialize)]
struct LineError<'a> {
    line: &'a str,
    error: &'a str,
}

pub fn decoded_json(message: &DecodedMessage) -> serde_json::Result<String> {
    serde_json::to_string(message)
}

pub fn error_json(line: &str, error: &str) -> serde_json::Result<String> {
    serde_json::to_string(&LineError {
        line: line.trim(),
        error,
    })
}

/// Encoded frame as JSON
#[derive(Debug, Serialize)]
pub struct EncodedFrame {
    pub frame_id: u32,
    pub name: String,
    pub data: String,
}

/// Serializable view of a message layout
#[derive(Debug, Serialize)]
pub struct LayoutSummary {
    pub name: String,
    pub frame_id: u32,
    pub length_bytes: usize,
    pub signals: Vec<SignalSummary>,
}

#[derive(Debug, Serialize)]
pub struct SignalSummary {
    pub name: String,
    pub start_bit: u16,
    pub length: u16,
    pub byte_order: ByteOrder,
    pub value_type: ValueType,
    pub scale: f64,
    pub offset: f64,
    pub raw_min: RawValue,
    pub raw_max: RawValue,
    pub minimum: f64,
    pub maximum: f64,
    pub unit: Option<String>,
}

impl From<&SignalLayout> for SignalSummary {
    fn from(signal: &SignalLayout) -> Self {
        let (minimum, maximum) = signal.range().physical_bounds(signal.scale(), signal.offset());
        Self {
            name: signal.name().to_string(),
            start_bit: signal.start_bit(),
            length: signal.length(),
            byte_order: signal.byte_order(),
            value_type: signal.value_type(),
            scale: signal.scale(),
            offset: signal.offset(),
            raw_min: signal.range().min(),
            raw_max: signal.range().max(),
            minimum,
            maximum,
            unit: signal.unit().map(str::to_string),
        }
    }
}

impl From<&MessageLayout> for LayoutSummary {
    fn from(message: &MessageLayout) -> Self {
        Self {
            name: message.name().to_string(),
            frame_id: message.frame_id(),
            length_bytes: message.length_bytes(),
            signals: message.signals().iter().map(SignalSummary::from).collect(),
        }
    }
}

/// Human-readable description of a message layout
pub fn layout_text(message: &MessageLayout) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Name:           {}", message.name());
    let _ = writeln!(out, "  Id:             0x{:x}", message.frame_id());
    let _ = writeln!(out, "  Length:         {} bytes", message.length_bytes());
    let _ = writeln!(out, "  Layout:\n");
    out.push_str(&bit_grid(message));
    let _ = writeln!(out, "\n  Signals:\n");

    for (i, signal) in message.signals().iter().enumerate() {
        let summary = SignalSummary::from(signal);
        let order = match summary.byte_order {
            ByteOrder::LittleEndian => "little_endian",
            ByteOrder::BigEndian => "big_endian",
        };
        let kind = match summary.value_type {
            ValueType::Signed => "signed",
            ValueType::Unsigned => "unsigned",
        };
        let _ = writeln!(
            out,
            "    {} {}: start {}, length {}, {} {}, scale {}, offset {}, range [{}|{}] {}",
            signal_mark(i),
            summary.name,
            summary.start_bit,
            summary.length,
            order,
            kind,
            summary.scale,
            summary.offset,
            summary.minimum,
            summary.maximum,
            summary.unit.as_deref().unwrap_or("-"),
        );
    }
    out
}

/// One character per signal, cycling through the alphabet
fn signal_mark(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Byte rows with bit 7 on the left; each cell names the signal owning it
fn bit_grid(message: &MessageLayout) -> String {
    let mut cells = vec!['.'; message.length_bytes() * 8];
    for (i, signal) in message.signals().iter().enumerate() {
        for pos in bits::bit_positions(signal.start_bit(), signal.length(), signal.byte_order()) {
            if let Some(cell) = cells.get_mut(pos.byte_index * 8 + pos.bit_in_byte as usize) {
                *cell = signal_mark(i);
            }
        }
    }

    let mut out = String::from("           7 6 5 4 3 2 1 0\n");
    for byte in 0..message.length_bytes() {
        let _ = write!(out, "      {:>4} ", byte);
        for bit in (0..8).rev() {
            let _ = write!(out, " {}", cells[byte * 8 + bit]);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_codec::DecodedSignal;

    fn motohawk() -> MessageLayout {
        let signals = vec![
            SignalLayout::builder("Enable", 7, 1, ByteOrder::BigEndian, ValueType::Unsigned)
                .build()
                .unwrap(),
            SignalLayout::builder("AverageRadius", 6, 6, ByteOrder::BigEndian, ValueType::Unsigned)
                .with_scaling(0.1, 0.0)
                .with_physical_range(0.0, 5.0)
                .with_unit("m")
                .build()
                .unwrap(),
            SignalLayout::builder("Temperature", 0, 12, ByteOrder::BigEndian, ValueType::Signed)
                .with_scaling(0.01, 250.0)
                .with_unit("degK")
                .build()
                .unwrap(),
        ];
        MessageLayout::new("ExampleMessage", 0x1F0, 8, signals).unwrap()
    }

    fn decoded() -> DecodedMessage {
        DecodedMessage {
            frame_id: 0x1F0,
            name: "ExampleMessage".to_string(),
            signals: vec![
                DecodedSignal {
                    name: "Enable".to_string(),
                    raw: RawValue::Unsigned(1),
                    physical: 1.0,
                    unit: None,
                },
                DecodedSignal {
                    name: "Temperature".to_string(),
                    raw: RawValue::Signed(55),
                    physical: 250.55,
                    unit: Some("degK".to_string()),
                },
            ],
        }
    }

    #[test]
    fn test_decoded_text() {
        let text = decoded_text("1F0#C006E00000000000", &decoded());
        assert_eq!(
            text,
            "1F0#C006E00000000000 ::\nExampleMessage(\n    Enable: 1,\n    Temperature: 250.55 degK\n)"
        );
        assert_eq!(error_text("  vcan0  ERROR", "bad line"), "  vcan0  ERROR :: bad line");

        assert_eq!(
            decoded_single_line("1F0#C006E00000000000 ", &decoded()),
            "1F0#C006E00000000000 :: ExampleMessage(Enable: 1, Temperature: 250.55 degK)"
        );
    }

    #[test]
    fn test_decoded_json() {
        let json: serde_json::Value = serde_json::from_str(&decoded_json(&decoded()).unwrap()).unwrap();
        assert_eq!(json["frame_id"], 0x1F0);
        assert_eq!(json["signals"][1]["raw"], 55);
        assert_eq!(json["signals"][1]["unit"], "degK");

        let json: serde_json::Value = serde_json::from_str(&error_json(" x ", "bad").unwrap()).unwrap();
        assert_eq!(json["line"], "x");
        assert_eq!(json["error"], "bad");
    }

    #[test]
    fn test_bit_grid_marks_owners() {
        let grid = bit_grid(&motohawk());
        let rows: Vec<&str> = grid.lines().collect();
        assert_eq!(rows.len(), 9);
        // Enable in bit 7, AverageRadius in bits 6..1, Temperature MSB in bit 0
        assert!(rows[1].ends_with("A B B B B B B C"));
        assert!(rows[2].ends_with("C C C C C C C C"));
        assert!(rows[3].ends_with("C C C . . . . ."));
        assert!(rows[4].ends_with(". . . . . . . ."));
    }

    #[test]
    fn test_layout_summary() {
        let layout = motohawk();
        let summary = LayoutSummary::from(&layout);
        assert_eq!(summary.signals.len(), 3);
        assert_eq!(summary.signals[1].raw_max, RawValue::Unsigned(50));
        assert!((summary.signals[1].maximum - 5.0).abs() < 1e-9);

        let text = layout_text(&layout);
        assert!(text.contains("Id:             0x1f0"));
        assert!(text.contains("C Temperature: start 0, length 12, big_endian signed"));
    }
}
