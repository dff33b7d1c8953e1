//! Frame text formats
//!
//! Reads the frame notations candump produces:
//! - compact: `1F0#C006E00000000000`, optionally prefixed by
//!   `(timestamp) interface` as in `candump -l`
//! - default: `vcan0  1F0   [8]  C0 06 E0 00 00 00 00 00`

use anyhow::{anyhow, bail, Context, Result};

/// One frame read from text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub id: u32,
    pub data: Vec<u8>,
}

/// Parse a candump line in either notation
pub fn parse_frame_line(line: &str) -> Result<Frame> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if let Some(id_and_data) = tokens.iter().find(|t| t.contains('#')) {
        return parse_compact(id_and_data);
    }

    // interface, id, [len], bytes...
    match tokens.as_slice() {
        [_, id, len, bytes @ ..] if len.starts_with('[') && len.ends_with(']') => {
            let len: usize = len[1..len.len() - 1]
                .parse()
                .with_context(|| format!("Error parsing length of {line}"))?;
            let data = bytes
                .iter()
                .map(|b| u8::from_str_radix(b, 16))
                .collect::<Result<Vec<u8>, _>>()
                .with_context(|| format!("Error parsing data of {line}"))?;
            if data.len() != len {
                bail!("Length {} does not match {} data bytes", len, data.len());
            }
            Ok(Frame {
                id: parse_id(id)?,
                data,
            })
        }
        _ => Err(anyhow!("Error no id#data on {line}")),
    }
}

fn parse_compact(id_and_data: &str) -> Result<Frame> {
    let (id, data) = id_and_data
        .split_once('#')
        .ok_or_else(|| anyhow!("Error no id#data on {id_and_data}"))?;
    if data.starts_with('#') || data.starts_with('R') {
        bail!("CAN FD and remote frames are not supported: {id_and_data}");
    }
    Ok(Frame {
        id: parse_id(id)?,
        data: parse_hex(data)?,
    })
}

fn parse_id(id: &str) -> Result<u32> {
    u32::from_str_radix(id, 16).with_context(|| format!("Invalid frame id '{id}'"))
}

/// Hex string to bytes; separators `.` and whitespace are ignored
pub fn parse_hex(hex: &str) -> Result<Vec<u8>> {
    let digits: String = hex.chars().filter(|c| !c.is_whitespace() && *c != '.').collect();
    if !digits.is_ascii() {
        bail!("Invalid hex digits in '{hex}'");
    }
    if digits.len() % 2 != 0 {
        bail!("Odd number of hex digits in '{hex}'");
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16).with_context(|| format!("Invalid hex byte in '{hex}'"))
        })
        .collect()
}

/// Largest standard (11-bit) identifier
const MAX_STANDARD_ID: u32 = 0x7FF;

/// Frame as a compact candump token, e.g. `1F0#C006E00000000000`
///
/// Extended identifiers are written with 8 digits, which is how candump and
/// cansend tell them apart from standard ones.
pub fn format_compact(id: u32, data: &[u8]) -> String {
    let mut s = if id > MAX_STANDARD_ID {
        format!("{:08X}#", id)
    } else {
        format!("{:03X}#", id)
    };
    for byte in data {
        s.push_str(&format!("{:02X}", byte));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_line() {
        let frame = parse_frame_line("1F0#C006E00000000000").unwrap();
        assert_eq!(frame.id, 0x1F0);
        assert_eq!(frame.data, vec![0xC0, 0x06, 0xE0, 0, 0, 0, 0, 0]);

        let frame = parse_frame_line("(1436509053.850870) vcan0 00A#11223344FF667788").unwrap();
        assert_eq!(frame.id, 0x00A);
        assert_eq!(frame.data.len(), 8);
    }

    #[test]
    fn test_parse_default_line() {
        let frame = parse_frame_line("  vcan0  1F4   [4]  01 02 03 04").unwrap();
        assert_eq!(frame.id, 0x1F4);
        assert_eq!(frame.data, vec![1, 2, 3, 4]);

        assert!(parse_frame_line("  vcan0  1F4   [3]  01 02 03 04").is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_frame_line("  vcan0  ERROR").is_err());
        assert!(parse_frame_line("").is_err());
        assert!(parse_frame_line("XYZ#00").is_err());
        assert!(parse_frame_line("1F0#ABC").is_err());
        assert!(parse_frame_line("1F0##0112233").is_err());
    }

    #[test]
    fn test_parse_hex_separators() {
        assert_eq!(parse_hex("c0 06 e0").unwrap(), vec![0xC0, 0x06, 0xE0]);
        assert_eq!(parse_hex("C0.06.E0").unwrap(), vec![0xC0, 0x06, 0xE0]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(0x1F0, &[0xC0, 0x06, 0xE0]), "1F0#C006E0");
        assert_eq!(format_compact(0xA, &[]), "00A#");
        assert_eq!(format_compact(0x7FF, &[0x01]), "7FF#01");
        assert_eq!(format_compact(0x800, &[0x01]), "00000800#01");
        assert_eq!(format_compact(0x18FEF100, &[0xAB]), "18FEF100#AB");

        let frame = parse_frame_line(&format_compact(0x18FEF100, &[0xAB])).unwrap();
        assert_eq!(frame.id, 0x18FEF100);
    }
}
