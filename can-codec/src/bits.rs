//! Bit-field accessor
//!
//! Maps a signal's `start_bit`, length and byte order onto the bytes of a
//! frame, then reads or writes the raw bit pattern.
//!
//! Two equivalent formulations live here:
//! - [`bit_positions`] walks the field one bit at a time, yielding
//!   `(byte_index, bit_in_byte, bit_weight)` for every bit. It is the
//!   reference definition of both byte orders.
//! - [`compute_spans`] batches those bits into at most one [`BitSpan`] per
//!   byte. The codec precomputes spans once per signal and uses them for
//!   every read and write.
//!
//! ## Little-endian (Intel)
//! `start_bit` is the LSB. The field is the contiguous run
//! `start_bit..start_bit + length` of the frame viewed as one little-endian
//! bit stream.
//!
//! ## Big-endian (Motorola)
//! `start_bit` is the MSB, at bit `start_bit % 8` of byte `start_bit / 8`.
//! Following bits descend toward bit 0 of that byte and continue at bit 7
//! of the next byte.

use crate::layout::ByteOrder;

/// One bit of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitPosition {
    pub byte_index: usize,
    /// Bit within the byte, 0 = least significant
    pub bit_in_byte: u8,
    /// Place value in the raw integer, 0 = least significant
    pub bit_weight: u8,
}

/// One contiguous span of bits within a single byte of the frame.
///
/// Take `num_bits` consecutive bits starting at `bit_offset` in
/// `data[byte_index]` and place them at `value_shift` in the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitSpan {
    pub byte_index: usize,
    /// Lowest bit position within the byte (0..=7).
    pub bit_offset: u8,
    /// How many consecutive bits in this span (1..=8).
    pub num_bits: u8,
    /// Where these bits land in the raw u64, LSB-relative.
    pub value_shift: u8,
}

impl BitSpan {
    fn mask(&self) -> u8 {
        ((1u16 << self.num_bits) - 1) as u8
    }
}

/// Every bit of a field, most significant first for big-endian and least
/// significant first for little-endian.
pub fn bit_positions(start_bit: u16, length: u16, byte_order: ByteOrder) -> Vec<BitPosition> {
    let mut positions = Vec::with_capacity(length as usize);

    match byte_order {
        ByteOrder::LittleEndian => {
            for i in 0..length as usize {
                let bit_pos = start_bit as usize + i;
                positions.push(BitPosition {
                    byte_index: bit_pos / 8,
                    bit_in_byte: (bit_pos % 8) as u8,
                    bit_weight: i as u8,
                });
            }
        }
        ByteOrder::BigEndian => {
            let mut byte_index = (start_bit / 8) as usize;
            let mut bit_in_byte = (start_bit % 8) as u8;
            for i in 0..length {
                positions.push(BitPosition {
                    byte_index,
                    bit_in_byte,
                    bit_weight: (length - 1 - i) as u8,
                });
                if bit_in_byte == 0 {
                    byte_index += 1;
                    bit_in_byte = 7;
                } else {
                    bit_in_byte -= 1;
                }
            }
        }
    }

    positions
}

/// Batch a field into per-byte spans.
///
/// A 64-bit field produces at most 9 spans.
pub fn compute_spans(start_bit: u16, length: u16, byte_order: ByteOrder) -> Vec<BitSpan> {
    let mut spans = Vec::new();
    let mut byte_index = (start_bit / 8) as usize;
    let mut bit_index = (start_bit % 8) as u8;
    let mut remaining = length;

    match byte_order {
        ByteOrder::BigEndian => {
            // First span carries the MSBs of the raw value.
            while remaining > 0 {
                let num_bits = std::cmp::min(bit_index as u16 + 1, remaining) as u8;
                let bit_offset = bit_index + 1 - num_bits;
                remaining -= num_bits as u16;
                spans.push(BitSpan {
                    byte_index,
                    bit_offset,
                    num_bits,
                    value_shift: remaining as u8,
                });
                byte_index += 1;
                bit_index = 7;
            }
        }
        ByteOrder::LittleEndian => {
            // First span carries the LSBs of the raw value.
            let mut value_shift: u16 = 0;
            while remaining > 0 {
                let num_bits = std::cmp::min(8 - bit_index as u16, remaining) as u8;
                spans.push(BitSpan {
                    byte_index,
                    bit_offset: bit_index,
                    num_bits,
                    value_shift: value_shift as u8,
                });
                value_shift += num_bits as u16;
                remaining -= num_bits as u16;
                byte_index += 1;
                bit_index = 0;
            }
        }
    }

    spans
}

/// Number of leading frame bytes a field touches
pub fn required_bytes(spans: &[BitSpan]) -> usize {
    spans.iter().map(|s| s.byte_index + 1).max().unwrap_or(0)
}

/// Read the raw unsigned pattern of a field.
///
/// `data` must cover [`required_bytes`]; the frame codec checks this before
/// calling.
pub fn read(data: &[u8], spans: &[BitSpan]) -> u64 {
    let mut result: u64 = 0;
    for span in spans {
        let bits = (data[span.byte_index] >> span.bit_offset) & span.mask();
        result |= (bits as u64) << span.value_shift;
    }
    result
}

/// Write the low bits of `raw` into a field, leaving every other bit of
/// `data` untouched.
pub fn write(data: &mut [u8], spans: &[BitSpan], raw: u64) {
    for span in spans {
        let mask = span.mask();
        let bits = ((raw >> span.value_shift) as u8) & mask;
        data[span.byte_index] &= !(mask << span.bit_offset);
        data[span.byte_index] |= bits << span.bit_offset;
    }
}

/// Bit-at-a-time read over [`bit_positions`]
pub fn read_by_position(data: &[u8], positions: &[BitPosition]) -> u64 {
    positions.iter().fold(0u64, |acc, p| {
        let bit = (data[p.byte_index] >> p.bit_in_byte) & 1;
        acc | ((bit as u64) << p.bit_weight)
    })
}

/// Bit-at-a-time write over [`bit_positions`]
pub fn write_by_position(data: &mut [u8], positions: &[BitPosition], raw: u64) {
    for p in positions {
        let bit = ((raw >> p.bit_weight) & 1) as u8;
        data[p.byte_index] &= !(1u8 << p.bit_in_byte);
        data[p.byte_index] |= bit << p.bit_in_byte;
    }
}
