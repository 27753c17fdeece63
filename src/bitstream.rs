//! Byte/bit conversion shared by every codec.
//!
//! Bits are ordered most-significant-first within each byte. The codec never
//! materialises a `Vec<bool>` for the carrier: it walks a [`BitCursor`] over
//! the framed bytes and collects extracted bits into a [`BitSink`].

use crate::error::{Result, StegError};

/// Length of the framing header in bits.
pub const HEADER_BITS: usize = 32;

/// Expand bytes into bits, MSB first.
pub fn to_bits(bytes: &[u8]) -> Vec<bool> {
    let cursor = BitCursor::new(bytes);
    (0..cursor.len()).map(|i| cursor.bit(i)).collect()
}

/// Pack bits (MSB first) back into bytes.
pub fn from_bits(bits: &[bool]) -> Result<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(StegError::MalformedLength(bits.len()));
    }
    let mut sink = BitSink::with_capacity(bits.len());
    for &bit in bits {
        sink.push(bit);
    }
    sink.into_bytes()
}

/// Encode a u32 as 32 big-endian bits.
pub fn encode_uint32(n: u32) -> [bool; HEADER_BITS] {
    let mut bits = [false; HEADER_BITS];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (n >> (31 - i)) & 1 == 1;
    }
    bits
}

/// Decode the first 32 bits of `bits` as a big-endian u32.
///
/// Missing trailing bits read as zero.
pub fn decode_uint32(bits: &[bool]) -> u32 {
    (0..HEADER_BITS).fold(0u32, |acc, i| {
        (acc << 1) | bits.get(i).copied().unwrap_or(false) as u32
    })
}

/// Read-only view of a byte buffer addressed bit by bit.
#[derive(Debug, Clone, Copy)]
pub struct BitCursor<'a> {
    bytes: &'a [u8],
}

impl<'a> BitCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Total number of addressable bits.
    pub fn len(&self) -> usize {
        self.bytes.len() * 8
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bit at `index`. Positions past the end read as zero, which is what the
    /// codec wants for padding the final sample group.
    pub fn bit(&self, index: usize) -> bool {
        match self.bytes.get(index / 8) {
            Some(byte) => (byte >> (7 - index % 8)) & 1 == 1,
            None => false,
        }
    }

    /// `width` bits starting at `start`, packed into the low bits of a u8 with
    /// the first bit most significant.
    pub fn group(&self, start: usize, width: u8) -> u8 {
        (0..width as usize).fold(0u8, |acc, i| (acc << 1) | self.bit(start + i) as u8)
    }
}

/// Accumulates bits MSB first into a byte vector.
#[derive(Debug, Default, Clone)]
pub struct BitSink {
    bytes: Vec<u8>,
    len: usize,
}

impl BitSink {
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 1 << (7 - self.len % 8);
        }
        self.len += 1;
    }

    /// Push the low `width` bits of `value`, most significant first.
    pub fn push_group(&mut self, value: u8, width: u8) {
        for shift in (0..width).rev() {
            self.push((value >> shift) & 1 == 1);
        }
    }

    /// Number of bits pushed so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Finish, failing if the bits do not fill whole bytes.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        if self.len % 8 != 0 {
            return Err(StegError::MalformedLength(self.len));
        }
        Ok(self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bits_msb_first() {
        let bits = to_bits(&[0b1000_0001, 0x40]);
        assert_eq!(bits.len(), 16);
        assert!(bits[0]);
        assert!(!bits[1]);
        assert!(bits[7]);
        assert!(bits[9]);
        assert_eq!(bits.iter().filter(|&&b| b).count(), 3);
    }

    #[test]
    fn test_from_bits_roundtrip() {
        let data = b"Hello, pixels!";
        assert_eq!(from_bits(&to_bits(data)).unwrap(), data.to_vec());
    }

    #[test]
    fn test_from_bits_rejects_partial_byte() {
        let bits = vec![true; 12];
        match from_bits(&bits) {
            Err(StegError::MalformedLength(12)) => {}
            other => panic!("expected MalformedLength, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(to_bits(&[]).is_empty());
        assert!(from_bits(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_uint32_roundtrip() {
        for n in [0u32, 1, 96, 0xDEAD_BEEF, u32::MAX] {
            assert_eq!(decode_uint32(&encode_uint32(n)), n);
        }
    }

    #[test]
    fn test_uint32_is_big_endian() {
        let bits = encode_uint32(1);
        assert!(bits[31]);
        assert!(bits[..31].iter().all(|&b| !b));
        assert_eq!(to_bits(&96u32.to_be_bytes()), encode_uint32(96).to_vec());
    }

    #[test]
    fn test_cursor_group_pads_with_zero() {
        let cursor = BitCursor::new(&[0b1111_1111]);
        assert_eq!(cursor.group(0, 3), 0b111);
        assert_eq!(cursor.group(6, 3), 0b110);
        assert_eq!(cursor.group(8, 2), 0);
    }

    #[test]
    fn test_sink_push_group() {
        let mut sink = BitSink::with_capacity(9);
        sink.push_group(0b101, 3);
        sink.push_group(0b01, 2);
        sink.push_group(0b110, 3);
        assert_eq!(sink.len(), 8);
        assert_eq!(sink.into_bytes().unwrap(), vec![0b1010_1110]);
    }
}
