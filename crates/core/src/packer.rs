//! Bit-level packing of Huffman output.
//!
//! Encoded text is an arbitrary-length [`BitString`]. Before it can be stored
//! as bytes it is padded to a byte boundary and prefixed with an 8-bit header
//! that records how many pad bits were appended.
//!
//! # Padding Rules
//! - `pad_count = 8 - (len % 8)`, always in `1..=8`
//! - a bitstring that is already byte aligned still gets 8 pad bits
//! - the header is the plain value `pad_count` as an unsigned byte
//!
//! All conversions are MSB-first.
//!
//! # Example
//! ```
//! use huffgrid_core::packer::BitString;
//!
//! let bits = BitString::from_code_str("10111");
//! let padded = bits.pad();                 // 00000011 10111000
//! let bytes = padded.to_bytes().unwrap();
//! assert_eq!(bytes, vec![3, 0b1011_1000]);
//!
//! let restored = BitString::from_bytes(&bytes).remove_padding().unwrap();
//! assert_eq!(restored, bits);
//! ```

use std::collections::HashMap;

use crate::codes::CodeTable;
use crate::error::{Error, HuffmanError, PackError, Result};

/// Width of the pad-count header in bits.
const HEADER_BITS: usize = 8;

/// An owned sequence of bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    pub fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// Parse a string of '0'/'1' chars; any char other than '1' is a 0 bit.
    pub fn from_code_str(code: &str) -> Self {
        let mut bits = Self::new();
        bits.push_code(code);
        bits
    }

    /// Expand bytes MSB-first into 8 bits each.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let bits = bytes
            .iter()
            .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
            .collect();
        Self { bits }
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    /// Append the bits of a '0'/'1' code string.
    pub fn push_code(&mut self, code: &str) {
        self.bits.extend(code.bytes().map(|b| b == b'1'));
    }

    /// Append the low `count` bits of `value`, MSB first.
    fn push_value(&mut self, value: u8, count: usize) {
        for shift in (0..count).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// Number of zero bits [`BitString::pad`] appends for this length.
    pub fn pad_count(&self) -> usize {
        8 - self.bits.len() % 8
    }

    /// Pad to a byte boundary and prefix the pad-count header.
    pub fn pad(&self) -> BitString {
        let pad_count = self.pad_count();
        let mut padded = BitString {
            bits: Vec::with_capacity(HEADER_BITS + self.bits.len() + pad_count),
        };
        padded.push_value(pad_count as u8, HEADER_BITS);
        padded.bits.extend_from_slice(&self.bits);
        padded.bits.extend(std::iter::repeat(false).take(pad_count));
        padded
    }

    /// Pack into bytes MSB-first.
    ///
    /// # Errors
    /// `Error::MisalignedPadding` if the length is not a multiple of 8.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.bits.len() % 8 != 0 {
            return Err(Error::MisalignedPadding {
                bits: self.bits.len(),
            });
        }

        let bytes = self
            .bits
            .chunks_exact(8)
            .map(|byte| byte.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
            .collect();
        Ok(bytes)
    }

    /// Strip the pad-count header and the pad bits it describes.
    ///
    /// The header is read as a plain byte value; it is not re-derived from
    /// the remaining length.
    ///
    /// # Errors
    /// - `PackError::MissingHeader` if fewer than 8 bits are present
    /// - `PackError::PaddingOverrun` if the header exceeds the remaining bits
    pub fn remove_padding(&self) -> Result<BitString> {
        if self.bits.len() < HEADER_BITS {
            return Err(PackError::MissingHeader {
                available: self.bits.len(),
            }
            .into());
        }

        let pad = self.bits[..HEADER_BITS]
            .iter()
            .fold(0usize, |acc, &bit| (acc << 1) | bit as usize);
        let body = &self.bits[HEADER_BITS..];
        if pad > body.len() {
            return Err(PackError::PaddingOverrun {
                pad,
                available: body.len(),
            }
            .into());
        }

        Ok(BitString {
            bits: body[..body.len() - pad].to_vec(),
        })
    }
}

/// Concatenate the code of every symbol of `text`, in order.
///
/// # Errors
/// `HuffmanError::MissingCode` if a symbol has no code in `table`.
pub fn encode(text: &str, table: &CodeTable) -> Result<BitString> {
    let mut bits = BitString::new();
    for symbol in text.chars() {
        let code = table
            .code(symbol)
            .ok_or(HuffmanError::MissingCode { symbol })?;
        bits.push_code(code);
    }
    Ok(bits)
}

/// Decode `bits` by growing a prefix until it matches a code.
///
/// Prefix-freeness of `reverse` makes the first match the only match.
///
/// # Errors
/// `HuffmanError::TrailingBits` if bits remain that complete no code.
pub fn decode(bits: &BitString, reverse: &HashMap<String, char>) -> Result<String> {
    let mut text = String::new();
    let mut current = String::new();

    for bit in bits.iter() {
        current.push(if bit { '1' } else { '0' });
        if let Some(&symbol) = reverse.get(&current) {
            text.push(symbol);
            current.clear();
        }
    }

    if !current.is_empty() {
        return Err(HuffmanError::TrailingBits {
            count: current.len(),
        }
        .into());
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::FrequencyTable;
    use crate::tree::build_tree;

    fn table_for(text: &str) -> CodeTable {
        CodeTable::from_tree(&build_tree(&FrequencyTable::from_text(text)).unwrap())
    }

    #[test]
    fn test_pad_partial_byte() {
        let bits = BitString::from_code_str("101");
        let padded = bits.pad();
        assert_eq!(padded.len(), 16);
        assert_eq!(padded.to_bytes().unwrap(), vec![5, 0b1010_0000]);
    }

    #[test]
    fn test_pad_aligned_gets_full_byte() {
        let bits = BitString::from_code_str("11110000");
        assert_eq!(bits.pad_count(), 8);
        let padded = bits.pad();
        assert_eq!(padded.to_bytes().unwrap(), vec![8, 0b1111_0000, 0]);
    }

    #[test]
    fn test_pad_empty() {
        let padded = BitString::new().pad();
        assert_eq!(padded.to_bytes().unwrap(), vec![8, 0]);
        assert!(BitString::from_bytes(&[8, 0])
            .remove_padding()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_padding_invariant() {
        for len in 0..40 {
            let bits = BitString::from_code_str(&"1".repeat(len));
            let pad = bits.pad_count();
            assert!((1..=8).contains(&pad));
            assert_eq!(bits.pad().len() % 8, 0);
        }
    }

    #[test]
    fn test_remove_padding() {
        for code in ["", "1", "0110", "1010101", "11110000", "101100111"] {
            let bits = BitString::from_code_str(code);
            let bytes = bits.pad().to_bytes().unwrap();
            let restored = BitString::from_bytes(&bytes).remove_padding().unwrap();
            assert_eq!(restored, bits, "code {code:?}");
        }
    }

    #[test]
    fn test_misaligned_to_bytes() {
        let bits = BitString::from_code_str("1011");
        assert!(matches!(
            bits.to_bytes(),
            Err(Error::MisalignedPadding { bits: 4 })
        ));
    }

    #[test]
    fn test_remove_padding_missing_header() {
        let bits = BitString::from_code_str("101");
        assert!(matches!(
            bits.remove_padding(),
            Err(Error::Pack(PackError::MissingHeader { available: 3 }))
        ));
    }

    #[test]
    fn test_remove_padding_overrun() {
        // Header claims 200 pad bits but only 8 follow
        let bits = BitString::from_bytes(&[200, 0]);
        assert!(matches!(
            bits.remove_padding(),
            Err(Error::Pack(PackError::PaddingOverrun { pad: 200, available: 8 }))
        ));
    }

    #[test]
    fn test_encode_decode() {
        let text = "aaabbc";
        let table = table_for(text);
        let bits = encode(text, &table).unwrap();
        // a=0 a=0 a=0 b=11 b=11 c=10
        assert_eq!(bits, BitString::from_code_str("000111110"));
        assert_eq!(decode(&bits, table.reverse()).unwrap(), text);
    }

    #[test]
    fn test_encode_missing_symbol() {
        let table = table_for("abc");
        assert!(matches!(
            encode("abd", &table),
            Err(Error::Huffman(HuffmanError::MissingCode { symbol: 'd' }))
        ));
    }

    #[test]
    fn test_decode_trailing_bits() {
        let table = table_for("aaabbc");
        // "1" alone is not a code
        let bits = BitString::from_code_str("01");
        assert!(matches!(
            decode(&bits, table.reverse()),
            Err(Error::Huffman(HuffmanError::TrailingBits { count: 1 }))
        ));
    }

    #[test]
    fn test_from_bytes_msb_first() {
        let bits = BitString::from_bytes(&[0b1000_0001]);
        let collected: Vec<bool> = bits.iter().collect();
        assert_eq!(
            collected,
            vec![true, false, false, false, false, false, false, true]
        );
    }
}
