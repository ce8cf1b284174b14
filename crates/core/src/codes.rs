//! Code table: symbol ↔ bitstring mappings and their serialized form.
//!
//! Codes are strings of `'0'`/`'1'` chars, one char per tree edge
//! (`'0'` = left, `'1'` = right). The forward and reverse maps are always
//! exact inverses of each other.
//!
//! # Serialized Format
//!
//! Only the reverse mapping is stored; it is enough to decode.
//!
//! ```text
//! +----------------------+
//! | Magic (2 bytes)      |  0x48 0x54 ("HT")
//! +----------------------+
//! | entry_count (4)      |  u32 little-endian
//! +----------------------+
//! | entry_count times:   |
//! |   symbol_len (1)     |  UTF-8 length of symbol (1-4)
//! |   symbol (1-4)       |  UTF-8 bytes
//! |   code_len (2)       |  u16 LE number of code bits
//! |   code (ceil(n/8))   |  code bits MSB-first, zero padded
//! +----------------------+
//! ```
//!
//! Entries are written sorted by code so output is deterministic.

use std::collections::HashMap;

use crate::error::{Result, TableError};
use crate::tree::Node;

/// Magic number for serialized tables: "HT" (Huffman Table)
const MAGIC: [u8; 2] = [0x48, 0x54];

/// Code assigned to the only symbol of a single-leaf tree.
pub const SINGLE_SYMBOL_CODE: &str = "0";

/// Forward and reverse Huffman code mappings kept in lock-step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: HashMap<char, String>,
    reverse: HashMap<String, char>,
}

impl CodeTable {
    /// Derive codes by depth-first traversal of `root`.
    ///
    /// A root that is itself a leaf gets [`SINGLE_SYMBOL_CODE`] so that every
    /// symbol has a non-empty code.
    pub fn from_tree(root: &Node) -> Self {
        let mut table = Self::default();
        match root {
            Node::Leaf { symbol, .. } => table.insert(*symbol, SINGLE_SYMBOL_CODE.to_string()),
            Node::Internal { .. } => table.walk(root, &mut String::new()),
        }
        table
    }

    fn walk(&mut self, node: &Node, path: &mut String) {
        match node {
            Node::Leaf { symbol, .. } => self.insert(*symbol, path.clone()),
            Node::Internal { left, right, .. } => {
                path.push('0');
                self.walk(left, path);
                path.pop();

                path.push('1');
                self.walk(right, path);
                path.pop();
            }
        }
    }

    fn insert(&mut self, symbol: char, code: String) {
        self.reverse.insert(code.clone(), symbol);
        self.codes.insert(symbol, code);
    }

    /// Code for `symbol`, if it has one.
    pub fn code(&self, symbol: char) -> Option<&str> {
        self.codes.get(&symbol).map(String::as_str)
    }

    /// Symbol for an exact `code`, if any.
    pub fn symbol(&self, code: &str) -> Option<char> {
        self.reverse.get(code).copied()
    }

    /// The bitstring → symbol mapping used for decoding.
    pub fn reverse(&self) -> &HashMap<String, char> {
        &self.reverse
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Check that no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        first_prefix_pair(&self.sorted_codes()).is_none()
    }

    fn sorted_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.reverse.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Serialize the reverse mapping.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&(self.reverse.len() as u32).to_le_bytes());

        for code in self.sorted_codes() {
            let symbol = self.reverse[code];
            let mut utf8 = [0u8; 4];
            let encoded = symbol.encode_utf8(&mut utf8);
            out.push(encoded.len() as u8);
            out.extend_from_slice(encoded.as_bytes());

            out.extend_from_slice(&(code.len() as u16).to_le_bytes());
            out.extend_from_slice(&pack_code(code));
        }

        out
    }

    /// Rebuild a table from [`CodeTable::serialize`] output.
    ///
    /// # Errors
    /// `TableError` on bad magic, truncation, malformed symbols, empty or
    /// duplicate codes, duplicate symbols, trailing bytes, or a code set that
    /// is not prefix-free.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut cursor = TableCursor::new(bytes);

        let magic: [u8; 2] = [cursor.read_u8()?, cursor.read_u8()?];
        if magic != MAGIC {
            return Err(TableError::InvalidMagic {
                expected: MAGIC,
                actual: magic,
            }
            .into());
        }

        let count = cursor.read_u32_le()? as usize;
        let mut table = Self::default();

        for _ in 0..count {
            let symbol_offset = cursor.offset;
            let symbol_len = cursor.read_u8()? as usize;
            let symbol_bytes = cursor.take(symbol_len)?;
            let symbol = parse_symbol(symbol_bytes)
                .ok_or(TableError::InvalidSymbol { offset: symbol_offset })?;

            let code_len = cursor.read_u16_le()? as usize;
            if code_len == 0 {
                return Err(TableError::EmptyCode { symbol }.into());
            }
            let code = unpack_code(cursor.take(code_len.div_ceil(8))?, code_len);

            if table.reverse.contains_key(&code) {
                return Err(TableError::DuplicateCode { code }.into());
            }
            if table.codes.contains_key(&symbol) {
                return Err(TableError::DuplicateSymbol { symbol }.into());
            }
            table.insert(symbol, code);
        }

        if cursor.remaining() > 0 {
            return Err(TableError::TrailingBytes {
                count: cursor.remaining(),
            }
            .into());
        }

        if let Some((prefix, code)) = first_prefix_pair(&table.sorted_codes()) {
            return Err(TableError::NotPrefixFree {
                prefix: prefix.to_string(),
                code: code.to_string(),
            }
            .into());
        }

        Ok(table)
    }
}

/// In a sorted list any prefix sits directly before some code it prefixes.
fn first_prefix_pair<'a>(sorted: &[&'a str]) -> Option<(&'a str, &'a str)> {
    sorted
        .windows(2)
        .find(|pair| pair[1].starts_with(pair[0]))
        .map(|pair| (pair[0], pair[1]))
}

fn parse_symbol(bytes: &[u8]) -> Option<char> {
    let text = std::str::from_utf8(bytes).ok()?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Some(symbol),
        _ => None,
    }
}

/// Pack a '0'/'1' string MSB-first, zero padding the last byte.
fn pack_code(code: &str) -> Vec<u8> {
    let mut bytes = vec![0u8; code.len().div_ceil(8)];
    for (i, bit) in code.bytes().enumerate() {
        if bit == b'1' {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }
    bytes
}

fn unpack_code(bytes: &[u8], bits: usize) -> String {
    (0..bits)
        .map(|i| if bytes[i / 8] & (0x80 >> (i % 8)) != 0 { '1' } else { '0' })
        .collect()
}

/// Bounds-checked reader over the serialized table.
struct TableCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> TableCursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(TableError::Truncated {
                offset: self.offset,
                required: n,
                available: self.remaining(),
            }
            .into());
        }
        let slice = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::frequency::FrequencyTable;
    use crate::tree::build_tree;

    fn table_for(text: &str) -> CodeTable {
        let root = build_tree(&FrequencyTable::from_text(text)).unwrap();
        CodeTable::from_tree(&root)
    }

    #[test]
    fn test_aaabbc_codes() {
        let table = table_for("aaabbc");
        assert_eq!(table.code('a'), Some("0"));
        assert_eq!(table.code('c'), Some("10"));
        assert_eq!(table.code('b'), Some("11"));
        assert_eq!(table.symbol("10"), Some('c'));
        assert!(table.is_prefix_free());
    }

    #[test]
    fn test_most_frequent_gets_shortest_code() {
        let table = table_for("aaabbc");
        let a = table.code('a').unwrap().len();
        assert!(a <= table.code('b').unwrap().len());
        assert!(a <= table.code('c').unwrap().len());
    }

    #[test]
    fn test_single_symbol_gets_zero() {
        let table = table_for("zzzz");
        assert_eq!(table.len(), 1);
        assert_eq!(table.code('z'), Some(SINGLE_SYMBOL_CODE));
    }

    #[test]
    fn test_maps_are_inverses() {
        let table = table_for("she sells sea shells by the sea shore");
        for (code, &symbol) in table.reverse() {
            assert_eq!(table.code(symbol), Some(code.as_str()));
        }
        assert_eq!(table.reverse().len(), table.len());
    }

    #[test]
    fn test_serialize_round_trip() {
        let table = table_for("héllo wörld ✓✓✓\n\t");
        let bytes = table.serialize();
        let parsed = CodeTable::deserialize(&bytes).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_long_codes_round_trip() {
        // Fibonacci-like counts produce a maximally skewed tree with codes > 8 bits
        let mut text = String::new();
        let (mut a, mut b) = (1usize, 1usize);
        for symbol in "abcdefghijklm".chars() {
            text.extend(std::iter::repeat(symbol).take(a));
            (a, b) = (b, a + b);
        }
        let table = table_for(&text);
        assert!(table.reverse().keys().any(|code| code.len() > 8));

        let parsed = CodeTable::deserialize(&table.serialize()).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = table_for("abc").serialize();
        bytes[0] = 0xFF;
        assert!(matches!(
            CodeTable::deserialize(&bytes),
            Err(Error::Table(TableError::InvalidMagic { .. }))
        ));
    }

    #[test]
    fn test_truncated() {
        let bytes = table_for("abc").serialize();
        assert!(matches!(
            CodeTable::deserialize(&bytes[..bytes.len() - 1]),
            Err(Error::Table(TableError::Truncated { .. }))
        ));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = table_for("abc").serialize();
        bytes.push(0);
        assert!(matches!(
            CodeTable::deserialize(&bytes),
            Err(Error::Table(TableError::TrailingBytes { count: 1 }))
        ));
    }

    #[test]
    fn test_rejects_prefix_overlap() {
        // 'a' -> "0", 'b' -> "01"
        let bytes = vec![
            0x48, 0x54, 2, 0, 0, 0, //
            1, b'a', 1, 0, 0b0000_0000, //
            1, b'b', 2, 0, 0b0100_0000,
        ];
        assert!(matches!(
            CodeTable::deserialize(&bytes),
            Err(Error::Table(TableError::NotPrefixFree { .. }))
        ));
    }

    #[test]
    fn test_rejects_multi_char_symbol() {
        let bytes = vec![0x48, 0x54, 1, 0, 0, 0, 2, b'a', b'b', 1, 0, 0];
        assert!(matches!(
            CodeTable::deserialize(&bytes),
            Err(Error::Table(TableError::InvalidSymbol { offset: 6 }))
        ));
    }

    #[test]
    fn test_rejects_empty_code() {
        let bytes = vec![0x48, 0x54, 1, 0, 0, 0, 1, b'a', 0, 0];
        assert!(matches!(
            CodeTable::deserialize(&bytes),
            Err(Error::Table(TableError::EmptyCode { symbol: 'a' }))
        ));
    }
}
