//! Error types for huffgrid.
//!
//! All operations return structured errors rather than panicking or printing.
//! Presentation (console text, exit codes) is the caller's job.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// The first four variants are the user-facing failure kinds of a run.
/// The remaining variants wrap failures from a specific stage:
/// - Huffman: tree construction and symbol encode/decode
/// - Pack: padding header and bit/byte conversion
/// - Table: serialized code table parsing
/// - Container: pixel grid header and shape
/// - I/O and image: file system and PNG codec
#[derive(Debug, Error)]
pub enum Error {
    /// Input is neither a `.txt` nor a `.png` file
    #[error("unsupported file extension for {}: expected .txt or .png", path.display())]
    UnsupportedExtension { path: PathBuf },

    /// Input path does not exist
    #[error("file {} does not exist", path.display())]
    FileNotFound { path: PathBuf },

    /// Header channel (0,1,1) is nonzero, so the image is not a container
    #[error("invalid signature in supplied file: header channel (0,1,1) is {found}")]
    InvalidSignature { found: u8 },

    /// Padded bitstring length is not a multiple of 8 (internal logic error)
    #[error("encoded text not padded properly: {bits} bits is not a multiple of 8")]
    MisalignedPadding { bits: usize },

    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    #[error("bit packing error: {0}")]
    Pack(#[from] PackError),

    #[error("code table error: {0}")]
    Table(#[from] TableError),

    #[error("container error: {0}")]
    Container(#[from] ContainerError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encode/decode error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Huffman codec errors.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// No symbols at all (cannot build a tree)
    #[error("empty frequency table: cannot build huffman tree")]
    EmptyFrequencyTable,

    /// Symbol in the text has no code in the table
    #[error("symbol {symbol:?} has no code in the table")]
    MissingCode { symbol: char },

    /// Bits left over after the last complete code
    #[error("{count} trailing bits do not form a complete code")]
    TrailingBits { count: usize },
}

/// Padding header errors.
#[derive(Debug, Error)]
pub enum PackError {
    /// Fewer than 8 bits, so there is no pad-count header
    #[error("missing padding header: got {available} bits")]
    MissingHeader { available: usize },

    /// Header claims more padding than there are bits
    #[error("padding header says {pad} bits but only {available} remain")]
    PaddingOverrun { pad: usize, available: usize },
}

/// Serialized code table errors.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid table magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 2], actual: [u8; 2] },

    #[error("table truncated: need {required} bytes at offset {offset}, got {available}")]
    Truncated {
        offset: usize,
        required: usize,
        available: usize,
    },

    /// Symbol bytes are not exactly one UTF-8 encoded char
    #[error("invalid symbol at offset {offset}")]
    InvalidSymbol { offset: usize },

    #[error("empty code for symbol {symbol:?}")]
    EmptyCode { symbol: char },

    #[error("duplicate code {code}")]
    DuplicateCode { code: String },

    #[error("duplicate symbol {symbol:?}")]
    DuplicateSymbol { symbol: char },

    /// One code is a prefix of another, so decoding would be ambiguous
    #[error("code {prefix} is a prefix of {code}")]
    NotPrefixFree { prefix: String, code: String },

    #[error("{count} unexpected bytes after last table entry")]
    TrailingBytes { count: usize },
}

/// Pixel grid container errors.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Length does not fit in four base-255 header digits
    #[error("length {len} exceeds header capacity {max}")]
    LengthOverflow { len: usize, max: u64 },

    /// Grid has fewer rows than its header requires
    #[error("grid truncated: header needs {required} rows, got {actual}")]
    Truncated { required: usize, actual: usize },

    /// Image is not 3 pixels wide or has no header row
    #[error("bad grid shape: {width}x{height} (expected width 3, height >= 1)")]
    BadShape { width: u32, height: u32 },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
