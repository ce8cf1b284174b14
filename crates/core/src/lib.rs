//! huffgrid-core: Huffman text compression stored in a pixel-grid image
//!
//! This library compresses text with a per-file Huffman code and stores the
//! result, together with the serialized code table, inside a 3-pixel-wide
//! RGB image. The reverse path reads the image back and restores the text.
//!
//! # Architecture
//!
//! The system is split into leaf-first modules:
//! - `frequency`: Symbol counting
//! - `tree`: Huffman tree construction
//! - `codes`: Code table derivation and serialization
//! - `packer`: Bitstrings, padding header, byte conversion
//! - `grid`: Pixel grid container format and PNG I/O
//! - `pipeline`: Compress/decompress orchestration and file handling
//! - `metrics`: Observable per-run counters
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and returned to the caller
//! - **No printing**: The library logs through `log` but never writes to stdout
//! - **Whole-buffer**: Inputs and grids are processed fully in memory

pub mod codes;
pub mod error;
pub mod frequency;
pub mod grid;
pub mod metrics;
pub mod packer;
pub mod pipeline;
pub mod tree;

// Re-export commonly used types
pub use error::{Error, Result};
pub use pipeline::{Mode, Outcome};
