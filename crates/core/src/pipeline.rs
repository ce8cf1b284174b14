//! End-to-end compress and decompress pipelines.
//!
//! Compress: text → frequencies → tree → code table → bits → padded bytes
//! → container grid → PNG.
//!
//! Decompress: PNG → grid → payload + table bytes → code table → bits →
//! unpadded bits → text.
//!
//! The in-memory functions ([`compress`], [`decompress`]) do no I/O. The
//! file-level functions read the whole input, run the in-memory pipeline and
//! only then create the output file, so a failed run leaves nothing behind.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::codes::CodeTable;
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::grid::{Container, PixelGrid};
use crate::metrics::Metrics;
use crate::packer::{self, BitString};
use crate::tree::build_tree;

/// Suffix appended to the stem of a decompressed file.
const DECOMPRESSED_SUFFIX: &str = "_decompressed";

/// What to do with an input file, chosen by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `.txt` in, `.png` out
    Compress,
    /// `.png` in, `_decompressed.txt` out
    Decompress,
}

impl Mode {
    /// Pick the mode from the file extension (case-sensitive).
    ///
    /// # Errors
    /// `Error::UnsupportedExtension` for anything but `txt` or `png`.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("txt") => Ok(Mode::Compress),
            Some("png") => Ok(Mode::Decompress),
            _ => Err(Error::UnsupportedExtension {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Output path for `input`, next to it.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        match self {
            Mode::Compress => input.with_extension("png"),
            Mode::Decompress => {
                let stem = input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                input.with_file_name(format!("{stem}{DECOMPRESSED_SUFFIX}.txt"))
            }
        }
    }

    /// Status line for a finished run.
    pub fn status(&self) -> &'static str {
        match self {
            Mode::Compress => "Compressed",
            Mode::Decompress => "Decompressed",
        }
    }
}

/// Result of a successful file-level run.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub mode: Mode,
    pub output: PathBuf,
    pub metrics: Metrics,
}

/// Compress `text` into a container grid.
///
/// `text` is used as given; trailing whitespace is the caller's concern.
///
/// # Errors
/// `HuffmanError::EmptyFrequencyTable` for empty text, or a container error
/// if the streams exceed the header capacity.
pub fn compress(text: &str, metrics: &mut Metrics) -> Result<PixelGrid> {
    let freqs = FrequencyTable::from_text(text);
    metrics.text_bytes = text.len() as u64;
    metrics.symbols = freqs.total();
    metrics.distinct_symbols = freqs.len() as u64;
    debug!("analyzed {} symbols, {} distinct", freqs.total(), freqs.len());

    let root = build_tree(&freqs)?;
    let table = CodeTable::from_tree(&root);

    let bits = packer::encode(text, &table)?;
    metrics.encoded_bits = bits.len() as u64;
    metrics.pad_bits = bits.pad_count() as u64;

    let payload = bits.pad().to_bytes()?;
    let table_bytes = table.serialize();
    metrics.payload_bytes = payload.len() as u64;
    metrics.table_bytes = table_bytes.len() as u64;
    debug!(
        "encoded {} bits into {} payload bytes, table {} bytes",
        bits.len(),
        payload.len(),
        table_bytes.len()
    );

    let grid = Container::new(payload, table_bytes).pack()?;
    metrics.grid_rows = grid.rows() as u64;
    Ok(grid)
}

/// Recover the text stored in a container grid.
///
/// # Errors
/// `Error::InvalidSignature` for a foreign grid, plus any container, table,
/// padding or decode error from a corrupted one.
pub fn decompress(grid: &PixelGrid, metrics: &mut Metrics) -> Result<String> {
    metrics.grid_rows = grid.rows() as u64;

    let container = Container::unpack(grid)?;
    metrics.payload_bytes = container.payload.len() as u64;
    metrics.table_bytes = container.table.len() as u64;

    let table = CodeTable::deserialize(&container.table)?;
    metrics.distinct_symbols = table.len() as u64;

    let padded = BitString::from_bytes(&container.payload);
    let bits = padded.remove_padding()?;
    metrics.encoded_bits = bits.len() as u64;
    metrics.pad_bits = (padded.len() - bits.len()).saturating_sub(8) as u64;

    let text = packer::decode(&bits, table.reverse())?;
    metrics.text_bytes = text.len() as u64;
    metrics.symbols = text.chars().count() as u64;
    debug!("decoded {} symbols from {} bits", metrics.symbols, bits.len());

    Ok(text)
}

/// Compress a text file to `<stem>.png`.
///
/// Trailing whitespace of the file is stripped before encoding.
pub fn compress_file(input: &Path) -> Result<Outcome> {
    let mut metrics = Metrics::new();
    let raw = fs::read_to_string(input)?;
    metrics.input_bytes = raw.len() as u64;

    let grid = compress(raw.trim_end(), &mut metrics)?;

    let output = Mode::Compress.output_path(input);
    grid.save_png(&output)?;
    metrics.output_bytes = fs::metadata(&output)?.len();
    metrics.complete();

    info!(
        "compressed {} -> {} ({} rows)",
        input.display(),
        output.display(),
        grid.rows()
    );
    Ok(Outcome {
        mode: Mode::Compress,
        output,
        metrics,
    })
}

/// Decompress a container PNG to `<stem>_decompressed.txt`.
pub fn decompress_file(input: &Path) -> Result<Outcome> {
    let mut metrics = Metrics::new();
    metrics.input_bytes = fs::metadata(input)?.len();

    let grid = PixelGrid::open(input)?;
    let text = decompress(&grid, &mut metrics)?;

    let output = Mode::Decompress.output_path(input);
    fs::write(&output, &text)?;
    metrics.output_bytes = text.len() as u64;
    metrics.complete();

    info!("decompressed {} -> {}", input.display(), output.display());
    Ok(Outcome {
        mode: Mode::Decompress,
        output,
        metrics,
    })
}

/// Check that `input` exists and pick its mode.
///
/// # Errors
/// `Error::FileNotFound` before `Error::UnsupportedExtension`.
pub fn resolve(input: &Path) -> Result<Mode> {
    if !input.is_file() {
        return Err(Error::FileNotFound {
            path: input.to_path_buf(),
        });
    }
    Mode::from_path(input)
}

/// Validate `input` and run the pipeline its extension selects.
pub fn run(input: &Path) -> Result<Outcome> {
    match resolve(input)? {
        Mode::Compress => compress_file(input),
        Mode::Decompress => decompress_file(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HuffmanError;

    fn round_trip(text: &str) -> String {
        let grid = compress(text, &mut Metrics::new()).unwrap();
        decompress(&grid, &mut Metrics::new()).unwrap()
    }

    #[test]
    fn test_round_trip_aaabbc() {
        assert_eq!(round_trip("aaabbc"), "aaabbc");
    }

    #[test]
    fn test_round_trip_single_symbol() {
        assert_eq!(round_trip("zzzz"), "zzzz");
        assert_eq!(round_trip("z"), "z");
    }

    #[test]
    fn test_round_trip_unicode() {
        let text = "naïve café ✓ — 日本語\n\ttabs and  spaces";
        assert_eq!(round_trip(text), text);
    }

    #[test]
    fn test_empty_text_rejected() {
        let result = compress("", &mut Metrics::new());
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::EmptyFrequencyTable))
        ));
    }

    #[test]
    fn test_metrics_filled() {
        let mut metrics = Metrics::new();
        let grid = compress("aaabbc", &mut metrics).unwrap();
        assert_eq!(metrics.symbols, 6);
        assert_eq!(metrics.distinct_symbols, 3);
        assert_eq!(metrics.encoded_bits, 9);
        assert_eq!(metrics.pad_bits, 7);
        assert_eq!(metrics.payload_bytes, 3);
        assert_eq!(metrics.grid_rows, grid.rows() as u64);

        let mut back = Metrics::new();
        decompress(&grid, &mut back).unwrap();
        assert_eq!(back.encoded_bits, 9);
        assert_eq!(back.pad_bits, 7);
        assert_eq!(back.symbols, 6);
    }

    #[test]
    fn test_mode_from_path() {
        assert_eq!(Mode::from_path(Path::new("a/b.txt")).unwrap(), Mode::Compress);
        assert_eq!(Mode::from_path(Path::new("b.png")).unwrap(), Mode::Decompress);
        for bad in ["b.jpg", "b", "b.TXT", "txt"] {
            assert!(matches!(
                Mode::from_path(Path::new(bad)),
                Err(Error::UnsupportedExtension { .. })
            ));
        }
    }

    #[test]
    fn test_output_paths() {
        assert_eq!(
            Mode::Compress.output_path(Path::new("dir/notes.txt")),
            PathBuf::from("dir/notes.png")
        );
        assert_eq!(
            Mode::Decompress.output_path(Path::new("dir/notes.png")),
            PathBuf::from("dir/notes_decompressed.txt")
        );
    }

    #[test]
    fn test_resolve_missing_file() {
        assert!(matches!(
            resolve(Path::new("/definitely/not/here.txt")),
            Err(Error::FileNotFound { .. })
        ));
    }
}
