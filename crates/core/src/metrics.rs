//! Metrics collection and reporting for one compress or decompress run.
//!
//! Tracks sizes at every pipeline stage so the effect of the Huffman code
//! and the grid overhead can be inspected:
//! - text size and alphabet
//! - encoded bits and padding
//! - payload and table bytes
//! - grid rows and container bytes
//! - file bytes in/out and timing
//!
//! The pipeline updates a `Metrics` value explicitly at each stage.

use std::time::{Duration, Instant};

use crate::grid::ROW_BYTES;

/// Counters for a single pipeline run.
#[derive(Debug, Clone)]
pub struct Metrics {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Files ===
    /// Bytes read from the input file
    pub input_bytes: u64,

    /// Bytes written to the output file
    pub output_bytes: u64,

    // === Text ===
    /// UTF-8 size of the text being compressed (or recovered)
    pub text_bytes: u64,

    /// Number of chars in the text
    pub symbols: u64,

    /// Number of distinct chars (code table entries)
    pub distinct_symbols: u64,

    // === Packing ===
    /// Huffman-encoded bits before padding
    pub encoded_bits: u64,

    /// Zero bits appended to reach a byte boundary
    pub pad_bits: u64,

    /// Padded payload bytes, header byte included
    pub payload_bytes: u64,

    /// Serialized code table bytes
    pub table_bytes: u64,

    // === Container ===
    /// Grid rows, header row included
    pub grid_rows: u64,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            input_bytes: 0,
            output_bytes: 0,
            text_bytes: 0,
            symbols: 0,
            distinct_symbols: 0,
            encoded_bits: 0,
            pad_bits: 0,
            payload_bytes: 0,
            table_bytes: 0,
            grid_rows: 0,
        }
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    /// Raw grid size in bytes.
    pub fn container_bytes(&self) -> u64 {
        self.grid_rows * ROW_BYTES as u64
    }

    /// Container bytes relative to text bytes.
    ///
    /// Returns 0.0 if there is no text.
    pub fn compression_ratio(&self) -> f64 {
        if self.text_bytes == 0 {
            0.0
        } else {
            self.container_bytes() as f64 / self.text_bytes as f64
        }
    }

    /// Average encoded bits per symbol.
    pub fn bits_per_symbol(&self) -> f64 {
        if self.symbols == 0 {
            0.0
        } else {
            self.encoded_bits as f64 / self.symbols as f64
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!("Input file:  {} bytes", self.input_bytes);
        println!("Output file: {} bytes", self.output_bytes);
        println!();

        println!("=== Text ===");
        println!("Bytes: {}", self.text_bytes);
        println!("Symbols: {} ({} distinct)", self.symbols, self.distinct_symbols);
        println!("Bits/symbol: {:.3}", self.bits_per_symbol());
        println!();

        println!("=== Container ===");
        println!("Encoded bits: {} (+{} pad)", self.encoded_bits, self.pad_bits);
        println!("Payload: {} bytes", self.payload_bytes);
        println!("Table: {} bytes", self.table_bytes);
        println!("Grid: {} rows ({} bytes)", self.grid_rows, self.container_bytes());
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!();
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             input_bytes={}\n\
             output_bytes={}\n\
             text_bytes={}\n\
             symbols={}\n\
             distinct_symbols={}\n\
             encoded_bits={}\n\
             pad_bits={}\n\
             payload_bytes={}\n\
             table_bytes={}\n\
             grid_rows={}\n\
             compression_ratio={:.4}\n",
            self.duration().as_millis(),
            self.input_bytes,
            self.output_bytes,
            self.text_bytes,
            self.symbols,
            self.distinct_symbols,
            self.encoded_bits,
            self.pad_bits,
            self.payload_bytes,
            self.table_bytes,
            self.grid_rows,
            self.compression_ratio(),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert!(metrics.end_time.is_none());
        assert!(metrics.duration().as_millis() < 100);
    }

    #[test]
    fn test_compression_ratio() {
        let mut metrics = Metrics::new();
        metrics.text_bytes = 900;
        metrics.grid_rows = 50;

        assert_eq!(metrics.container_bytes(), 450);
        assert_eq!(metrics.compression_ratio(), 0.5);
    }

    #[test]
    fn test_ratio_without_text() {
        let metrics = Metrics::new();
        assert_eq!(metrics.compression_ratio(), 0.0);
        assert_eq!(metrics.bits_per_symbol(), 0.0);
    }

    #[test]
    fn test_bits_per_symbol() {
        let mut metrics = Metrics::new();
        metrics.symbols = 6;
        metrics.encoded_bits = 9;
        assert_eq!(metrics.bits_per_symbol(), 1.5);
    }

    #[test]
    fn test_complete_freezes_duration() {
        let mut metrics = Metrics::new();
        metrics.complete();
        let first = metrics.duration();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(metrics.duration(), first);
    }

    #[test]
    fn test_export_text() {
        let mut metrics = Metrics::new();
        metrics.input_bytes = 1000;
        metrics.payload_bytes = 420;
        metrics.grid_rows = 60;

        let text = metrics.export_text();
        assert!(text.contains("input_bytes=1000"));
        assert!(text.contains("payload_bytes=420"));
        assert!(text.contains("grid_rows=60"));
    }
}
