//! Configuration for the huffgrid application.
//!
//! Parses the command line and resolves it into a validated [`Config`]:
//! the input must exist and have a supported extension before any work
//! starts.

use std::path::PathBuf;

use clap::Parser;
use huffgrid_core::pipeline::{self, Mode};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "huffgrid",
    about = "Compress a .txt file into a .png container, or restore it",
    long_about = None
)]
pub struct Cli {
    /// File to process: .txt compresses, .png decompresses
    pub input: Option<PathBuf>,

    /// Print the resolved configuration before running
    #[arg(long)]
    pub print_config: bool,

    /// Print size and timing statistics after running
    #[arg(long)]
    pub stats: bool,
}

/// Complete configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input file path
    pub input: PathBuf,

    /// Selected by the input extension
    pub mode: Mode,

    /// Where the result will be written
    pub output: PathBuf,

    /// Whether to print detailed config
    pub print_config: bool,

    /// Whether to print the metrics summary
    pub print_stats: bool,
}

impl Config {
    /// Validate parsed arguments.
    ///
    /// # Errors
    /// - no input path (there is no interactive picker)
    /// - `FileNotFound` / `UnsupportedExtension` from the core
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let input = cli
            .input
            .ok_or_else(|| anyhow::anyhow!("no input file given (expected a .txt or .png path)"))?;
        let mode = pipeline::resolve(&input)?;

        Ok(Config {
            output: mode.output_path(&input),
            input,
            mode,
            print_config: cli.print_config,
            print_stats: cli.stats,
        })
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Input file:  {}", self.input.display());
        println!("Mode:        {:?}", self.mode);
        println!("Output file: {}", self.output.display());
        println!();
    }
}
