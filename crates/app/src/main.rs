//! huffgrid: compress text into a pixel-grid PNG and back.
//!
//! `huffgrid notes.txt` writes `notes.png`;
//! `huffgrid notes.png` writes `notes_decompressed.txt`.

mod config;

use std::process::ExitCode;

use clap::Parser;
use huffgrid_core::pipeline;

use crate::config::{Cli, Config};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_cli(cli)?;
    if config.print_config {
        config.print();
    }

    let outcome = match config.mode {
        pipeline::Mode::Compress => pipeline::compress_file(&config.input)?,
        pipeline::Mode::Decompress => pipeline::decompress_file(&config.input)?,
    };
    log::debug!("{} finished in {:?}", outcome.mode.status(), outcome.metrics.duration());

    println!("{}", outcome.mode.status());
    println!("{}", outcome.output.display());

    if config.print_stats {
        outcome.metrics.print_summary();
    }
    Ok(())
}
