// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use laplace_sor::chroma::{run_pipeline, PipelineConfig};
use laplace_sor::ppm::Rgb;

#[derive(Parser)]
#[command(
    name = "chromakey",
    about = "Multi-threaded green-screen frame compositor"
)]
struct Cli {
    /// Directory containing the numbered input frames
    input_dir: PathBuf,

    /// Background image (.ppm) shown through keyed pixels
    background: PathBuf,

    /// Number of frames to process (numbered 1..=frames)
    frames: usize,

    /// Directory the composited frames are written to
    #[arg(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,

    /// Input frame base name (e.g. "nessie" for nessie001.ppm)
    #[arg(long, default_value = "nessie")]
    input_base: String,

    /// Output frame base name
    #[arg(long, default_value = "frame")]
    output_base: String,

    /// Reader thread count
    #[arg(long, default_value = "3")]
    producers: usize,

    /// Compositor/writer thread count
    #[arg(long, default_value = "3")]
    consumers: usize,

    /// Capacity of the frame queue between readers and compositors
    #[arg(long, default_value = "10")]
    queue_capacity: usize,

    /// Key color as comma-separated R,G,B
    #[arg(long, default_value = "0,255,0")]
    key: String,

    /// Distance below which a pixel matches the key
    #[arg(long, default_value = "150.0")]
    tolerance: f64,
}

fn parse_key(s: &str) -> Result<Rgb> {
    let parts: Vec<u8> = s
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("invalid --key: expected comma-separated 8-bit components")?;
    if parts.len() != 3 {
        bail!("--key has {} components but expects 3", parts.len());
    }
    Ok(Rgb::new(parts[0], parts[1], parts[2]))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let key = parse_key(&cli.key)?;

    let config = PipelineConfig {
        input_dir: cli.input_dir,
        output_dir: cli.output_dir,
        background: cli.background,
        input_base: cli.input_base,
        output_base: cli.output_base,
        frames: cli.frames,
        producers: cli.producers,
        consumers: cli.consumers,
        queue_capacity: cli.queue_capacity,
        key,
        tolerance: cli.tolerance,
    };

    let report = run_pipeline(&config).map_err(|e| anyhow::anyhow!("{}", e))?;
    println!(
        "composited {} frames in {:.3}s",
        report.frames_processed,
        report.elapsed.as_secs_f64()
    );

    Ok(())
}
