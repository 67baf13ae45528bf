// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

use laplace_sor::io;
use laplace_sor::{ProgressInfo, RelaxReport, SorSolver};

#[derive(Parser)]
#[command(
    name = "laplace-sor",
    about = "Barrier-synchronized parallel Laplace relaxation"
)]
struct Cli {
    /// Interior grid size n (the full field is (n+2) x (n+2))
    size: usize,

    /// Convergence threshold on the per-sweep maximum delta
    threshold: f64,

    /// Number of worker threads
    threads: usize,

    /// Safety limit on total sweeps before aborting
    #[arg(long)]
    max_sweeps: Option<u64>,

    /// Tolerance for the sequential/parallel field cross-check
    #[arg(long, default_value = "1e-9")]
    check_tolerance: f64,

    /// Output file path for the relaxed field (.npy)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Print the relaxed field to stdout
    #[arg(long)]
    print: bool,

    /// Print convergence progress to stderr (see --progress-interval)
    #[arg(long)]
    progress: bool,

    /// Progress reporting interval in milliseconds (used with --progress)
    #[arg(long, default_value = "500")]
    progress_interval: u64,
}

fn describe(label: &str, report: &RelaxReport) {
    println!(
        "{}: {} sweeps, max delta {:.6e}, {:.3}s",
        label,
        report.sweeps,
        report.max_delta,
        report.elapsed.as_secs_f64()
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut solver = SorSolver::new(cli.size, cli.threshold, cli.threads)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    if let Some(max_sweeps) = cli.max_sweeps {
        solver = solver.with_max_sweeps(max_sweeps);
    }
    if cli.progress {
        solver = solver
            .with_progress(Box::new(|info: ProgressInfo| {
                eprintln!(
                    "[{:.1}s] sweeps={} max_delta={:.3e}",
                    info.elapsed.as_secs_f64(),
                    info.sweeps_completed,
                    info.max_delta,
                );
            }))
            .with_progress_interval(Duration::from_millis(cli.progress_interval));
    }

    let sequential = solver
        .solve_sequential()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    describe("sequential", &sequential);

    let parallel = solver
        .solve_parallel()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    describe("parallel", &parallel);

    if parallel.elapsed.as_secs_f64() > 0.0 {
        println!(
            "speedup: {:.2}x with {} threads",
            sequential.elapsed.as_secs_f64() / parallel.elapsed.as_secs_f64(),
            cli.threads
        );
    }

    let difference = parallel
        .grid
        .max_abs_diff(&sequential.grid)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    if difference > cli.check_tolerance {
        bail!(
            "sequential and parallel fields disagree: max |difference| = {:e} exceeds {:e}",
            difference,
            cli.check_tolerance
        );
    }
    println!("fields agree: max |difference| = {:e}", difference);

    if cli.print {
        print!("{}", parallel.grid.render());
    }
    if let Some(path) = &cli.output {
        io::save_npy(&parallel.grid, path).map_err(|e| anyhow::anyhow!("{}", e))?;
        println!("wrote {}", path.display());
    }

    Ok(())
}
