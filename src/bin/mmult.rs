// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;

use laplace_sor::matmul::{Matrix, MATCH_TOLERANCE};

#[derive(Parser)]
#[command(name = "mmult", about = "Row-partitioned parallel matrix multiply")]
struct Cli {
    /// Square matrix dimension
    size: usize,

    /// Number of worker threads
    threads: usize,

    /// Lower bound of the random fill range
    #[arg(long, default_value = "-1.0", allow_hyphen_values = true)]
    min: f64,

    /// Upper bound of the random fill range
    #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
    max: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let a = Matrix::random(cli.size, cli.size, cli.min, cli.max)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let b = Matrix::random(cli.size, cli.size, cli.min, cli.max)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let start = Instant::now();
    let sequential = a
        .multiply_sequential(&b)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let sequential_elapsed = start.elapsed();

    let start = Instant::now();
    let parallel = a
        .multiply_parallel(&b, cli.threads)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let parallel_elapsed = start.elapsed();

    println!("sequential: {:.3}s", sequential_elapsed.as_secs_f64());
    println!(
        "parallel ({} threads): {:.3}s",
        cli.threads,
        parallel_elapsed.as_secs_f64()
    );
    if parallel_elapsed.as_secs_f64() > 0.0 {
        println!(
            "speedup: {:.2}x",
            sequential_elapsed.as_secs_f64() / parallel_elapsed.as_secs_f64()
        );
    }

    if cli.size < 10 {
        println!("A =");
        print!("{}", a.render());
        println!("B =");
        print!("{}", b.render());
        println!("C =");
        print!("{}", parallel.render());
    }

    if !parallel.approx_eq(&sequential, MATCH_TOLERANCE) {
        bail!(
            "parallel and sequential products disagree beyond {:.10}",
            MATCH_TOLERANCE
        );
    }
    println!("products match with tolerance of {:.10}", MATCH_TOLERANCE);

    Ok(())
}
