// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use laplace_sor::chroma::{
    frame_file_name, run_pipeline, PipelineConfig, DEFAULT_KEY, DEFAULT_TOLERANCE,
};
use laplace_sor::ppm::{PpmImage, Rgb};
use laplace_sor::{SorError, SorSolver, BOUNDARY_VALUE};

/// Test 1: Parallel determinism.
/// The banded parallel solve must reproduce the sequential reference for
/// every worker count: same sweep count, same final delta, same field.
#[test]
fn parallel_field_matches_sequential_across_thread_counts() {
    let sequential = SorSolver::new(8, 1e-5, 1)
        .unwrap()
        .solve_sequential()
        .unwrap();

    for threads in [1, 2, 3, 5, 8] {
        let parallel = SorSolver::new(8, 1e-5, threads)
            .unwrap()
            .solve_parallel()
            .unwrap();

        assert_eq!(
            parallel.sweeps, sequential.sweeps,
            "{} threads took a different sweep count",
            threads
        );
        assert!(
            (parallel.max_delta - sequential.max_delta).abs() <= 1e-9,
            "{} threads: final delta {} vs sequential {}",
            threads,
            parallel.max_delta,
            sequential.max_delta
        );
        let diff = parallel.grid.max_abs_diff(&sequential.grid).unwrap();
        assert!(
            diff <= 1e-9,
            "{} threads: max |field difference| = {}",
            threads,
            diff
        );
    }
}

/// Test 2: Boundary invariance and range.
/// After a full solve the heated column still reads 1.0 in every row, the
/// other edges still read their initial zeros, and every cell is a finite
/// value in [0, 1] (each sweep averages values already in that interval).
#[test]
fn relaxed_field_keeps_boundary_and_stays_bounded() {
    let report = SorSolver::new(12, 1e-4, 4).unwrap().solve_parallel().unwrap();
    let grid = &report.grid;
    let side = grid.side();

    for row in 0..side {
        assert_eq!(grid.value(row, 0), BOUNDARY_VALUE, "row {} column 0", row);
        assert_eq!(grid.value(row, side - 1), 0.0, "row {} right edge", row);
    }
    for col in 1..side {
        assert_eq!(grid.value(0, col), 0.0, "top halo column {}", col);
        assert_eq!(grid.value(side - 1, col), 0.0, "bottom halo column {}", col);
    }

    for row in 0..side {
        for col in 0..side {
            let u = grid.value(row, col);
            assert!(
                u.is_finite() && (0.0..=1.0).contains(&u),
                "value at [{}, {}] out of range: {}",
                row,
                col,
                u
            );
        }
    }
}

/// Test 3: Small acceptance run.
/// n=4, threshold 0.01, two workers: terminates with the final delta at or
/// below the threshold, and the field matches the sequential reference.
#[test]
fn small_acceptance_run_terminates_below_threshold() {
    let solver = SorSolver::new(4, 0.01, 2).unwrap();

    let parallel = solver.solve_parallel().unwrap();
    assert!(parallel.sweeps > 0);
    assert!(
        parallel.max_delta <= 0.01,
        "final delta {} above threshold",
        parallel.max_delta
    );

    let sequential = solver.solve_sequential().unwrap();
    assert_eq!(parallel.sweeps, sequential.sweeps);
    let diff = parallel.grid.max_abs_diff(&sequential.grid).unwrap();
    assert!(diff <= 1e-9, "max |field difference| = {}", diff);
}

/// Test 4: Threshold ordering.
/// The sweep sequence is deterministic for a given n, and the solver stops
/// at the first sweep whose delta qualifies, so a tighter threshold can
/// never finish in fewer sweeps than a looser one.
#[test]
fn tighter_threshold_needs_at_least_as_many_sweeps() {
    let loose = SorSolver::new(6, 1e-2, 3).unwrap().solve_parallel().unwrap();
    let tight = SorSolver::new(6, 1e-6, 3).unwrap().solve_parallel().unwrap();

    assert!(loose.max_delta <= 1e-2);
    assert!(tight.max_delta <= 1e-6);
    assert!(
        tight.sweeps >= loose.sweeps,
        "1e-6 took {} sweeps, 1e-2 took {}",
        tight.sweeps,
        loose.sweeps
    );
}

/// Test 5: Sweep cap.
/// A cap below the sweeps needed aborts both paths with the limit in the
/// error; a generous cap leaves a converging run untouched.
#[test]
fn sweep_cap_only_binds_when_hit() {
    let capped = SorSolver::new(16, 1e-12, 4).unwrap().with_max_sweeps(3);
    assert!(matches!(
        capped.solve_parallel(),
        Err(SorError::SweepLimitExceeded { limit: 3 })
    ));
    assert!(matches!(
        capped.solve_sequential(),
        Err(SorError::SweepLimitExceeded { limit: 3 })
    ));

    let generous = SorSolver::new(4, 0.01, 2).unwrap().with_max_sweeps(10_000);
    let report = generous.solve_parallel().unwrap();
    assert!(report.sweeps < 10_000);
}

/// Test 6: Compositing pipeline end to end.
/// Five keyed frames, each tagged with a unique off-key marker pixel, run
/// through a 2-producer 2-consumer pipeline with a small queue. Every
/// output file must pair the input frame's marker with its own number,
/// with all keyed pixels replaced by the background.
#[test]
fn pipeline_composites_a_frame_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    std::fs::create_dir(&input_dir).unwrap();
    std::fs::create_dir(&output_dir).unwrap();

    let background = PpmImage::new(4, 3, Rgb::new(1, 2, 3)).unwrap();
    let background_path = dir.path().join("background.ppm");
    background.save(&background_path).unwrap();

    let frames = 5;
    for number in 1..=frames {
        let mut frame = PpmImage::new(4, 3, DEFAULT_KEY).unwrap();
        frame.set_pixel(0, 0, Rgb::new(200, number as u8, 10));
        let name = frame_file_name("scene", number, ".ppm");
        frame.save(&input_dir.join(name)).unwrap();
    }

    let config = PipelineConfig {
        input_dir,
        output_dir: output_dir.clone(),
        background: background_path,
        input_base: "scene".to_string(),
        output_base: "out".to_string(),
        frames,
        producers: 2,
        consumers: 2,
        queue_capacity: 2,
        key: DEFAULT_KEY,
        tolerance: DEFAULT_TOLERANCE,
    };
    let report = run_pipeline(&config).unwrap();
    assert_eq!(report.frames_processed, frames);

    for number in 1..=frames {
        let path = output_dir.join(frame_file_name("out", number, ".ppm"));
        let image = PpmImage::load(&path).unwrap();
        assert_eq!(
            image.pixel(0, 0),
            Rgb::new(200, number as u8, 10),
            "frame {} lost its marker",
            number
        );
        for row in 0..image.height() {
            for col in 0..image.width() {
                if row == 0 && col == 0 {
                    continue;
                }
                assert_eq!(
                    image.pixel(row, col),
                    Rgb::new(1, 2, 3),
                    "frame {} pixel [{}, {}] kept the key",
                    number,
                    row,
                    col
                );
            }
        }
    }
}
