// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{Result, SorError};
use crate::ppm::{PpmImage, Rgb};
use crate::queue::BoundedQueue;

/// The green-screen key color frames are matted against.
pub const DEFAULT_KEY: Rgb = Rgb::new(0, 255, 0);

/// Euclidean RGB distance below which a pixel counts as key-colored.
pub const DEFAULT_TOLERANCE: f64 = 150.0;

/// Euclidean distance between two colors in RGB space.
pub fn color_distance(a: Rgb, b: Rgb) -> f64 {
    let dr = a.r as f64 - b.r as f64;
    let dg = a.g as f64 - b.g as f64;
    let db = a.b as f64 - b.b as f64;
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Replace every key-colored pixel of `frame` with the pixel at the same
/// position in `background`. A pixel is key-colored when its distance to
/// `key` is strictly below `tolerance`.
///
/// # Errors
/// Returns an error if the two images have different dimensions.
pub fn chroma_key(
    frame: &mut PpmImage,
    background: &PpmImage,
    key: Rgb,
    tolerance: f64,
) -> Result<()> {
    if frame.width() != background.width() || frame.height() != background.height() {
        return Err(SorError::ImageSizeMismatch {
            frame: (frame.width(), frame.height()),
            background: (background.width(), background.height()),
        });
    }
    for row in 0..frame.height() {
        for col in 0..frame.width() {
            if color_distance(frame.pixel(row, col), key) < tolerance {
                frame.set_pixel(row, col, background.pixel(row, col));
            }
        }
    }
    Ok(())
}

/// Build a frame file name: base, three-digit zero-padded frame number
/// (wider if the number needs it), extension.
pub fn frame_file_name(base: &str, number: usize, ext: &str) -> String {
    format!("{}{:03}{}", base, number, ext)
}

/// Settings for a [`run_pipeline`] call.
pub struct PipelineConfig {
    /// Directory the numbered input frames are read from.
    pub input_dir: PathBuf,
    /// Directory the composited frames are written to.
    pub output_dir: PathBuf,
    /// Path of the shared background image.
    pub background: PathBuf,
    /// Input frame base name, e.g. `nessie` for `nessie001.ppm`.
    pub input_base: String,
    /// Output frame base name, e.g. `frame` for `frame001.ppm`.
    pub output_base: String,
    /// Number of frames, numbered `1..=frames`.
    pub frames: usize,
    /// Reader thread count.
    pub producers: usize,
    /// Compositor/writer thread count.
    pub consumers: usize,
    /// Capacity of the frame queue between the two groups.
    pub queue_capacity: usize,
    /// Key color to matte out.
    pub key: Rgb,
    /// Distance below which a pixel matches the key.
    pub tolerance: f64,
}

/// Outcome of a pipeline run.
pub struct PipelineReport {
    /// Number of frames composited and written.
    pub frames_processed: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

struct Frame {
    number: usize,
    image: PpmImage,
}

fn record_error(slot: &Mutex<Option<SorError>>, error: SorError) {
    let mut slot = slot.lock().unwrap();
    if slot.is_none() {
        *slot = Some(error);
    }
}

/// Composite a numbered frame sequence against a background.
///
/// Producer threads claim frame numbers from a shared counter, load
/// `<input_base><NNN>.ppm` from the input directory, and push the frames
/// into a bounded queue; the last producer to finish closes it. Consumer
/// threads pop frames, matte them against the background, and write
/// `<output_base><NNN>.ppm` to the output directory, keeping each output
/// number paired with its input frame regardless of queue order.
///
/// # Errors
/// Returns an error for an invalid configuration, or the first error any
/// worker hit while reading, compositing, or writing. Workers keep
/// draining after a failure so the queue never wedges; the run then
/// reports that first error.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    if config.producers == 0 {
        return Err(SorError::InvalidPipelineConfig(
            "at least one producer thread is required".to_string(),
        ));
    }
    if config.consumers == 0 {
        return Err(SorError::InvalidPipelineConfig(
            "at least one consumer thread is required".to_string(),
        ));
    }

    let background = PpmImage::load(&config.background)?;
    let queue: BoundedQueue<Frame> = BoundedQueue::new(config.queue_capacity)?;
    let next_frame = AtomicUsize::new(1);
    let producers_left = AtomicUsize::new(config.producers);
    let processed = AtomicUsize::new(0);
    let first_error: Mutex<Option<SorError>> = Mutex::new(None);
    let start = Instant::now();

    std::thread::scope(|scope| {
        for _ in 0..config.producers {
            let queue = &queue;
            let next_frame = &next_frame;
            let producers_left = &producers_left;
            let first_error = &first_error;
            scope.spawn(move || {
                loop {
                    let number = next_frame.fetch_add(1, Ordering::SeqCst);
                    if number > config.frames {
                        break;
                    }
                    let name = frame_file_name(&config.input_base, number, ".ppm");
                    let path = config.input_dir.join(name);
                    match PpmImage::load(&path) {
                        Ok(image) => {
                            if queue.push(Frame { number, image }).is_err() {
                                break;
                            }
                        }
                        Err(e) => record_error(first_error, e),
                    }
                }
                if producers_left.fetch_sub(1, Ordering::SeqCst) == 1 {
                    queue.close();
                }
            });
        }

        for _ in 0..config.consumers {
            let queue = &queue;
            let background = &background;
            let processed = &processed;
            let first_error = &first_error;
            scope.spawn(move || {
                while let Some(mut frame) = queue.pop() {
                    if let Err(e) = chroma_key(
                        &mut frame.image,
                        background,
                        config.key,
                        config.tolerance,
                    ) {
                        record_error(first_error, e);
                        continue;
                    }
                    let name = frame_file_name(&config.output_base, frame.number, ".ppm");
                    let path = config.output_dir.join(name);
                    match frame.image.save(&path) {
                        Ok(()) => {
                            processed.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(e) => record_error(first_error, e),
                    }
                }
            });
        }
    });

    if let Some(error) = first_error.lock().unwrap().take() {
        return Err(error);
    }
    Ok(PipelineReport {
        frames_processed: processed.load(Ordering::SeqCst),
        elapsed: start.elapsed(),
    })
}
