// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::io::Write;
use std::path::Path;

use crate::error::{Result, SorError};

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Rgb {
    /// Create a color from its components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

/// An RGB raster held in memory, read from and written as plain-text PPM.
///
/// Only the plain-text `P3` variant with a maximum sample value of at most
/// 255 is handled; the binary `P6` variant is rejected. Pixels are stored
/// row-major from the top-left corner.
#[derive(Debug)]
pub struct PpmImage {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl PpmImage {
    /// Create an image filled with a single color.
    ///
    /// # Errors
    /// Returns an error if either dimension is zero.
    pub fn new(width: usize, height: usize, fill: Rgb) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SorError::PpmFormat(format!(
                "zero image dimension: {}x{}",
                width, height
            )));
        }
        Ok(PpmImage {
            width,
            height,
            pixels: vec![fill; width * height],
        })
    }

    /// Create an image from row-major pixel data.
    ///
    /// # Errors
    /// Returns an error if either dimension is zero or `pixels` does not
    /// hold exactly `width * height` entries.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Rgb>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SorError::PpmFormat(format!(
                "zero image dimension: {}x{}",
                width, height
            )));
        }
        if pixels.len() != width * height {
            return Err(SorError::PpmFormat(format!(
                "pixel count {} does not match {}x{}",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(PpmImage {
            width,
            height,
            pixels,
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.height && col < self.width);
        row * self.width + col
    }

    /// Read the pixel at `(row, col)`.
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> Rgb {
        self.pixels[self.index(row, col)]
    }

    /// Overwrite the pixel at `(row, col)`.
    #[inline]
    pub fn set_pixel(&mut self, row: usize, col: usize, color: Rgb) {
        let idx = self.index(row, col);
        self.pixels[idx] = color;
    }

    /// Parse a plain-text PPM stream.
    ///
    /// The parser is deliberately more tolerant than the header layout
    /// [`PpmImage::write_to`] emits: `#` comments may appear on any line
    /// and any amount of whitespace may separate tokens. Content after the
    /// final sample is ignored. The declared maximum sample value must be
    /// between 1 and 255; samples are kept unscaled.
    ///
    /// # Errors
    /// Returns an error for a missing or non-`P3` magic number, zero
    /// dimensions, an unsupported maximum value, a sample above the
    /// declared maximum, or truncated pixel data.
    pub fn parse(text: &str) -> Result<Self> {
        // Comments run from '#' to end of line and may interrupt the
        // token stream anywhere.
        let mut cleaned = String::with_capacity(text.len());
        for line in text.lines() {
            match line.find('#') {
                Some(pos) => cleaned.push_str(&line[..pos]),
                None => cleaned.push_str(line),
            }
            cleaned.push('\n');
        }
        let mut tokens = cleaned.split_whitespace();

        let magic = tokens
            .next()
            .ok_or_else(|| SorError::PpmFormat("missing magic number".to_string()))?;
        if magic != "P3" {
            return Err(SorError::PpmFormat(format!(
                "unsupported magic number '{}' (only plain-text P3 is handled)",
                magic
            )));
        }

        let mut next_int = |what: &str| -> Result<u32> {
            let token = tokens
                .next()
                .ok_or_else(|| SorError::PpmFormat(format!("missing {}", what)))?;
            token
                .parse::<u32>()
                .map_err(|_| SorError::PpmFormat(format!("bad {}: '{}'", what, token)))
        };

        let width = next_int("width")? as usize;
        let height = next_int("height")? as usize;
        if width == 0 || height == 0 {
            return Err(SorError::PpmFormat(format!(
                "zero image dimension: {}x{}",
                width, height
            )));
        }

        let max = next_int("maximum sample value")?;
        if max == 0 || max > 255 {
            return Err(SorError::PpmFormat(format!(
                "unsupported maximum sample value {} (must be 1..=255)",
                max
            )));
        }

        let mut pixels = Vec::with_capacity(width * height);
        for _ in 0..width * height {
            let mut sample = [0u8; 3];
            for component in &mut sample {
                let value = next_int("sample")?;
                if value > max {
                    return Err(SorError::PpmValueOutOfRange { value, max });
                }
                *component = value as u8;
            }
            pixels.push(Rgb::new(sample[0], sample[1], sample[2]));
        }

        PpmImage::from_pixels(width, height, pixels)
    }

    /// Write the image as plain-text PPM.
    ///
    /// The layout is fixed:
    /// 1. `P3` on its own line
    /// 2. a `# file <name>` comment line
    /// 3. `<width> <height>` on one line
    /// 4. the maximum sample value, always `255`
    /// 5. one text line per pixel row, each pixel as three right-aligned
    ///    3-wide decimal samples followed by two spaces
    ///
    /// # Errors
    /// Returns an error if writing to `writer` fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, name: &str) -> Result<()> {
        writeln!(writer, "P3")?;
        writeln!(writer, "# file {}", name)?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;
        for row in 0..self.height {
            for col in 0..self.width {
                let p = self.pixel(row, col);
                write!(writer, "{:3} {:3} {:3}  ", p.r, p.g, p.b)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Load an image from a plain-text PPM file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        PpmImage::parse(&text)
    }

    /// Save the image to `path`, naming it in the comment line.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image.ppm");
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write_to(&mut writer, name)?;
        writer.flush().map_err(SorError::from)
    }
}
