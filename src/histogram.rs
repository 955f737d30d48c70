// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The density histogram and its tone mapper.
//!
//! The histogram is the one structure every worker shares.  It is
//! kept at supersample resolution: `screen_width * ss` by
//! `screen_height * ss` cells of four channels each (red, green,
//! blue, hits).  The color channels hold a decaying average of the
//! colors that have passed through; the hit channel is a plain
//! counter and is what drives brightness.
//!
//! Workers write without locks.  Each channel is an `AtomicU64`
//! holding the bits of an `f64`, and `hit` does a relaxed load, the
//! arithmetic, and a relaxed store.  There is no compare-and-swap,
//! so two workers landing on the same cell at the same moment can
//! lose one of their updates, and the renderer can read a cell whose
//! channels come from different hits.  At millions of hits a second
//! neither is visible.  This is a relaxed-consistency buffer, not a
//! linearizable one.
//!
//! Rendering folds the supersampled grid down to screen resolution
//! in a scratch accumulator and then tone maps each screen pixel to
//! packed ARGB.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use image::{ImageBuffer, Rgba, RgbaImage};
use itertools::iproduct;
use num::clamp;
use tracing::{debug, trace};

use crate::errors::FlameError;
use crate::genome::{Camera, Genome, ToneMode};
use crate::geometry::{Color, Point};

const RED: usize = 0;
const GREEN: usize = 1;
const BLUE: usize = 2;
const HITS: usize = 3;

/// Opaque black, the color of every pixel nothing has landed on.
pub const BLACK: u32 = 0xFF00_0000;

type Cell = [AtomicU64; 4];

fn empty_cell() -> Cell {
    [
        AtomicU64::new(0),
        AtomicU64::new(0),
        AtomicU64::new(0),
        AtomicU64::new(0),
    ]
}

#[inline]
fn read(slot: &AtomicU64) -> f64 {
    f64::from_bits(slot.load(Ordering::Relaxed))
}

#[inline]
fn write(slot: &AtomicU64, value: f64) {
    slot.store(value.to_bits(), Ordering::Relaxed)
}

/// Pack a pixel as `0xAARRGGBB`.
#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Squeeze a channel value into a byte.  NaN becomes zero.
#[inline]
pub fn clamp_byte(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    clamp(value, 0.0, 255.0) as u8
}

/// A finished frame: packed ARGB pixels in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// All pixels, row by row.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// The pixel at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Number of pixels that are not opaque black.
    pub fn lit(&self) -> usize {
        self.pixels.iter().filter(|p| **p != BLACK).count()
    }

    /// Unpack into an RGBA image for whatever presents it.
    pub fn to_rgba_image(&self) -> RgbaImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            let p = self.pixels[(y as usize) * self.width + (x as usize)];
            Rgba([(p >> 16) as u8, (p >> 8) as u8, p as u8, (p >> 24) as u8])
        })
    }
}

/// The shared density buffer.
pub struct Histogram {
    screen_width: usize,
    screen_height: usize,
    supersample: usize,
    density: Vec<Cell>,
    accumulator: Mutex<Vec<[f64; 4]>>,
}

impl Histogram {
    /// A histogram for a `screen_width` by `screen_height` display,
    /// sampled `supersample` times more finely along each axis.
    pub fn new(
        screen_width: usize,
        screen_height: usize,
        supersample: usize,
    ) -> Result<Histogram, FlameError> {
        if supersample == 0 {
            return Err(FlameError::ZeroSupersample);
        }
        if screen_width == 0 || screen_height == 0 {
            return Err(FlameError::EmptyGrid(screen_width, screen_height));
        }
        let cells = screen_width
            .checked_mul(screen_height)
            .and_then(|n| n.checked_mul(supersample))
            .and_then(|n| n.checked_mul(supersample))
            .ok_or(FlameError::GridTooLarge {
                width: screen_width,
                height: screen_height,
                supersample,
            })?;
        Ok(Histogram {
            screen_width,
            screen_height,
            supersample,
            density: (0..cells).map(|_| empty_cell()).collect(),
            accumulator: Mutex::new(vec![[0.0; 4]; screen_width * screen_height]),
        })
    }

    /// Grid dimensions at supersample resolution.
    pub fn dimensions(&self) -> (usize, usize) {
        (
            self.screen_width * self.supersample,
            self.screen_height * self.supersample,
        )
    }

    /// Screen dimensions.
    pub fn screen_dimensions(&self) -> (usize, usize) {
        (self.screen_width, self.screen_height)
    }

    /// The supersample factor.
    pub fn supersample(&self) -> usize {
        self.supersample
    }

    /// Plot one sample.  The point is projected with `camera`;
    /// anything that lands off the grid is dropped.  The cell's color
    /// moves halfway toward `color` and its hit count goes up by one.
    #[inline]
    pub fn hit(&self, point: Point, color: &Color, camera: &Camera) {
        let (width, height) = self.dimensions();
        let (gx, gy) = match camera.project(point, width, height) {
            Some(cell) => cell,
            None => return,
        };
        let cell = &self.density[gy * width + gx];
        write(&cell[RED], (read(&cell[RED]) + color.r) / 2.0);
        write(&cell[GREEN], (read(&cell[GREEN]) + color.g) / 2.0);
        write(&cell[BLUE], (read(&cell[BLUE]) + color.b) / 2.0);
        write(&cell[HITS], read(&cell[HITS]) + 1.0);
    }

    /// Read one supersample cell as `[r, g, b, hits]`.
    pub fn cell(&self, x: usize, y: usize) -> Option<[f64; 4]> {
        let (width, height) = self.dimensions();
        if x >= width || y >= height {
            return None;
        }
        let cell = &self.density[y * width + x];
        Some([
            read(&cell[RED]),
            read(&cell[GREEN]),
            read(&cell[BLUE]),
            read(&cell[HITS]),
        ])
    }

    /// Sum of every hit channel.
    pub fn total_hits(&self) -> f64 {
        self.density.iter().map(|cell| read(&cell[HITS])).sum()
    }

    /// Zero every channel of every cell.
    pub fn reset(&self) {
        for cell in &self.density {
            for slot in cell.iter() {
                slot.store(0, Ordering::Relaxed);
            }
        }
        debug!(cells = self.density.len(), "histogram reset");
    }

    /// Fold the density down to screen resolution and tone map it,
    /// using the genome's tone mode and gamma.  The density itself is
    /// left alone, so successive frames keep refining.
    pub fn render_to_pixels(&self, genome: &Genome) -> PixelBuffer {
        let ss = self.supersample;
        let ss2 = (ss * ss) as f64;
        let (width, height) = self.dimensions();
        let mut pixels = vec![BLACK; self.screen_width * self.screen_height];

        let mut accumulator = match self.accumulator.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut max_hits = 0.0_f64;
        for (y, x) in iproduct!(0..height, 0..width) {
            let cell = &self.density[y * width + x];
            let slot = &mut accumulator[(y / ss) * self.screen_width + x / ss];
            for channel in 0..4 {
                slot[channel] += read(&cell[channel]);
            }
            if slot[HITS] > max_hits {
                max_hits = slot[HITS];
            }
        }

        let log_max = (max_hits / ss2).ln();
        let gamma = genome.gamma();
        let mode = genome.tone_mode();
        trace!(max_hits, log_max, ?mode, "tone mapping");

        for (pixel, slot) in pixels.iter_mut().zip(accumulator.iter_mut()) {
            let avg_hits = slot[HITS] / ss2;
            if mode == ToneMode::Log && avg_hits <= 1.0 {
                *pixel = BLACK;
                *slot = [0.0; 4];
                continue;
            }
            let scale = match mode {
                ToneMode::Log => (avg_hits.ln() / log_max).powf(1.0 / gamma),
                ToneMode::Linear => avg_hits / (max_hits / ss as f64),
                ToneMode::None => 1.0,
            };
            *pixel = pack_argb(
                255,
                clamp_byte(slot[RED] / ss2 * scale * 255.0),
                clamp_byte(slot[GREEN] / ss2 * scale * 255.0),
                clamp_byte(slot[BLUE] / ss2 * scale * 255.0),
            );
            *slot = [0.0; 4];
        }

        PixelBuffer {
            width: self.screen_width,
            height: self.screen_height,
            pixels,
        }
    }
}
