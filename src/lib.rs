#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fractal flame renderer
//!
//! A fractal flame is the attractor of an iterated function system
//! in which every function is an affine map followed by a weighted
//! blend of non-linear warps, the "variations."  We find it with the
//! chaos game: take a point, apply a randomly chosen function, and
//! repeat, plotting every position the point visits.  After a short
//! warm-up the point never leaves the attractor, so the plot fills
//! in its shape.
//!
//! Plotting here means accumulating into a density histogram.  Every
//! cell counts how often the walk passed through it and keeps a
//! running average of the colors of the functions that brought it
//! there.  Turning that into an image is a matter of tone mapping:
//! the log of the density, relative to the densest cell, sets the
//! brightness, and the averaged color sets the hue.
//!
//! Several workers walk at once, each with its own copy of the
//! genome and its own random stream, all writing into one shared
//! histogram without locks.

pub mod errors;
pub mod genome;
pub mod geometry;
pub mod histogram;
pub mod variations;
pub mod worker;

pub use errors::FlameError;
pub use genome::{selection_table, Camera, Genome, GenomeBuilder, ToneMode};
pub use geometry::{Affine, Color, Point};
pub use histogram::{Histogram, PixelBuffer};
pub use variations::{Variation, VARIATION_COUNT, VARIATION_NAMES};
pub use worker::{
    render_batch, spawn_worker, spawn_worker_seeded, Worker, WorkerHandle, WorkerPool,
    WorkerStats, WARMUP,
};
