// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Construction-time failures.  Nothing in the iteration loop can
//! fail: divergent points are reseeded and off-grid points are
//! dropped, so every variant here describes a malformed genome or
//! histogram caught before any worker starts.

use failure::Fail;

/// Everything that can go wrong while assembling a genome or a
/// histogram.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum FlameError {
    /// A genome needs at least one affine transform to iterate.
    #[fail(display = "A genome requires at least one affine transform")]
    NoTransforms,

    /// The selection table is empty, so no transform can be chosen.
    #[fail(display = "The affine selection table is empty")]
    EmptySelection,

    /// The selection table names a transform that does not exist.
    #[fail(
        display = "Selection entry {} is out of range for {} transforms",
        index, transforms
    )]
    SelectionOutOfRange {
        /// The offending entry.
        index: usize,
        /// How many transforms the genome has.
        transforms: usize,
    },

    /// A transform has no color assigned.
    #[fail(display = "Transform {} has no affine color", index)]
    MissingColor {
        /// The transform lacking a color.
        index: usize,
    },

    /// A final transform has no color assigned.
    #[fail(display = "Final transform {} has no color", index)]
    MissingFinalColor {
        /// The final transform lacking a color.
        index: usize,
    },

    /// Final transforms must pair one-to-one with affine transforms.
    #[fail(
        display = "Expected {} final transforms, found {}",
        expected, found
    )]
    FinalTransformMismatch {
        /// Number of affine transforms.
        expected: usize,
        /// Number of final transforms supplied.
        found: usize,
    },

    /// Final transforms were enabled but never supplied.
    #[fail(display = "Final transforms are enabled but none were supplied")]
    MissingFinalTransforms,

    /// Variation ids run from 0 to 31.
    #[fail(display = "Unknown variation id {}", _0)]
    UnknownVariation(usize),

    /// No variation carries the given name.
    #[fail(display = "Unknown variation name '{}'", _0)]
    UnknownVariationName(String),

    /// The supersample factor must be at least one.
    #[fail(display = "The supersample factor must be at least 1")]
    ZeroSupersample,

    /// The screen has no pixels.
    #[fail(display = "The screen must be at least 1x1, got {}x{}", _0, _1)]
    EmptyGrid(usize, usize),

    /// The supersampled grid has more cells than can be addressed.
    #[fail(
        display = "A {}x{} screen at supersample {} is too large",
        width, height, supersample
    )]
    GridTooLarge {
        /// Screen width.
        width: usize,
        /// Screen height.
        height: usize,
        /// Supersample factor.
        supersample: usize,
    },

    /// Gamma must be a positive, finite number.
    #[fail(display = "Gamma must be positive and finite, got {}", _0)]
    BadGamma(f64),

    /// Camera shrink factors divide the grid size and must be usable.
    #[fail(display = "Camera shrink must be finite and non-zero, got {}", _0)]
    BadShrink(f64),

    /// A tone mode name that is not `log`, `linear` or `none`.
    #[fail(display = "Unknown tone mode '{}'", _0)]
    UnknownToneMode(String),
}
