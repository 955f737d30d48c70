// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The small value types the chaos game moves around: a point in
//! world space, a running color, and the 2x3 affine matrix that
//! carries one into the next.  None of these own anything; they are
//! reused in place across iterations.
use std::ops::{Add, Mul};

/// A coordinate in world space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Point {
    /// Build a point.
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    /// The origin.
    pub fn zero() -> Point {
        Point { x: 0.0, y: 0.0 }
    }

    /// True if either coordinate is NaN or infinite.  This is the
    /// worker's divergence test.
    #[inline]
    pub fn is_divergent(&self) -> bool {
        !(self.x.is_finite() && self.y.is_finite())
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    #[inline]
    fn mul(self, scale: f64) -> Point {
        Point::new(self.x * scale, self.y * scale)
    }
}

/// Three color channels, conceptually in [0, 1] but never clamped.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
}

impl Color {
    /// Build a color.
    pub fn new(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// Black, the color a walk starts and restarts with.
    pub fn black() -> Color {
        Color::default()
    }

    /// Move halfway toward `other`.  Repeated blending is an
    /// exponential moving average, not a sum.
    #[inline]
    pub fn blend(&mut self, other: &Color) {
        self.r = (self.r + other.r) / 2.0;
        self.g = (self.g + other.g) / 2.0;
        self.b = (self.b + other.b) / 2.0;
    }
}

/// A linear map plus translation, laid out as two rows of three:
/// `[[a, b, c], [d, e, f]]` maps `(x, y)` to
/// `(a*x + b*y + c, d*x + e*y + f)`.
///
/// Several variations read these coefficients directly, which is why
/// the accessors below use the single-letter names the flame
/// literature uses.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Affine(pub [[f64; 3]; 2]);

impl Affine {
    /// Build from the six coefficients in row order.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Affine {
        Affine([[a, b, c], [d, e, f]])
    }

    /// The identity map.
    pub fn identity() -> Affine {
        Affine([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
    }

    /// Carry a point through the map.
    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        let m = &self.0;
        Point {
            x: m[0][0] * p.x + m[0][1] * p.y + m[0][2],
            y: m[1][0] * p.x + m[1][1] * p.y + m[1][2],
        }
    }

    /// `M[0][0]`
    #[inline]
    pub fn a(&self) -> f64 {
        self.0[0][0]
    }
    /// `M[0][1]`
    #[inline]
    pub fn b(&self) -> f64 {
        self.0[0][1]
    }
    /// `M[0][2]`, the horizontal translation.
    #[inline]
    pub fn c(&self) -> f64 {
        self.0[0][2]
    }
    /// `M[1][0]`
    #[inline]
    pub fn d(&self) -> f64 {
        self.0[1][0]
    }
    /// `M[1][1]`
    #[inline]
    pub fn e(&self) -> f64 {
        self.0[1][1]
    }
    /// `M[1][2]`, the vertical translation.
    #[inline]
    pub fn f(&self) -> f64 {
        self.0[1][2]
    }
}

impl Default for Affine {
    fn default() -> Affine {
        Affine::identity()
    }
}
