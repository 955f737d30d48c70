// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The variation library.
//!
//! A variation is one of the non-linear warps from the fractal flame
//! paper.  Each takes the point the selected affine transform just
//! produced and bends it somewhere else; the worker sums the results
//! of every active variation, scaled by its weight.
//!
//! The set is closed, so it lives in a single enum.  Variations that
//! take shape parameters carry them in their variant, already
//! reduced to the form the formula wants.  A handful (Waves, Popcorn,
//! Rings, Fan) are defined relative to the coefficients of whichever
//! affine transform was selected on this step, so `apply` takes that
//! transform as an argument.
//!
//! Two angles are in play.  `theta` is `atan2(x, y)` (the paper's
//! `arctan(x/y)`), and `phi` is the conventional `atan2(y, x)`.
//! Which variation uses which is part of its definition.
//!
//! Nothing in here guards against a zero radius or a zero
//! coefficient.  The resulting NaN or infinity is the worker's
//! problem: it throws the walk away and starts over.

use std::f64::consts::PI;

use rand::Rng;

use crate::errors::FlameError;
use crate::geometry::{Affine, Point};

/// How many variation kinds exist.  Ids run from 0 to one less than
/// this.
pub const VARIATION_COUNT: usize = 32;

/// Published names, indexed by variation id.
pub const VARIATION_NAMES: [&str; VARIATION_COUNT] = [
    "linear",
    "sinusoidal",
    "spherical",
    "swirl",
    "horseshoe",
    "polar",
    "handkerchief",
    "heart",
    "disc",
    "spiral",
    "hyperbolic",
    "diamond",
    "ex",
    "julia",
    "bent",
    "waves",
    "fisheye",
    "popcorn",
    "exponential",
    "power",
    "cosine",
    "rings",
    "fan",
    "blob",
    "pdj",
    "fan2",
    "rings2",
    "eyefish",
    "bubble",
    "cylinder",
    "perspective",
    "noise",
];

/// One variation, bound to its parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Variation {
    /// 0: the point unchanged.
    Linear,
    /// 1
    Sinusoidal,
    /// 2
    Spherical,
    /// 3
    Swirl,
    /// 4
    Horseshoe,
    /// 5
    Polar,
    /// 6
    Handkerchief,
    /// 7
    Heart,
    /// 8
    Disc,
    /// 9
    Spiral,
    /// 10
    Hyperbolic,
    /// 11
    Diamond,
    /// 12
    Ex,
    /// 13: a square root with a random branch.
    Julia,
    /// 14
    Bent,
    /// 15: reads `b`, `c`, `e` and `f` of the current transform.
    Waves,
    /// 16
    Fisheye,
    /// 17: reads `c` and `f` of the current transform.
    Popcorn,
    /// 18
    Exponential,
    /// 19
    Power,
    /// 20
    Cosine,
    /// 21: reads `c` of the current transform.
    Rings,
    /// 22: reads `c` and `f` of the current transform.
    Fan,
    /// 23: parameters are `[high, low, waves]`.
    Blob {
        /// Outer radius multiplier.
        high: f64,
        /// Inner radius multiplier.
        low: f64,
        /// Number of lobes.
        waves: f64,
    },
    /// 24: parameters are `[a, b, c, d]`.
    Pdj {
        /// Multiplies `y` under the first sine.
        a: f64,
        /// Multiplies `x` under the first cosine.
        b: f64,
        /// Multiplies `x` under the second sine.
        c: f64,
        /// Multiplies `y` under the second cosine.
        d: f64,
    },
    /// 25: parameters are `[x, y]`, stored as `pi * x^2` and `y`.
    Fan2 {
        /// Width of one blade, `pi * x^2`.
        blade: f64,
        /// Angular offset, `y`.
        offset: f64,
    },
    /// 26: parameter is `[val]`, stored squared.
    Rings2 {
        /// Ring spacing, `val^2`.
        spacing: f64,
    },
    /// 27
    Eyefish,
    /// 28
    Bubble,
    /// 29
    Cylinder,
    /// 30: parameters are `[angle, dist]`.
    Perspective {
        /// Viewer distance.
        dist: f64,
        /// `sin(angle)`
        sin_angle: f64,
        /// `cos(angle)`
        cos_angle: f64,
    },
    /// 31: a random scatter.
    Noise,
}

fn param(params: &[f64], i: usize) -> f64 {
    params.get(i).cloned().unwrap_or(0.0)
}

impl Variation {
    /// Bind variation `id` to its parameters.  Variations without
    /// parameters ignore `params`; missing parameters read as zero.
    pub fn new(id: usize, params: &[f64]) -> Result<Variation, FlameError> {
        use self::Variation::*;
        let v = match id {
            0 => Linear,
            1 => Sinusoidal,
            2 => Spherical,
            3 => Swirl,
            4 => Horseshoe,
            5 => Polar,
            6 => Handkerchief,
            7 => Heart,
            8 => Disc,
            9 => Spiral,
            10 => Hyperbolic,
            11 => Diamond,
            12 => Ex,
            13 => Julia,
            14 => Bent,
            15 => Waves,
            16 => Fisheye,
            17 => Popcorn,
            18 => Exponential,
            19 => Power,
            20 => Cosine,
            21 => Rings,
            22 => Fan,
            23 => Blob {
                high: param(params, 0),
                low: param(params, 1),
                waves: param(params, 2),
            },
            24 => Pdj {
                a: param(params, 0),
                b: param(params, 1),
                c: param(params, 2),
                d: param(params, 3),
            },
            25 => {
                let x = param(params, 0);
                Fan2 {
                    blade: PI * x * x,
                    offset: param(params, 1),
                }
            }
            26 => {
                let val = param(params, 0);
                Rings2 { spacing: val * val }
            }
            27 => Eyefish,
            28 => Bubble,
            29 => Cylinder,
            30 => {
                let angle = param(params, 0);
                Perspective {
                    dist: param(params, 1),
                    sin_angle: angle.sin(),
                    cos_angle: angle.cos(),
                }
            }
            31 => Noise,
            _ => return Err(FlameError::UnknownVariation(id)),
        };
        Ok(v)
    }

    /// Look a variation up by its published name.
    pub fn from_name(name: &str, params: &[f64]) -> Result<Variation, FlameError> {
        let lowered = name.trim().to_lowercase();
        match VARIATION_NAMES.iter().position(|n| *n == lowered) {
            Some(id) => Variation::new(id, params),
            None => Err(FlameError::UnknownVariationName(name.to_string())),
        }
    }

    /// The id this variation was built from.
    pub fn id(&self) -> usize {
        use self::Variation::*;
        match *self {
            Linear => 0,
            Sinusoidal => 1,
            Spherical => 2,
            Swirl => 3,
            Horseshoe => 4,
            Polar => 5,
            Handkerchief => 6,
            Heart => 7,
            Disc => 8,
            Spiral => 9,
            Hyperbolic => 10,
            Diamond => 11,
            Ex => 12,
            Julia => 13,
            Bent => 14,
            Waves => 15,
            Fisheye => 16,
            Popcorn => 17,
            Exponential => 18,
            Power => 19,
            Cosine => 20,
            Rings => 21,
            Fan => 22,
            Blob { .. } => 23,
            Pdj { .. } => 24,
            Fan2 { .. } => 25,
            Rings2 { .. } => 26,
            Eyefish => 27,
            Bubble => 28,
            Cylinder => 29,
            Perspective { .. } => 30,
            Noise => 31,
        }
    }

    /// The published name.
    pub fn name(&self) -> &'static str {
        VARIATION_NAMES[self.id()]
    }

    /// True for the variations that draw from the random stream.
    pub fn is_random(&self) -> bool {
        match *self {
            Variation::Julia | Variation::Noise => true,
            _ => false,
        }
    }

    /// Warp `p`.  `m` is the affine transform selected on this step;
    /// `rng` must be the calling worker's own stream.
    pub fn apply<R: Rng + ?Sized>(&self, p: Point, m: &Affine, rng: &mut R) -> Point {
        use self::Variation::*;
        let Point { x, y } = p;
        match *self {
            Linear => p,

            Sinusoidal => Point::new(x.sin(), y.sin()),

            Spherical => {
                let r2 = x * x + y * y;
                Point::new(x / r2, y / r2)
            }

            Swirl => {
                let r2 = x * x + y * y;
                let (s, c) = r2.sin_cos();
                Point::new(x * s - y * c, x * c + y * s)
            }

            Horseshoe => {
                let r = radius(p);
                Point::new((x - y) * (x + y) / r, 2.0 * x * y / r)
            }

            Polar => Point::new(theta(p) / PI, radius(p) - 1.0),

            Handkerchief => {
                let (r, t) = (radius(p), theta(p));
                Point::new(r * (t + r).sin(), r * (t - r).cos())
            }

            Heart => {
                let (r, t) = (radius(p), theta(p));
                Point::new(r * (t * r).sin(), -r * (t * r).cos())
            }

            Disc => {
                let (r, t) = (radius(p), theta(p));
                let k = t / PI;
                Point::new(k * (PI * r).sin(), k * (PI * r).cos())
            }

            Spiral => {
                let (r, t) = (radius(p), theta(p));
                Point::new((t.cos() + r.sin()) / r, (t.sin() - r.cos()) / r)
            }

            Hyperbolic => {
                let (r, t) = (radius(p), theta(p));
                Point::new(t.sin() / r, r * t.cos())
            }

            Diamond => {
                let (r, t) = (radius(p), theta(p));
                Point::new(t.sin() * r.cos(), t.cos() * r.sin())
            }

            Ex => {
                let (r, t) = (radius(p), theta(p));
                let p0 = (t + r).sin().powi(3);
                let p1 = (t - r).cos().powi(3);
                Point::new(r * (p0 + p1), r * (p0 - p1))
            }

            Julia => {
                let sr = radius(p).sqrt();
                let a = phi(p) / 2.0 + omega(rng);
                Point::new(sr * a.cos(), sr * a.sin())
            }

            Bent => match (x >= 0.0, y >= 0.0) {
                (true, true) => p,
                (false, true) => Point::new(2.0 * x, y),
                (true, false) => Point::new(x, y / 2.0),
                (false, false) => Point::new(2.0 * x, y / 2.0),
            },

            Waves => {
                let (c2, f2) = (m.c() * m.c(), m.f() * m.f());
                Point::new(x + m.b() * (y / c2).sin(), y + m.e() * (x / f2).sin())
            }

            Fisheye => {
                let k = 2.0 / (radius(p) + 1.0);
                Point::new(k * y, k * x)
            }

            Popcorn => Point::new(
                x + m.c() * (3.0 * y).tan().sin(),
                y + m.f() * (3.0 * x).tan().sin(),
            ),

            Exponential => {
                let k = (x - 1.0).exp();
                Point::new(k * (PI * y).cos(), k * (PI * y).sin())
            }

            Power => {
                let (r, t) = (radius(p), theta(p));
                let (s, c) = t.sin_cos();
                let k = r.powf(s);
                Point::new(k * c, k * s)
            }

            Cosine => Point::new((PI * x).cos() * y.cosh(), -(PI * x).sin() * y.sinh()),

            Rings => {
                let (r, t) = (radius(p), theta(p));
                let c2 = m.c() * m.c();
                let k = (r + c2) % (2.0 * c2) - c2 + r * (1.0 - c2);
                Point::new(k * t.cos(), k * t.sin())
            }

            Fan => {
                let (r, t) = (radius(p), theta(p));
                let blade = PI * m.c() * m.c();
                let half = blade / 2.0;
                let a = if (t + m.f()) % blade > half {
                    t - half
                } else {
                    t + half
                };
                Point::new(r * a.cos(), r * a.sin())
            }

            Blob { high, low, waves } => {
                let (r, t) = (radius(p), theta(p));
                let k = r * (low + (high - low) / 2.0 * ((waves * t).sin() + 1.0));
                Point::new(k * t.cos(), k * t.sin())
            }

            Pdj { a, b, c, d } => Point::new(
                (a * y).sin() - (b * x).cos(),
                (c * x).sin() - (d * y).cos(),
            ),

            Fan2 { blade, offset } => {
                let (r, t) = (radius(p), theta(p));
                let half = blade / 2.0;
                let turn = t + offset - blade * (2.0 * t * offset / blade).trunc();
                let a = if turn > half { t - half } else { t + half };
                Point::new(r * a.sin(), r * a.cos())
            }

            Rings2 { spacing } => {
                let (r, t) = (radius(p), theta(p));
                let k = r - 2.0 * spacing * ((r + spacing) / (2.0 * spacing)).trunc()
                    + r * (1.0 - spacing);
                Point::new(k * t.sin(), k * t.cos())
            }

            Eyefish => {
                let k = 2.0 / (radius(p) + 1.0);
                Point::new(k * x, k * y)
            }

            Bubble => {
                let k = 4.0 / (x * x + y * y + 4.0);
                Point::new(k * x, k * y)
            }

            Cylinder => Point::new(x.sin(), y),

            Perspective {
                dist,
                sin_angle,
                cos_angle,
            } => {
                let k = dist / (dist - y * sin_angle);
                Point::new(k * x, k * y * cos_angle)
            }

            Noise => {
                let psi1: f64 = rng.gen();
                let psi2: f64 = rng.gen();
                let a = 2.0 * PI * psi2;
                Point::new(psi1 * x * a.cos(), psi1 * y * a.sin())
            }
        }
    }
}

#[inline]
fn radius(p: Point) -> f64 {
    (p.x * p.x + p.y * p.y).sqrt()
}

/// `atan2(x, y)`: note the argument order.
#[inline]
fn theta(p: Point) -> f64 {
    p.x.atan2(p.y)
}

/// `atan2(y, x)`
#[inline]
fn phi(p: Point) -> f64 {
    p.y.atan2(p.x)
}

/// Either 0 or pi, even odds.
#[inline]
fn omega<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen::<bool>() {
        0.0
    } else {
        PI
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f64 = 1e-12;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
    }

    fn warp(v: Variation, p: Point) -> Point {
        let mut rng = StdRng::seed_from_u64(0);
        v.apply(p, &Affine::identity(), &mut rng)
    }

    #[test]
    fn ids_and_names_agree() {
        for id in 0..VARIATION_COUNT {
            let v = Variation::new(id, &[]).unwrap();
            assert_eq!(v.id(), id);
            assert_eq!(Variation::from_name(v.name(), &[]).unwrap().id(), id);
        }
    }

    #[test]
    fn unknown_variations_are_rejected() {
        assert_eq!(
            Variation::new(VARIATION_COUNT, &[]),
            Err(FlameError::UnknownVariation(VARIATION_COUNT))
        );
        assert!(Variation::from_name("sparkle", &[]).is_err());
        assert_eq!(Variation::from_name(" Julia ", &[]).unwrap(), Variation::Julia);
    }

    #[test]
    fn parameters_are_reduced_at_construction() {
        match Variation::new(25, &[2.0, 0.5]).unwrap() {
            Variation::Fan2 { blade, offset } => {
                assert!((blade - 4.0 * PI).abs() < EPS);
                assert_eq!(offset, 0.5);
            }
            other => panic!("expected fan2, got {:?}", other),
        }
        assert_eq!(
            Variation::new(26, &[3.0]).unwrap(),
            Variation::Rings2 { spacing: 9.0 }
        );
    }

    #[test]
    fn linear_is_identity() {
        let p = Point::new(0.3, -0.7);
        assert_eq!(warp(Variation::Linear, p), p);
    }

    #[test]
    fn spherical_inverts_through_unit_circle() {
        let out = warp(Variation::Spherical, Point::new(2.0, 0.0));
        assert!(close(out, Point::new(0.5, 0.0)));
    }

    #[test]
    fn spherical_at_origin_is_not_guarded() {
        assert!(warp(Variation::Spherical, Point::zero()).is_divergent());
    }

    #[test]
    fn polar_uses_x_over_y_angle() {
        // theta = atan2(1, 0) = pi/2
        let out = warp(Variation::Polar, Point::new(1.0, 0.0));
        assert!(close(out, Point::new(0.5, 0.0)));
    }

    #[test]
    fn horseshoe_matches_formula() {
        let out = warp(Variation::Horseshoe, Point::new(3.0, 4.0));
        assert!(close(out, Point::new(-7.0 / 5.0, 24.0 / 5.0)));
    }

    #[test]
    fn fisheye_swaps_and_eyefish_does_not() {
        let p = Point::new(3.0, 4.0);
        assert!(close(warp(Variation::Fisheye, p), Point::new(4.0 / 3.0, 1.0)));
        assert!(close(warp(Variation::Eyefish, p), Point::new(1.0, 4.0 / 3.0)));
    }

    #[test]
    fn bent_scales_by_quadrant() {
        assert_eq!(warp(Variation::Bent, Point::new(1.0, 1.0)), Point::new(1.0, 1.0));
        assert_eq!(warp(Variation::Bent, Point::new(-1.0, 1.0)), Point::new(-2.0, 1.0));
        assert_eq!(warp(Variation::Bent, Point::new(1.0, -1.0)), Point::new(1.0, -0.5));
        assert_eq!(warp(Variation::Bent, Point::new(-1.0, -1.0)), Point::new(-2.0, -0.5));
    }

    #[test]
    fn bubble_and_cylinder() {
        assert!(close(warp(Variation::Bubble, Point::new(2.0, 0.0)), Point::new(1.0, 0.0)));
        assert!(close(
            warp(Variation::Cylinder, Point::new(PI / 2.0, 3.0)),
            Point::new(1.0, 3.0)
        ));
    }

    #[test]
    fn exponential_at_one_zero() {
        assert!(close(warp(Variation::Exponential, Point::new(1.0, 0.0)), Point::new(1.0, 0.0)));
    }

    #[test]
    fn waves_reads_the_current_transform() {
        let m = Affine::new(1.0, 0.5, 1.0, 0.0, 0.25, 2.0);
        let mut rng = StdRng::seed_from_u64(0);
        let p = Point::new(1.0, 2.0);
        let out = Variation::Waves.apply(p, &m, &mut rng);
        let expected = Point::new(1.0 + 0.5 * (2.0f64).sin(), 2.0 + 0.25 * (0.25f64).sin());
        assert!(close(out, expected));
    }

    #[test]
    fn popcorn_without_translation_is_identity() {
        let m = Affine::new(0.5, 0.1, 0.0, -0.2, 0.9, 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let p = Point::new(0.2, -0.4);
        assert_eq!(Variation::Popcorn.apply(p, &m, &mut rng), p);
    }

    #[test]
    fn rings_with_zero_coefficient_diverges() {
        let m = Affine::identity();
        let mut rng = StdRng::seed_from_u64(0);
        let out = Variation::Rings.apply(Point::new(0.5, 0.5), &m, &mut rng);
        assert!(out.is_divergent());
    }

    #[test]
    fn pdj_matches_formula() {
        let v = Variation::new(24, &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let out = warp(v, Point::new(0.5, 0.25));
        let expected = Point::new(
            (0.25f64).sin() - (1.0f64).cos(),
            (1.5f64).sin() - (1.0f64).cos(),
        );
        assert!(close(out, expected));
    }

    #[test]
    fn perspective_without_angle_is_identity() {
        let v = Variation::new(30, &[0.0, 2.0]).unwrap();
        let p = Point::new(0.3, 0.6);
        assert!(close(warp(v, p), p));
    }

    #[test]
    fn julia_lands_on_one_of_two_branches() {
        let mut rng = StdRng::seed_from_u64(99);
        let p = Point::new(0.0, 4.0);
        // sqrt(r) = 2, phi/2 = pi/4
        let h = 2.0f64.sqrt();
        let mut seen = (false, false);
        for _ in 0..64 {
            let out = Variation::Julia.apply(p, &Affine::identity(), &mut rng);
            if close(out, Point::new(h, h)) {
                seen.0 = true;
            } else if close(out, Point::new(-h, -h)) {
                seen.1 = true;
            } else {
                panic!("julia left both branches: {:?}", out);
            }
        }
        assert!(seen.0 && seen.1);
    }

    #[test]
    fn noise_never_grows_a_coordinate() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = Point::new(0.8, -0.6);
        for _ in 0..100 {
            let out = Variation::Noise.apply(p, &Affine::identity(), &mut rng);
            assert!(out.x.abs() <= p.x.abs());
            assert!(out.y.abs() <= p.y.abs());
        }
    }

    // A point off both axes, where atan2(x, y) and atan2(y, x) differ.
    const X: f64 = 0.3;
    const Y: f64 = -0.7;

    fn sample() -> Point {
        Point::new(X, Y)
    }

    /// Radius and `atan2(x, y)` of the sample point.
    fn sample_polar() -> (f64, f64) {
        ((X * X + Y * Y).sqrt(), X.atan2(Y))
    }

    fn warp_with(v: Variation, p: Point, m: &Affine) -> Point {
        let mut rng = StdRng::seed_from_u64(0);
        v.apply(p, m, &mut rng)
    }

    #[test]
    fn angle_convention_is_x_over_y() {
        // theta = atan2(0, 2) = 0, where phi would be pi/2.
        let p = Point::new(0.0, 2.0);
        assert!(close(warp(Variation::Hyperbolic, p), Point::new(0.0, 2.0)));
        assert!(close(warp(Variation::Power, p), Point::new(1.0, 0.0)));
        // theta = atan2(1, 0) = pi/2, where phi would be 0.
        let out = warp(Variation::Disc, Point::new(1.0, 0.0));
        assert!(close(out, Point::new(0.5 * PI.sin(), -0.5)));
    }

    #[test]
    fn sinusoidal_matches_formula() {
        let out = warp(Variation::Sinusoidal, sample());
        assert!(close(out, Point::new(X.sin(), Y.sin())));
    }

    #[test]
    fn swirl_matches_formula() {
        let r2 = X * X + Y * Y;
        let expected = Point::new(
            X * r2.sin() - Y * r2.cos(),
            X * r2.cos() + Y * r2.sin(),
        );
        assert!(close(warp(Variation::Swirl, sample()), expected));
    }

    #[test]
    fn handkerchief_matches_formula() {
        let (r, t) = sample_polar();
        let expected = Point::new(r * (t + r).sin(), r * (t - r).cos());
        assert!(close(warp(Variation::Handkerchief, sample()), expected));
    }

    #[test]
    fn heart_matches_formula() {
        let (r, t) = sample_polar();
        let expected = Point::new(r * (t * r).sin(), -r * (t * r).cos());
        assert!(close(warp(Variation::Heart, sample()), expected));
    }

    #[test]
    fn disc_matches_formula() {
        let (r, t) = sample_polar();
        let expected = Point::new(t / PI * (PI * r).sin(), t / PI * (PI * r).cos());
        assert!(close(warp(Variation::Disc, sample()), expected));
    }

    #[test]
    fn spiral_matches_formula() {
        let (r, t) = sample_polar();
        let expected = Point::new((t.cos() + r.sin()) / r, (t.sin() - r.cos()) / r);
        assert!(close(warp(Variation::Spiral, sample()), expected));
    }

    #[test]
    fn hyperbolic_matches_formula() {
        let (r, t) = sample_polar();
        let expected = Point::new(t.sin() / r, r * t.cos());
        assert!(close(warp(Variation::Hyperbolic, sample()), expected));
    }

    #[test]
    fn diamond_matches_formula() {
        let (r, t) = sample_polar();
        let expected = Point::new(t.sin() * r.cos(), t.cos() * r.sin());
        assert!(close(warp(Variation::Diamond, sample()), expected));
    }

    #[test]
    fn ex_matches_formula() {
        let (r, t) = sample_polar();
        let p0 = (t + r).sin();
        let p1 = (t - r).cos();
        let (p0, p1) = (p0 * p0 * p0, p1 * p1 * p1);
        let expected = Point::new(r * (p0 + p1), r * (p0 - p1));
        assert!(close(warp(Variation::Ex, sample()), expected));
    }

    #[test]
    fn power_matches_formula() {
        let (r, t) = sample_polar();
        let k = r.powf(t.sin());
        let expected = Point::new(k * t.cos(), k * t.sin());
        assert!(close(warp(Variation::Power, sample()), expected));
    }

    #[test]
    fn cosine_matches_formula() {
        let expected = Point::new((PI * X).cos() * Y.cosh(), -(PI * X).sin() * Y.sinh());
        assert!(close(warp(Variation::Cosine, sample()), expected));
    }

    #[test]
    fn rings_reads_the_current_transform() {
        let m = Affine::new(0.8, 0.1, 0.4, -0.3, 0.9, 0.6);
        let (r, t) = sample_polar();
        let c2 = 0.4 * 0.4;
        let k = (r + c2) % (2.0 * c2) - c2 + r * (1.0 - c2);
        let expected = Point::new(k * t.cos(), k * t.sin());
        assert!(close(warp_with(Variation::Rings, sample(), &m), expected));
    }

    #[test]
    fn fan_takes_both_blades() {
        let (r, t) = sample_polar();
        let half = PI * 0.4 * 0.4 / 2.0;
        // (theta + 0.6) mod blade lands past half a blade.
        let m = Affine::new(0.8, 0.1, 0.4, -0.3, 0.9, 0.6);
        let expected = Point::new(r * (t - half).cos(), r * (t - half).sin());
        assert!(close(warp_with(Variation::Fan, sample(), &m), expected));
        // With no vertical translation it stays short of half.
        let m = Affine::new(0.8, 0.1, 0.4, -0.3, 0.9, 0.0);
        let expected = Point::new(r * (t + half).cos(), r * (t + half).sin());
        assert!(close(warp_with(Variation::Fan, sample(), &m), expected));
    }

    #[test]
    fn blob_matches_formula() {
        let v = Variation::new(23, &[1.5, 0.5, 3.0]).unwrap();
        let (r, t) = sample_polar();
        let k = r * (0.5 + (1.5 - 0.5) / 2.0 * ((3.0 * t).sin() + 1.0));
        let expected = Point::new(k * t.cos(), k * t.sin());
        assert!(close(warp(v, sample()), expected));
    }

    #[test]
    fn fan2_takes_both_blades() {
        let (r, t) = sample_polar();
        // x = 0.5, y = 0.3: the turn lands past half a blade.
        let v = Variation::new(25, &[0.5, 0.3]).unwrap();
        let half = PI * 0.25 / 2.0;
        let expected = Point::new(r * (t - half).sin(), r * (t - half).cos());
        assert!(close(warp(v, sample()), expected));
        // x = 1, y = 1: it stays short of half.
        let v = Variation::new(25, &[1.0, 1.0]).unwrap();
        let half = PI / 2.0;
        let expected = Point::new(r * (t + half).sin(), r * (t + half).cos());
        assert!(close(warp(v, sample()), expected));
    }

    #[test]
    fn rings2_matches_formula() {
        let v = Variation::new(26, &[0.6]).unwrap();
        let (r, t) = sample_polar();
        let p = 0.6 * 0.6;
        let k = r - 2.0 * p * ((r + p) / (2.0 * p)).trunc() + r * (1.0 - p);
        let expected = Point::new(k * t.sin(), k * t.cos());
        assert!(close(warp(v, sample()), expected));
    }

    proptest! {
        #[test]
        fn deterministic_variations_are_pure(
            id in 0..VARIATION_COUNT,
            x in -3.0..3.0f64,
            y in -3.0..3.0f64,
        ) {
            let v = Variation::new(id, &[1.5, 0.5, 3.0, 0.7]).unwrap();
            prop_assume!(!v.is_random());
            let m = Affine::new(0.9, 0.2, 0.4, -0.1, 0.8, 0.6);
            let mut first = StdRng::seed_from_u64(1);
            let mut second = StdRng::seed_from_u64(2);
            let a = v.apply(Point::new(x, y), &m, &mut first);
            let b = v.apply(Point::new(x, y), &m, &mut second);
            prop_assert_eq!(a.x.to_bits(), b.x.to_bits());
            prop_assert_eq!(a.y.to_bits(), b.y.to_bits());
        }
    }
}
