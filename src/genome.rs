// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The genome: everything a worker needs to know about one flame.
//!
//! A genome is assembled once, through `GenomeBuilder`, by whoever
//! decides what the flame looks like.  Each worker then takes its
//! own clone and never writes to it.  The transform selected on each
//! step is not part of the genome at all; the worker hands it to the
//! variations directly.

use std::str::FromStr;

use crate::errors::FlameError;
use crate::geometry::{Affine, Color, Point};
use crate::variations::{Variation, VARIATION_COUNT};

/// How accumulated density becomes brightness.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToneMode {
    /// Logarithmic density with gamma correction.  Cells averaging
    /// one hit or less are treated as noise and drawn black.
    Log,
    /// Brightness proportional to density.
    Linear,
    /// Color only; density is ignored.
    None,
}

impl Default for ToneMode {
    fn default() -> ToneMode {
        ToneMode::Log
    }
}

impl FromStr for ToneMode {
    type Err = FlameError;

    fn from_str(s: &str) -> Result<ToneMode, FlameError> {
        match s.trim().to_lowercase().as_str() {
            "log" => Ok(ToneMode::Log),
            "linear" => Ok(ToneMode::Linear),
            "none" => Ok(ToneMode::None),
            _ => Err(FlameError::UnknownToneMode(s.to_string())),
        }
    }
}

/// Maps world coordinates onto the histogram grid.  The shrink
/// factors are the width and height of the world-space window; the
/// offsets pan it.  A centered camera puts the world origin in the
/// middle of the grid rather than at its corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    /// Added to `x` before scaling.
    pub x_offset: f64,
    /// Added to `y` before scaling.
    pub y_offset: f64,
    /// World-space width visible on the grid.
    pub x_shrink: f64,
    /// World-space height visible on the grid.
    pub y_shrink: f64,
    /// Put the origin at the center of the grid.
    pub centered: bool,
}

impl Default for Camera {
    fn default() -> Camera {
        Camera {
            x_offset: 0.0,
            y_offset: 0.0,
            x_shrink: 4.0,
            y_shrink: 4.0,
            centered: true,
        }
    }
}

impl Camera {
    /// Map a world point onto a `width` by `height` grid.  Points
    /// that fall outside the grid map to `None`.
    #[inline]
    pub fn project(&self, p: Point, width: usize, height: usize) -> Option<(usize, usize)> {
        let (w, h) = (width as f64, height as f64);
        let mut gx = (p.x + self.x_offset) * (w / self.x_shrink);
        let mut gy = (p.y + self.y_offset) * (h / self.y_shrink);
        if self.centered {
            gx += w / 2.0;
            gy += h / 2.0;
        }
        // Written so that NaN falls outside as well.
        if !(gx >= 0.0 && gx < w && gy >= 0.0 && gy < h) {
            return None;
        }
        Some((gx as usize, gy as usize))
    }

    fn validate(&self) -> Result<(), FlameError> {
        for shrink in &[self.x_shrink, self.y_shrink] {
            if !shrink.is_finite() || *shrink == 0.0 {
                return Err(FlameError::BadShrink(*shrink));
            }
        }
        Ok(())
    }
}

/// Expand per-transform weights into a selection table of roughly
/// `granularity` entries, in which each transform index appears in
/// proportion to its weight.  Any positive weight earns at least one
/// entry; zero, negative and NaN weights earn none.
pub fn selection_table(weights: &[f64], granularity: usize) -> Vec<usize> {
    let positive = |w: &&f64| **w > 0.0;
    let total: f64 = weights.iter().filter(positive).sum();
    if total.is_nan() || total <= 0.0 {
        return vec![];
    }
    let mut table = Vec::with_capacity(granularity);
    for (index, weight) in weights.iter().enumerate() {
        if !positive(&weight) {
            continue;
        }
        let count = ((weight / total) * granularity as f64).round().max(1.0) as usize;
        table.extend(std::iter::repeat(index).take(count));
    }
    table
}

/// A complete, validated description of one flame.
#[derive(Clone, Debug)]
pub struct Genome {
    affine_transforms: Vec<Affine>,
    affine_selection: Vec<usize>,
    affine_color: Vec<Color>,
    final_transforms: Option<Vec<Affine>>,
    final_color: Vec<Color>,
    variation_weights: [f64; VARIATION_COUNT],
    variation_parameters: Vec<Vec<f64>>,
    variation_enabled: bool,
    final_transform_enabled: bool,
    camera: Camera,
    tone_mode: ToneMode,
    gamma: f64,
}

impl Genome {
    /// The affine transforms, in index order.
    pub fn transforms(&self) -> &[Affine] {
        &self.affine_transforms
    }

    /// The pre-expanded weighted selection table.  Every entry is a
    /// valid transform index.
    pub fn selection(&self) -> &[usize] {
        &self.affine_selection
    }

    /// The color of transform `index`.
    pub fn color(&self, index: usize) -> &Color {
        &self.affine_color[index]
    }

    /// The final transform paired with `index`, if any were supplied.
    pub fn final_transform(&self, index: usize) -> Option<&Affine> {
        self.final_transforms.as_ref().map(|f| &f[index])
    }

    /// The color of final transform `index`.
    pub fn final_color(&self, index: usize) -> Option<&Color> {
        self.final_color.get(index)
    }

    /// The weight of variation `id`.  Zero means inactive.
    pub fn variation_weight(&self, id: usize) -> f64 {
        self.variation_weights.get(id).cloned().unwrap_or(0.0)
    }

    /// The shape parameters of variation `id`.
    pub fn variation_parameters(&self, id: usize) -> &[f64] {
        self.variation_parameters
            .get(id)
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    /// Bind every variation with a non-zero weight to its parameters,
    /// in id order.
    pub fn active_variations(&self) -> Vec<(Variation, f64)> {
        self.variation_weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0.0)
            .filter_map(|(id, w)| {
                Variation::new(id, self.variation_parameters(id))
                    .ok()
                    .map(|v| (v, *w))
            })
            .collect()
    }

    /// Whether the variation blend runs at all.
    pub fn variation_enabled(&self) -> bool {
        self.variation_enabled
    }

    /// Whether the final transforms run.
    pub fn final_transform_enabled(&self) -> bool {
        self.final_transform_enabled
    }

    /// Turn the final transforms on or off.  Density accumulated under
    /// the other setting is no longer comparable, so callers should
    /// reset the histogram afterwards.
    pub fn set_final_transform_enabled(&mut self, enabled: bool) -> Result<(), FlameError> {
        if enabled && self.final_transforms.is_none() {
            return Err(FlameError::MissingFinalTransforms);
        }
        self.final_transform_enabled = enabled;
        Ok(())
    }

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The tone mapping mode.
    pub fn tone_mode(&self) -> ToneMode {
        self.tone_mode
    }

    /// Change tone mapping without touching the density.
    pub fn set_tone_mode(&mut self, tone_mode: ToneMode) {
        self.tone_mode = tone_mode;
    }

    /// The gamma used in log mode.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Change gamma without touching the density.
    pub fn set_gamma(&mut self, gamma: f64) -> Result<(), FlameError> {
        check_gamma(gamma)?;
        self.gamma = gamma;
        Ok(())
    }
}

fn check_gamma(gamma: f64) -> Result<(), FlameError> {
    if gamma.is_finite() && gamma > 0.0 {
        Ok(())
    } else {
        Err(FlameError::BadGamma(gamma))
    }
}

/// Assembles a `Genome`, checking it on `build`.
#[derive(Clone, Debug)]
pub struct GenomeBuilder {
    transforms: Vec<Affine>,
    colors: Vec<Color>,
    selection: Option<Vec<usize>>,
    final_transforms: Option<Vec<Affine>>,
    final_colors: Vec<Color>,
    weights: [f64; VARIATION_COUNT],
    parameters: Vec<Vec<f64>>,
    bad_variation: Option<usize>,
    variation_enabled: bool,
    final_transform_enabled: bool,
    camera: Camera,
    tone_mode: ToneMode,
    gamma: f64,
}

impl Default for GenomeBuilder {
    fn default() -> GenomeBuilder {
        GenomeBuilder::new()
    }
}

impl GenomeBuilder {
    /// An empty builder: variations on, final transforms off, default
    /// camera, log tone mapping at gamma 2.2.
    pub fn new() -> GenomeBuilder {
        GenomeBuilder {
            transforms: vec![],
            colors: vec![],
            selection: None,
            final_transforms: None,
            final_colors: vec![],
            weights: [0.0; VARIATION_COUNT],
            parameters: vec![vec![]; VARIATION_COUNT],
            bad_variation: None,
            variation_enabled: true,
            final_transform_enabled: false,
            camera: Camera::default(),
            tone_mode: ToneMode::Log,
            gamma: 2.2,
        }
    }

    /// Add a transform together with its color.
    pub fn transform(mut self, affine: Affine, color: Color) -> Self {
        self.transforms.push(affine);
        self.colors.push(color);
        self
    }

    /// Replace all transforms.  Colors are supplied separately with
    /// `colors`.
    pub fn transforms(mut self, transforms: Vec<Affine>) -> Self {
        self.transforms = transforms;
        self
    }

    /// Replace all transform colors.
    pub fn colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = colors;
        self
    }

    /// Use an explicit selection table.  Without one, every transform
    /// is equally likely.
    pub fn selection(mut self, table: Vec<usize>) -> Self {
        self.selection = Some(table);
        self
    }

    /// Build the selection table from per-transform weights.
    pub fn weights(self, weights: &[f64], granularity: usize) -> Self {
        let table = selection_table(weights, granularity);
        self.selection(table)
    }

    /// Add a final transform together with its color.  Final
    /// transforms pair with affine transforms by index.
    pub fn final_transform(mut self, affine: Affine, color: Color) -> Self {
        self.final_transforms.get_or_insert_with(Vec::new).push(affine);
        self.final_colors.push(color);
        self
    }

    /// Replace all final transforms and their colors.
    pub fn final_transforms(mut self, transforms: Vec<Affine>, colors: Vec<Color>) -> Self {
        self.final_transforms = Some(transforms);
        self.final_colors = colors;
        self
    }

    /// Set the weight of variation `id`.
    pub fn variation(mut self, id: usize, weight: f64) -> Self {
        match self.weights.get_mut(id) {
            Some(slot) => *slot = weight,
            None => self.bad_variation = Some(id),
        }
        self
    }

    /// Set the shape parameters of variation `id`.  Only the first
    /// four are kept.
    pub fn variation_parameters(mut self, id: usize, params: &[f64]) -> Self {
        match self.parameters.get_mut(id) {
            Some(slot) => *slot = params.iter().take(4).cloned().collect(),
            None => self.bad_variation = Some(id),
        }
        self
    }

    /// Run or skip the variation blend.
    pub fn variation_enabled(mut self, enabled: bool) -> Self {
        self.variation_enabled = enabled;
        self
    }

    /// Run or skip the final transforms.
    pub fn final_transform_enabled(mut self, enabled: bool) -> Self {
        self.final_transform_enabled = enabled;
        self
    }

    /// Set the camera.
    pub fn camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    /// Set the tone mapping mode.
    pub fn tone_mode(mut self, tone_mode: ToneMode) -> Self {
        self.tone_mode = tone_mode;
        self
    }

    /// Set gamma.
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Check everything and produce the genome.
    pub fn build(self) -> Result<Genome, FlameError> {
        let count = self.transforms.len();
        if count == 0 {
            return Err(FlameError::NoTransforms);
        }
        if let Some(id) = self.bad_variation {
            return Err(FlameError::UnknownVariation(id));
        }
        if self.colors.len() < count {
            return Err(FlameError::MissingColor {
                index: self.colors.len(),
            });
        }

        let selection = self.selection.unwrap_or_else(|| (0..count).collect());
        if selection.is_empty() {
            return Err(FlameError::EmptySelection);
        }
        if let Some(index) = selection.iter().find(|i| **i >= count) {
            return Err(FlameError::SelectionOutOfRange {
                index: *index,
                transforms: count,
            });
        }

        if let Some(finals) = &self.final_transforms {
            if finals.len() != count {
                return Err(FlameError::FinalTransformMismatch {
                    expected: count,
                    found: finals.len(),
                });
            }
            if self.final_colors.len() < count {
                return Err(FlameError::MissingFinalColor {
                    index: self.final_colors.len(),
                });
            }
        } else if self.final_transform_enabled {
            return Err(FlameError::MissingFinalTransforms);
        }

        self.camera.validate()?;
        check_gamma(self.gamma)?;

        let mut colors = self.colors;
        colors.truncate(count);
        let mut final_colors = self.final_colors;
        final_colors.truncate(count);

        Ok(Genome {
            affine_transforms: self.transforms,
            affine_selection: selection,
            affine_color: colors,
            final_transforms: self.final_transforms,
            final_color: final_colors,
            variation_weights: self.weights,
            variation_parameters: self.parameters,
            variation_enabled: self.variation_enabled,
            final_transform_enabled: self.final_transform_enabled,
            camera: self.camera,
            tone_mode: self.tone_mode,
            gamma: self.gamma,
        })
    }
}
