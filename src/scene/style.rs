use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Rgba8;
use crate::foundation::error::{VoyageError, VoyageResult};

/// Smallest accepted graticule spacing in degrees.
pub const MIN_GRATICULE_STEP_DEG: f64 = 0.01;

/// Fixed styling shared by every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStyle {
    /// Color the surface is cleared to (outside the plot panel).
    pub clear: Rgba8,
    /// Plot panel (sea) fill.
    pub panel: Rgba8,
    /// Landmass fill.
    pub land_fill: Rgba8,
    /// Landmass outline.
    pub land_stroke: Rgba8,
    /// Landmass outline width in pixels; `0` disables outlines.
    pub land_stroke_px: f64,
    /// Graticule line color.
    pub graticule: Rgba8,
    /// Graticule spacing in degrees; `0` disables the graticule.
    pub graticule_step_deg: f64,
    /// Route color for nations missing from `palette`.
    pub route: Rgba8,
    /// Per-nation route colors.
    pub palette: BTreeMap<String, Rgba8>,
    /// Route stroke width in pixels.
    pub route_width_px: f64,
    /// Route layer opacity in `0..=1`.
    pub route_opacity: f32,
    /// Title color.
    pub title_color: Rgba8,
    /// Title font size in pixels.
    pub title_size_px: f32,
    /// Text placed before the grouping value in frame titles.
    pub title_prefix: String,
}

impl Default for MapStyle {
    fn default() -> Self {
        let palette = [
            ("British", Rgba8::rgb(0xb2, 0x22, 0x22)),
            ("Dutch", Rgba8::rgb(0xe0, 0x7b, 0x00)),
            ("French", Rgba8::rgb(0x1f, 0x4e, 0x79)),
            ("Spanish", Rgba8::rgb(0x8e, 0x44, 0xad)),
            ("Swedish", Rgba8::rgb(0x2e, 0x8b, 0x57)),
            ("Hamburg", Rgba8::rgb(0x55, 0x55, 0x55)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            clear: Rgba8::rgb(0xf4, 0xec, 0xd8),
            panel: Rgba8::rgb(0xdc, 0xe6, 0xe4),
            land_fill: Rgba8::rgb(0xd8, 0xc8, 0xa0),
            land_stroke: Rgba8::rgb(0x8c, 0x78, 0x53),
            land_stroke_px: 0.6,
            graticule: Rgba8::rgba(0xff, 0xff, 0xff, 0xb0),
            graticule_step_deg: 10.0,
            route: Rgba8::rgb(0x7a, 0x1f, 0x1f),
            palette,
            route_width_px: 1.2,
            route_opacity: 0.7,
            title_color: Rgba8::rgb(0x3b, 0x2f, 0x1e),
            title_size_px: 28.0,
            title_prefix: String::new(),
        }
    }
}

impl MapStyle {
    /// Route color for `nation`.
    pub fn route_color(&self, nation: &str) -> Rgba8 {
        self.palette.get(nation.trim()).copied().unwrap_or(self.route)
    }

    /// Reject non-finite or negative sizes.
    pub fn validate(&self) -> VoyageResult<()> {
        if !self.route_width_px.is_finite() || self.route_width_px <= 0.0 {
            return Err(VoyageError::validation("route_width_px must be finite and > 0"));
        }
        if !self.land_stroke_px.is_finite() || self.land_stroke_px < 0.0 {
            return Err(VoyageError::validation("land_stroke_px must be finite and >= 0"));
        }
        let step = self.graticule_step_deg;
        if !step.is_finite() || step < 0.0 || (step > 0.0 && step < MIN_GRATICULE_STEP_DEG) {
            return Err(VoyageError::validation(format!(
                "graticule_step_deg must be 0 (off) or >= {MIN_GRATICULE_STEP_DEG}, got {step}"
            )));
        }
        if !self.route_opacity.is_finite() || !(0.0..=1.0).contains(&self.route_opacity) {
            return Err(VoyageError::validation("route_opacity must be within 0..=1"));
        }
        if !self.title_size_px.is_finite() || self.title_size_px <= 0.0 {
            return Err(VoyageError::validation("title_size_px must be finite and > 0"));
        }
        Ok(())
    }
}
