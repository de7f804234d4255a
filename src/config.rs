use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::animate::generator::FailurePolicy;
use crate::foundation::core::{Canvas, Fps, GeoBounds};
use crate::foundation::error::{VoyageError, VoyageResult};
use crate::geo::boundary::BoundaryLayer;
use crate::scene::style::MapStyle;
use crate::tracks::table::{GroupBy, KeyOrder, TrackTable};

/// One raster annotation placed by geographic box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlaySpec {
    /// Image file; relative paths resolve against the config file's directory.
    pub path: PathBuf,
    /// Placement in lon/lat degrees.
    pub bounds: GeoBounds,
    /// Opacity in `0..=1`.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_opacity() -> f32 {
    1.0
}

/// JSON-facing map configuration. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// Output size.
    pub canvas: Canvas,
    /// Playback rate of exported animations.
    pub fps: Fps,
    /// Geographic extent; derived from the data when absent.
    pub viewport: Option<GeoBounds>,
    /// Empty border around the plot in pixels.
    pub margin_px: f64,
    /// Colors, widths and title formatting.
    pub style: MapStyle,
    /// Raster annotations, drawn in list order above the routes.
    pub overlays: Vec<OverlaySpec>,
    /// Attribute partitioning the table into frames.
    pub group_by: GroupBy,
    /// Order of frames.
    pub order: KeyOrder,
    /// Per-frame failure handling.
    pub failure_policy: FailurePolicy,
    /// Explicit grouping values to render instead of the distinct values of the table.
    pub keys: Option<Vec<String>>,
    /// Title of the exported HTML page.
    pub page_title: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            fps: Fps::default(),
            viewport: None,
            margin_px: 24.0,
            style: MapStyle::default(),
            overlays: Vec::new(),
            group_by: GroupBy::default(),
            order: KeyOrder::default(),
            failure_policy: FailurePolicy::default(),
            keys: None,
            page_title: "Shipping routes".to_string(),
        }
    }
}

impl MapConfig {
    /// Parse a config from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> VoyageResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| VoyageError::validation(format!("parse map config JSON: {e}")))
    }

    /// Parse a config file; relative overlay paths are resolved against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> VoyageResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            VoyageError::load(format!("open map config '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        if let Some(base) = path.parent() {
            cfg.resolve_paths(base);
        }
        Ok(cfg)
    }

    /// Make relative overlay paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for o in &mut self.overlays {
            if o.path.is_relative() {
                o.path = base.join(&o.path);
            }
        }
    }

    /// Check sizes, rates, bounds and style values.
    pub fn validate(&self) -> VoyageResult<()> {
        self.canvas.validate()?;
        Fps::new(self.fps.num, self.fps.den)?;
        if let Some(v) = &self.viewport {
            v.validate()?;
        }
        if !self.margin_px.is_finite() || self.margin_px < 0.0 {
            return Err(VoyageError::validation("margin_px must be finite and >= 0"));
        }
        self.style.validate()?;
        for o in &self.overlays {
            o.bounds.validate()?;
            if !o.opacity.is_finite() || !(0.0..=1.0).contains(&o.opacity) {
                return Err(VoyageError::validation(format!(
                    "overlay '{}' opacity must be within 0..=1",
                    o.path.display()
                )));
            }
        }
        Ok(())
    }

    /// The configured viewport, or one derived from the data.
    pub fn resolve_viewport(&self, table: &TrackTable, boundary: &BoundaryLayer) -> GeoBounds {
        self.viewport
            .unwrap_or_else(|| default_viewport(table, boundary))
    }
}

/// Extent of the well-formed track positions padded by 10% (at least one degree), clamped to the
/// world. Falls back to the boundary extent, then to the whole world.
pub fn default_viewport(table: &TrackTable, boundary: &BoundaryLayer) -> GeoBounds {
    let mut acc: Option<(f64, f64, f64, f64)> = None;
    for p in table.points() {
        let Ok(pos) = p.position() else {
            continue;
        };
        acc = Some(match acc {
            None => (pos.lon, pos.lon, pos.lat, pos.lat),
            Some((a, b, c, d)) => (a.min(pos.lon), b.max(pos.lon), c.min(pos.lat), d.max(pos.lat)),
        });
    }

    let Some((min_lon, max_lon, min_lat, max_lat)) = acc else {
        return boundary.bounds().unwrap_or_else(GeoBounds::world);
    };

    let pad_lon = ((max_lon - min_lon) * 0.1).max(1.0);
    let pad_lat = ((max_lat - min_lat) * 0.1).max(1.0);
    let world = GeoBounds::world();
    GeoBounds {
        min_lon: (min_lon - pad_lon).max(world.min_lon),
        max_lon: (max_lon + pad_lon).min(world.max_lon),
        min_lat: (min_lat - pad_lat).max(world.min_lat),
        max_lat: (max_lat + pad_lat).min(world.max_lat),
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
