use std::sync::Arc;

use crate::assets::decode::ImageOverlay;
use crate::foundation::color::Rgba8;
use crate::foundation::core::{BezPath, Canvas, GeoPoint};
use crate::geo::projection::Projection;

/// One continuous drawn path: the points of a (trip, sub-path) pair in stored order.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteSegment {
    /// Trip identifier.
    pub trip: String,
    /// Sub-path identifier.
    pub subpath: String,
    /// Nationality of the first point of the segment.
    pub nation: String,
    /// Stroke color.
    pub color: Rgba8,
    /// Positions in connection order.
    pub points: Vec<GeoPoint>,
}

/// One independently specified visual element.
///
/// Layers are plain values; geometry is in lon/lat degrees and mapped to pixels by the backend.
#[derive(Clone, Debug, PartialEq)]
pub enum Layer {
    /// Fill of the plot rectangle.
    Panel {
        /// Fill color.
        fill: Rgba8,
    },
    /// Meridians and parallels every `step_deg`.
    Graticule {
        /// Spacing in degrees.
        step_deg: f64,
        /// Line color.
        color: Rgba8,
        /// Line width in pixels.
        width_px: f64,
    },
    /// Background landmass polygons.
    Land {
        /// Closed paths in lon/lat space, shared across frames.
        paths: Arc<Vec<BezPath>>,
        /// Fill color.
        fill: Rgba8,
        /// Outline color.
        stroke: Rgba8,
        /// Outline width in pixels; `0` disables outlines.
        stroke_px: f64,
    },
    /// Ship routes.
    Routes {
        /// Path segments in order of first appearance.
        segments: Vec<RouteSegment>,
        /// Stroke width in pixels.
        width_px: f64,
        /// Layer opacity.
        opacity: f32,
    },
    /// Raster annotation placed by geographic box.
    Image {
        /// The overlay, shared across frames.
        overlay: Arc<ImageOverlay>,
    },
    /// Frame title, top-left of the plot rectangle.
    Title {
        /// Text to draw.
        text: String,
        /// Text color.
        color: Rgba8,
        /// Font size in pixels.
        size_px: f32,
    },
}

impl Layer {
    /// Short name for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Panel { .. } => "panel",
            Self::Graticule { .. } => "graticule",
            Self::Land { .. } => "land",
            Self::Routes { .. } => "routes",
            Self::Image { .. } => "image",
            Self::Title { .. } => "title",
        }
    }
}

/// Route statistics of one scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SceneStats {
    /// Number of path segments.
    pub segments: usize,
    /// Number of track points across all segments.
    pub points: usize,
}

/// An ordered list of layers plus the frame they are drawn into.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Geographic-to-pixel mapping, also fixes the canvas size.
    pub projection: Projection,
    /// Color the surface is reset to before drawing.
    pub clear: Rgba8,
    /// Layers, bottom first.
    pub layers: Vec<Layer>,
    /// Title text (also carried when no font is available to draw it).
    pub title: String,
}

impl Scene {
    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.projection.canvas()
    }

    /// Route segments of every route layer.
    pub fn route_segments(&self) -> impl Iterator<Item = &RouteSegment> {
        self.layers.iter().flat_map(|l| match l {
            Layer::Routes { segments, .. } => segments.as_slice(),
            _ => [].as_slice(),
        })
    }

    /// Route statistics.
    pub fn stats(&self) -> SceneStats {
        self.route_segments()
            .fold(SceneStats::default(), |mut acc, s| {
                acc.segments += 1;
                acc.points += s.points.len();
                acc
            })
    }
}
