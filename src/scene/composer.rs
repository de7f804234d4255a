use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::ImageOverlay;
use crate::foundation::core::BezPath;
use crate::foundation::error::VoyageResult;
use crate::geo::boundary::BoundaryLayer;
use crate::geo::projection::Projection;
use crate::scene::layer::{Layer, RouteSegment, Scene};
use crate::scene::style::MapStyle;
use crate::tracks::table::TrackView;

/// Builds one [`Scene`] per call from immutable layer templates.
///
/// Templates (projection, land paths, overlays, style) are fixed at construction; only the route
/// subset and the title change between frames. Composition does no pixel work.
#[derive(Clone, Debug)]
pub struct StaticComposer {
    projection: Projection,
    style: Arc<MapStyle>,
    land: Arc<Vec<BezPath>>,
    overlays: Vec<Arc<ImageOverlay>>,
}

impl StaticComposer {
    /// Freeze the templates shared by every frame.
    pub fn new(
        projection: Projection,
        style: MapStyle,
        boundary: &BoundaryLayer,
        overlays: Vec<ImageOverlay>,
    ) -> VoyageResult<Self> {
        style.validate()?;
        let land = boundary.polygons().iter().map(|p| p.to_path()).collect();
        Ok(Self {
            projection,
            style: Arc::new(style),
            land: Arc::new(land),
            overlays: overlays.into_iter().map(Arc::new).collect(),
        })
    }

    /// Projection shared by every scene.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Styling shared by every scene.
    pub fn style(&self) -> &MapStyle {
        &self.style
    }

    /// Title for a grouping value.
    pub fn title_for(&self, value: &str) -> String {
        format!("{}{value}", self.style.title_prefix)
    }

    /// Compose a scene for `routes` titled `title`.
    ///
    /// An empty view yields a valid scene with zero route segments. A malformed coordinate fails
    /// with a compose error naming its source line.
    pub fn compose(&self, routes: &TrackView<'_>, title: &str) -> VoyageResult<Scene> {
        let style = &self.style;
        let mut layers = Vec::with_capacity(6 + self.overlays.len());

        layers.push(Layer::Panel { fill: style.panel });
        if style.graticule_step_deg > 0.0 {
            layers.push(Layer::Graticule {
                step_deg: style.graticule_step_deg,
                color: style.graticule,
                width_px: 0.5,
            });
        }
        if !self.land.is_empty() {
            layers.push(Layer::Land {
                paths: Arc::clone(&self.land),
                fill: style.land_fill,
                stroke: style.land_stroke,
                stroke_px: style.land_stroke_px,
            });
        }
        layers.push(Layer::Routes {
            segments: self.route_segments(routes)?,
            width_px: style.route_width_px,
            opacity: style.route_opacity,
        });
        for overlay in &self.overlays {
            layers.push(Layer::Image {
                overlay: Arc::clone(overlay),
            });
        }
        layers.push(Layer::Title {
            text: title.to_string(),
            color: style.title_color,
            size_px: style.title_size_px,
        });

        Ok(Scene {
            projection: self.projection,
            clear: style.clear,
            layers,
            title: title.to_string(),
        })
    }

    fn route_segments(&self, routes: &TrackView<'_>) -> VoyageResult<Vec<RouteSegment>> {
        let mut segments: Vec<RouteSegment> = Vec::new();
        let mut index: HashMap<(&str, &str), usize> = HashMap::new();

        for p in routes.points() {
            let pos = p.position()?;
            let i = *index.entry(p.path_key()).or_insert_with(|| {
                segments.push(RouteSegment {
                    trip: p.trip.clone(),
                    subpath: p.subpath.clone(),
                    nation: p.nation.clone(),
                    color: self.style.route_color(&p.nation),
                    points: Vec::new(),
                });
                segments.len() - 1
            });
            segments[i].points.push(pos);
        }

        Ok(segments)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/composer.rs"]
mod tests;
