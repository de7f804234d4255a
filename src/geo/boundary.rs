//! Landmass outlines read from GeoJSON.
//!
//! Only `Polygon` and `MultiPolygon` geometries contribute; points and lines are skipped. Coordinates
//! must already be lon/lat degrees (the same reference as the track table).

use std::path::Path;

use serde::Deserialize;

use crate::foundation::core::{BezPath, GeoBounds, GeoPoint, Point};
use crate::foundation::error::{VoyageError, VoyageResult};

/// One polygon: the exterior ring followed by any holes.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    /// Rings in file order; the first is the exterior.
    pub rings: Vec<Vec<GeoPoint>>,
}

impl Polygon {
    /// Closed path in lon/lat space with one subpath per ring.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for ring in &self.rings {
            let mut it = ring.iter();
            let Some(first) = it.next() else { continue };
            path.move_to(Point::new(first.lon, first.lat));
            for p in it {
                path.line_to(Point::new(p.lon, p.lat));
            }
            path.close_path();
        }
        path
    }
}

/// Read-only background polygon layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryLayer {
    polygons: Vec<Polygon>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum GeoJsonObject {
    FeatureCollection {
        features: Vec<GeoJsonObject>,
    },
    Feature {
        #[serde(default)]
        geometry: Option<Box<GeoJsonObject>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonObject>,
    },
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Other,
}

impl BoundaryLayer {
    /// Wrap already-built polygons.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    /// Load a GeoJSON file.
    #[tracing::instrument]
    pub fn from_geojson_path(path: &Path) -> VoyageResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            VoyageError::load(format!(
                "failed to read boundary file '{}': {e}",
                path.display()
            ))
        })?;
        let layer = Self::from_geojson_slice(&bytes)
            .map_err(|e| VoyageError::load(format!("{}: {e}", path.display())))?;
        tracing::info!(polygons = layer.polygons.len(), "loaded boundary layer");
        Ok(layer)
    }

    /// Parse GeoJSON bytes.
    pub fn from_geojson_slice(bytes: &[u8]) -> VoyageResult<Self> {
        let obj: GeoJsonObject = serde_json::from_slice(bytes)
            .map_err(|e| VoyageError::load(format!("invalid GeoJSON: {e}")))?;
        let mut polygons = Vec::new();
        collect_polygons(obj, &mut polygons)?;
        Ok(Self { polygons })
    }

    /// Polygons in file order.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Return `true` when no polygon was found.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Bounding box of every vertex, if any.
    pub fn bounds(&self) -> Option<GeoBounds> {
        let mut pts = self.polygons.iter().flat_map(|p| p.rings.iter().flatten());
        let first = pts.next()?;
        let mut b = GeoBounds {
            min_lon: first.lon,
            max_lon: first.lon,
            min_lat: first.lat,
            max_lat: first.lat,
        };
        for p in pts {
            b.min_lon = b.min_lon.min(p.lon);
            b.max_lon = b.max_lon.max(p.lon);
            b.min_lat = b.min_lat.min(p.lat);
            b.max_lat = b.max_lat.max(p.lat);
        }
        Some(b)
    }
}

fn collect_polygons(obj: GeoJsonObject, out: &mut Vec<Polygon>) -> VoyageResult<()> {
    match obj {
        GeoJsonObject::FeatureCollection { features } => {
            for f in features {
                collect_polygons(f, out)?;
            }
        }
        GeoJsonObject::Feature { geometry } => {
            if let Some(g) = geometry {
                collect_polygons(*g, out)?;
            }
        }
        GeoJsonObject::GeometryCollection { geometries } => {
            for g in geometries {
                collect_polygons(g, out)?;
            }
        }
        GeoJsonObject::Polygon { coordinates } => out.push(polygon_from_rings(coordinates)?),
        GeoJsonObject::MultiPolygon { coordinates } => {
            for rings in coordinates {
                out.push(polygon_from_rings(rings)?);
            }
        }
        GeoJsonObject::Other => {}
    }
    Ok(())
}

fn polygon_from_rings(rings: Vec<Vec<Vec<f64>>>) -> VoyageResult<Polygon> {
    let rings = rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .map(|pos| match pos[..] {
                    [lon, lat, ..] if lon.is_finite() && lat.is_finite() => {
                        Ok(GeoPoint::new(lon, lat))
                    }
                    _ => Err(VoyageError::load(format!(
                        "invalid GeoJSON position {pos:?}"
                    ))),
                })
                .collect::<VoyageResult<Vec<_>>>()
        })
        .collect::<VoyageResult<Vec<_>>>()?;
    Ok(Polygon { rings })
}

#[cfg(test)]
#[path = "../../tests/unit/geo/boundary.rs"]
mod tests;
