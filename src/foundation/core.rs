use crate::foundation::error::{VoyageError, VoyageResult};

pub use kurbo::{Affine, BezPath, Point, Rect};

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> VoyageResult<Self> {
        if den == 0 {
            return Err(VoyageError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(VoyageError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Duration of one frame, saturating for extreme ratios.
    pub fn frame_duration(self) -> std::time::Duration {
        std::time::Duration::try_from_secs_f64(f64::from(self.den) / f64::from(self.num))
            .unwrap_or(std::time::Duration::MAX)
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 1, den: 1 }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Reject empty canvases and sizes the CPU rasterizer cannot address.
    pub fn validate(self) -> VoyageResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VoyageError::validation("canvas width/height must be > 0"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(VoyageError::validation(format!(
                "canvas {}x{} exceeds the maximum of {}x{}",
                self.width,
                self.height,
                u16::MAX,
                u16::MAX
            )));
        }
        Ok(())
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
        }
    }
}

/// A geographic position in degrees (longitude east, latitude north).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl GeoPoint {
    /// Create a point from longitude/latitude degrees.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Axis-aligned geographic bounding box in degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoBounds {
    /// Western edge.
    pub min_lon: f64,
    /// Eastern edge.
    pub max_lon: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
}

impl GeoBounds {
    /// Create validated bounds (`min < max` on both axes, all values finite).
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> VoyageResult<Self> {
        let b = Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        };
        b.validate()?;
        Ok(b)
    }

    /// Check ordering and finiteness.
    pub fn validate(&self) -> VoyageResult<()> {
        let all_finite = [self.min_lon, self.max_lon, self.min_lat, self.max_lat]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(VoyageError::validation("bounds must be finite"));
        }
        if self.min_lon >= self.max_lon || self.min_lat >= self.max_lat {
            return Err(VoyageError::validation(format!(
                "bounds must satisfy min < max (lon {}..{}, lat {}..{})",
                self.min_lon, self.max_lon, self.min_lat, self.max_lat
            )));
        }
        Ok(())
    }

    /// The whole world in plate carrée.
    pub fn world() -> Self {
        Self {
            min_lon: -180.0,
            max_lon: 180.0,
            min_lat: -90.0,
            max_lat: 90.0,
        }
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Return `true` when `p` lies inside or on the edge of the box.
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lon >= self.min_lon && p.lon <= self.max_lon && p.lat >= self.min_lat && p.lat <= self.max_lat
    }

    /// Parse `min_lon,max_lon,min_lat,max_lat`.
    pub fn parse_csv(s: &str) -> VoyageResult<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| VoyageError::validation(format!("invalid bounds '{s}': {e}")))?;
        let [min_lon, max_lon, min_lat, max_lat] = parts[..] else {
            return Err(VoyageError::validation(format!(
                "bounds '{s}' must have 4 values: min_lon,max_lon,min_lat,max_lat"
            )));
        };
        Self::new(min_lon, max_lon, min_lat, max_lat)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Bytes in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
