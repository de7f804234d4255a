use crate::foundation::core::{Affine, Canvas, GeoBounds, GeoPoint, Point, Rect};
use crate::foundation::error::{VoyageError, VoyageResult};

/// Equirectangular (plate carrée) mapping from a geographic viewport onto a pixel canvas.
///
/// One degree of longitude and one degree of latitude map to the same number of pixels; the
/// viewport is centered inside the canvas minus `margin_px` on every side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    viewport: GeoBounds,
    canvas: Canvas,
    scale: f64,
    origin: Point,
}

impl Projection {
    /// Fit `viewport` into `canvas`.
    pub fn fit(viewport: GeoBounds, canvas: Canvas, margin_px: f64) -> VoyageResult<Self> {
        viewport.validate()?;
        canvas.validate()?;
        if !margin_px.is_finite() || margin_px < 0.0 {
            return Err(VoyageError::validation("margin_px must be finite and >= 0"));
        }

        let avail_w = f64::from(canvas.width) - 2.0 * margin_px;
        let avail_h = f64::from(canvas.height) - 2.0 * margin_px;
        if avail_w <= 0.0 || avail_h <= 0.0 {
            return Err(VoyageError::validation(format!(
                "margin {margin_px}px leaves no room on a {}x{} canvas",
                canvas.width, canvas.height
            )));
        }

        let scale = (avail_w / viewport.width()).min(avail_h / viewport.height());
        let used_w = viewport.width() * scale;
        let used_h = viewport.height() * scale;
        let origin = Point::new(
            (f64::from(canvas.width) - used_w) / 2.0,
            (f64::from(canvas.height) - used_h) / 2.0,
        );

        Ok(Self {
            viewport,
            canvas,
            scale,
            origin,
        })
    }

    /// Geographic viewport being displayed.
    pub fn viewport(&self) -> GeoBounds {
        self.viewport
    }

    /// Target canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Pixels per degree.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Pixel position of a geographic point.
    pub fn project(&self, p: GeoPoint) -> Point {
        Point::new(
            self.origin.x + (p.lon - self.viewport.min_lon) * self.scale,
            self.origin.y + (self.viewport.max_lat - p.lat) * self.scale,
        )
    }

    /// The same mapping as an affine transform over `(lon, lat)` coordinates.
    pub fn to_affine(&self) -> Affine {
        Affine::new([
            self.scale,
            0.0,
            0.0,
            -self.scale,
            self.origin.x - self.viewport.min_lon * self.scale,
            self.origin.y + self.viewport.max_lat * self.scale,
        ])
    }

    /// Pixel rectangle covered by the viewport.
    pub fn plot_rect(&self) -> Rect {
        Rect::from_points(
            self.project(GeoPoint::new(self.viewport.min_lon, self.viewport.max_lat)),
            self.project(GeoPoint::new(self.viewport.max_lon, self.viewport.min_lat)),
        )
    }

    /// Pixel rectangle covered by `bounds`.
    pub fn rect_for(&self, bounds: GeoBounds) -> Rect {
        Rect::from_points(
            self.project(GeoPoint::new(bounds.min_lon, bounds.max_lat)),
            self.project(GeoPoint::new(bounds.max_lon, bounds.min_lat)),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geo/projection.rs"]
mod tests;
