use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::GeoBounds;
use crate::foundation::error::{VoyageError, VoyageResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode PNG/JPEG/... bytes with the `image` crate.
pub fn decode_image(bytes: &[u8]) -> VoyageResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// A decorative raster placed on the map by a caller-supplied geographic box.
///
/// The bounding box is never inferred from the image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageOverlay {
    /// Display name (file stem) used in logs.
    pub name: String,
    /// Decoded pixels.
    pub image: PreparedImage,
    /// Placement in lon/lat degrees.
    pub bounds: GeoBounds,
    /// Opacity in `0..=1`.
    pub opacity: f32,
}

impl ImageOverlay {
    /// Read and decode an overlay image from disk.
    #[tracing::instrument(skip(bounds))]
    pub fn load(path: &Path, bounds: GeoBounds, opacity: f32) -> VoyageResult<Self> {
        bounds.validate()?;
        if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
            return Err(VoyageError::validation(format!(
                "overlay opacity must be within 0..=1, got {opacity}"
            )));
        }
        let bytes = std::fs::read(path).map_err(|e| {
            VoyageError::load(format!(
                "failed to read overlay image '{}': {e}",
                path.display()
            ))
        })?;
        let image = decode_image(&bytes)
            .map_err(|e| VoyageError::load(format!("{}: {e}", path.display())))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::debug!(%name, width = image.width, height = image.height, "loaded overlay");
        Ok(Self {
            name,
            image,
            bounds,
            opacity,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
