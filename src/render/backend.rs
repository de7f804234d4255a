use crate::foundation::error::VoyageResult;
use crate::scene::layer::Scene;

/// One rendered image in RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 bytes.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied by alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Stable 64-bit hash of dimensions and pixel bytes.
    pub fn fingerprint(&self) -> u64 {
        let mut h = xxhash_rust::xxh3::Xxh3::new();
        h.update(&self.width.to_le_bytes());
        h.update(&self.height.to_le_bytes());
        h.update(&[u8::from(self.premultiplied)]);
        h.update(&self.data);
        h.digest()
    }

    /// RGBA bytes of the pixel at `(x, y)`, if in range.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy of the pixel bytes.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if self.premultiplied {
            crate::foundation::math::unpremultiply_rgba8(&self.data)
        } else {
            self.data.clone()
        }
    }
}

/// Rasterizes a [`Scene`] into a [`FrameRGBA`].
///
/// Backends may keep caches between calls; for the same scene they must return identical bytes.
pub trait RenderBackend {
    /// Draw every layer of `scene`, bottom first.
    fn render_scene(&mut self, scene: &Scene) -> VoyageResult<FrameRGBA>;
}
