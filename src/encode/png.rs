use std::path::Path;

use crate::encode::sink::ensure_parent_dir;
use crate::foundation::error::{VoyageError, VoyageResult};
use crate::render::backend::FrameRGBA;

/// Encode `frame` as a straight-alpha PNG.
pub fn encode_png(frame: &FrameRGBA) -> VoyageResult<Vec<u8>> {
    let rgba = frame.to_straight_rgba8();
    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
        .ok_or_else(|| VoyageError::export("frame.data size mismatch with width*height*4"))?;
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| VoyageError::export(format!("png encode failed: {e}")))?;
    Ok(buf)
}

/// Write `frame` as a PNG file, creating parent directories.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> VoyageResult<()> {
    let bytes = encode_png(frame)?;
    ensure_parent_dir(path)?;
    std::fs::write(path, bytes)
        .map_err(|e| VoyageError::export(format!("write png '{}': {e}", path.display())))
}
