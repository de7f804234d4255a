use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use image::codecs::gif::{GifEncoder, Repeat};

use crate::animate::sequence::CapturedFrame;
use crate::encode::sink::{FrameSink, SinkConfig, check_frame, ensure_parent_dir};
use crate::foundation::error::{VoyageError, VoyageResult};

/// Encoder output that stays reachable after the encoder is dropped.
#[derive(Clone, Default)]
struct GifBuffer(Arc<Mutex<Vec<u8>>>);

impl GifBuffer {
    fn take(&self) -> VoyageResult<Vec<u8>> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| VoyageError::export("gif buffer lock poisoned"))?;
        Ok(std::mem::take(&mut *bytes))
    }
}

impl Write for GifBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("gif buffer lock poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Animated GIF sink looping forever at the sequence fps.
///
/// Frames are encoded in memory; `end` writes them to `<out>.partial`, syncs it and renames it into
/// place.
pub struct GifSink {
    out_path: PathBuf,
    encoder: Option<GifEncoder<GifBuffer>>,
    buffer: GifBuffer,
    file: Option<File>,
    delay: image::Delay,
    cfg: Option<SinkConfig>,
    last_index: Option<usize>,
}

impl GifSink {
    /// Create a sink writing to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            encoder: None,
            buffer: GifBuffer::default(),
            file: None,
            delay: image::Delay::from_numer_denom_ms(1000, 1),
            cfg: None,
            last_index: None,
        }
    }

    fn partial_path(&self) -> PathBuf {
        let mut name = self.out_path.as_os_str().to_owned();
        name.push(".partial");
        PathBuf::from(name)
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> VoyageResult<()> {
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(VoyageError::validation("gif frames are limited to 65535x65535"));
        }
        ensure_parent_dir(&self.out_path)?;

        let partial = self.partial_path();
        let file = File::create(&partial).map_err(|e| {
            VoyageError::export(format!("create '{}': {e}", partial.display()))
        })?;
        self.buffer = GifBuffer::default();
        let mut encoder = GifEncoder::new(self.buffer.clone());
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| VoyageError::export(format!("gif header: {e}")))?;

        self.delay = image::Delay::from_saturating_duration(cfg.fps.frame_duration());
        self.encoder = Some(encoder);
        self.file = Some(file);
        self.cfg = Some(cfg);
        self.last_index = None;
        Ok(())
    }

    fn push_frame(&mut self, frame: &CapturedFrame) -> VoyageResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| VoyageError::export("gif sink not started"))?;
        check_frame(cfg, self.last_index, frame)?;
        self.last_index = Some(frame.index);

        let rgba = image::RgbaImage::from_raw(
            frame.frame.width,
            frame.frame.height,
            frame.frame.to_straight_rgba8(),
        )
        .ok_or_else(|| VoyageError::export("frame.data size mismatch with width*height*4"))?;

        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| VoyageError::export("gif sink is already finalized"))?;
        encoder
            .encode_frame(image::Frame::from_parts(rgba, 0, 0, self.delay))
            .map_err(|e| VoyageError::export(format!("gif frame {}: {e}", frame.index)))
    }

    fn end(&mut self) -> VoyageResult<()> {
        let (Some(encoder), Some(file)) = (self.encoder.take(), self.file.take()) else {
            return Err(VoyageError::export("gif sink not started"));
        };
        // Dropping the encoder appends the trailer.
        drop(encoder);
        let bytes = self.buffer.take()?;

        let partial = self.partial_path();
        persist(file, &bytes)
            .map_err(|e| e.context(format!("write '{}'", partial.display())))?;
        std::fs::rename(&partial, &self.out_path).map_err(|e| {
            VoyageError::export(format!(
                "move '{}' to '{}': {e}",
                partial.display(),
                self.out_path.display()
            ))
        })?;
        tracing::info!(out = %self.out_path.display(), bytes = bytes.len(), "wrote gif");
        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        self.encoder = None;
        self.file = None;
        self.cfg = None;
        let _ = self.buffer.take();
        let _ = std::fs::remove_file(self.partial_path());
    }
}

/// Write `bytes` and make sure they reached the disk.
fn persist(mut file: File, bytes: &[u8]) -> VoyageResult<()> {
    file.write_all(bytes)
        .and_then(|()| file.flush())
        .and_then(|()| file.sync_all())
        .map_err(|e| VoyageError::export(e.to_string()))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
