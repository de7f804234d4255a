use std::path::Path;

use crate::animate::sequence::{CapturedFrame, FrameSequence};
use crate::foundation::core::Fps;
use crate::foundation::error::{VoyageError, VoyageResult};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Playback rate.
    pub fps: Fps,
    /// Number of frames that will be pushed.
    pub frame_count: usize,
}

/// Sink contract for consuming captured frames in sequence order.
///
/// Ordering contract: `push_frame` is called with strictly increasing `CapturedFrame::index`.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> VoyageResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, frame: &CapturedFrame) -> VoyageResult<()>;
    /// Called once after the last frame is pushed; the artifact is complete afterwards.
    fn end(&mut self) -> VoyageResult<()>;
    /// Discard anything written since `begin`. Called after a failed `push_frame` or `end`.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<CapturedFrame>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[CapturedFrame] {
        &self.frames
    }

    /// Whether `end` was reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> VoyageResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &CapturedFrame) -> VoyageResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> VoyageResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
    }
}

/// Feed every frame of `seq` into `sink`.
///
/// An empty sequence or frames of differing sizes are rejected before the sink is started. Any
/// failure after `begin` calls [`FrameSink::abort`].
#[tracing::instrument(skip_all, fields(frames = seq.len()))]
pub fn export_sequence(seq: &FrameSequence, fps: Fps, sink: &mut dyn FrameSink) -> VoyageResult<()> {
    let first = seq
        .frames()
        .first()
        .ok_or_else(|| VoyageError::validation("nothing to export: frame sequence is empty"))?;
    let (width, height) = (first.frame.width, first.frame.height);
    if let Some(bad) = seq
        .iter()
        .find(|f| f.frame.width != width || f.frame.height != height)
    {
        return Err(VoyageError::validation(format!(
            "frame {} is {}x{}, expected {width}x{height}",
            bad.index, bad.frame.width, bad.frame.height
        )));
    }
    Fps::new(fps.num, fps.den)?;

    sink.begin(SinkConfig {
        width,
        height,
        fps,
        frame_count: seq.len(),
    })?;

    let pushed = seq.iter().try_for_each(|f| sink.push_frame(f));
    if let Err(e) = pushed.and_then(|()| sink.end()) {
        tracing::error!(error = %e, "export failed, discarding output");
        sink.abort();
        return Err(e);
    }
    tracing::info!("export finished");
    Ok(())
}

/// Reject frames pushed out of order or with the wrong size.
pub(crate) fn check_frame(
    cfg: &SinkConfig,
    last_index: Option<usize>,
    frame: &CapturedFrame,
) -> VoyageResult<()> {
    if let Some(last) = last_index
        && frame.index <= last
    {
        return Err(VoyageError::export(format!(
            "frame {} pushed after frame {last}",
            frame.index
        )));
    }
    if frame.frame.width != cfg.width || frame.frame.height != cfg.height {
        return Err(VoyageError::export(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.frame.width, frame.frame.height, cfg.width, cfg.height
        )));
    }
    if frame.frame.data.len() != cfg.width as usize * cfg.height as usize * 4 {
        return Err(VoyageError::export(
            "frame.data size mismatch with width*height*4",
        ));
    }
    Ok(())
}

/// Create the parent directory of an output path.
pub(crate) fn ensure_parent_dir(path: &Path) -> VoyageResult<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => std::fs::create_dir_all(parent).map_err(|e| {
            VoyageError::export(format!("create output directory '{}': {e}", parent.display()))
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
