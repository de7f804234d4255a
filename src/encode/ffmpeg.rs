use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::animate::sequence::CapturedFrame;
use crate::encode::sink::{FrameSink, SinkConfig, check_frame, ensure_parent_dir};
use crate::foundation::core::Fps;
use crate::foundation::error::{VoyageError, VoyageResult};
use crate::foundation::math::flatten_premul_over_bg_to_opaque_rgba8;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Destination `.mp4`.
    pub out_path: PathBuf,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
    /// Straight-alpha RGBA8 color transparent pixels are flattened onto.
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Write an H.264 MP4 to `out_path` over a white background.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [255, 255, 255, 255],
        }
    }
}

/// A running `ffmpeg` reading raw RGBA frames from stdin.
struct FfmpegProcess {
    child: Child,
    stdin: ChildStdin,
    stderr: JoinHandle<std::io::Result<Vec<u8>>>,
}

impl FfmpegProcess {
    fn spawn(cfg: &SinkConfig, out: &Path) -> VoyageResult<Self> {
        let size = format!("{}x{}", cfg.width, cfg.height);
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "-s", &size])
            .args(input_rate_args(cfg.fps))
            .args(["-i", "pipe:0", "-an"])
            .args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"])
            .arg(out)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| VoyageError::export(format!("spawn ffmpeg: {e}")))?;
        let (Some(stdin), Some(mut stderr)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            return Err(VoyageError::export("ffmpeg pipes unavailable"));
        };
        // ffmpeg blocks once its stderr pipe fills up.
        let stderr = std::thread::spawn(move || {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf)?;
            Ok(buf)
        });
        Ok(Self {
            child,
            stdin,
            stderr,
        })
    }

    fn write(&mut self, bytes: &[u8]) -> VoyageResult<()> {
        self.stdin
            .write_all(bytes)
            .map_err(|e| VoyageError::export(format!("pipe frame into ffmpeg: {e}")))
    }

    fn finish(self) -> VoyageResult<()> {
        let Self {
            mut child,
            stdin,
            stderr,
        } = self;
        drop(stdin);

        let status = child
            .wait()
            .map_err(|e| VoyageError::export(format!("wait for ffmpeg: {e}")))?;
        let log = match stderr.join() {
            Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).trim().to_string(),
            Ok(Err(e)) => format!("<stderr unreadable: {e}>"),
            Err(_) => "<stderr reader panicked>".to_string(),
        };
        if !status.success() {
            return Err(VoyageError::export(format!("ffmpeg failed ({status}): {log}")));
        }
        if !log.is_empty() {
            tracing::warn!(%log, "ffmpeg reported errors");
        }
        Ok(())
    }

    fn kill(self) {
        let Self {
            mut child,
            stdin,
            stderr,
        } = self;
        drop(stdin);
        let _ = child.kill();
        let _ = child.wait();
        let _ = stderr.join();
    }
}

/// MP4 sink piping frames into the system `ffmpeg` (libx264, yuv420p).
///
/// Frames are flattened over [`FfmpegSinkOpts::bg_rgba`] since the encoder input is opaque RGBA.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    process: Option<FfmpegProcess>,
    flat: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_index: Option<usize>,
}

impl FfmpegSink {
    /// Create an idle sink; `ffmpeg` is spawned by `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            process: None,
            flat: Vec::new(),
            cfg: None,
            last_index: None,
        }
    }

    /// `<out>.partial.mp4`; ffmpeg picks the container from the extension.
    fn partial_path(&self) -> PathBuf {
        let mut name = self.opts.out_path.as_os_str().to_owned();
        name.push(".partial.mp4");
        PathBuf::from(name)
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> VoyageResult<()> {
        if cfg.width == 0 || cfg.height == 0 || cfg.width % 2 != 0 || cfg.height % 2 != 0 {
            return Err(VoyageError::validation(format!(
                "mp4 output needs even, non-zero dimensions, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        let out = &self.opts.out_path;
        if !self.opts.overwrite && out.exists() {
            return Err(VoyageError::export(format!(
                "'{}' already exists",
                out.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(VoyageError::export("mp4 output needs ffmpeg on PATH"));
        }
        ensure_parent_dir(out)?;

        self.process = Some(FfmpegProcess::spawn(&cfg, &self.partial_path())?);
        tracing::debug!(out = %out.display(), width = cfg.width, height = cfg.height, "ffmpeg started");
        self.flat = vec![0; cfg.width as usize * cfg.height as usize * 4];
        self.cfg = Some(cfg);
        self.last_index = None;
        Ok(())
    }

    fn push_frame(&mut self, frame: &CapturedFrame) -> VoyageResult<()> {
        let (Some(cfg), Some(process)) = (self.cfg.as_ref(), self.process.as_mut()) else {
            return Err(VoyageError::export("mp4 sink not started"));
        };
        check_frame(cfg, self.last_index, frame)?;

        if frame.frame.premultiplied {
            flatten_premul_over_bg_to_opaque_rgba8(&mut self.flat, &frame.frame.data, self.opts.bg_rgba)?;
        } else {
            self.flat.copy_from_slice(&frame.frame.data);
        }
        process.write(&self.flat)?;
        self.last_index = Some(frame.index);
        Ok(())
    }

    fn end(&mut self) -> VoyageResult<()> {
        let process = self
            .process
            .take()
            .ok_or_else(|| VoyageError::export("mp4 sink not started"))?;
        process.finish()?;

        let partial = self.partial_path();
        let out = &self.opts.out_path;
        std::fs::rename(&partial, out).map_err(|e| {
            VoyageError::export(format!(
                "move '{}' to '{}': {e}",
                partial.display(),
                out.display()
            ))
        })?;
        tracing::info!(out = %self.opts.out_path.display(), "wrote mp4");
        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        if let Some(process) = self.process.take() {
            process.kill();
        }
        let _ = std::fs::remove_file(self.partial_path());
        self.cfg = None;
    }
}

/// `-r num/den`; rawvideo input takes its rate before `-i`.
fn input_rate_args(fps: Fps) -> [String; 2] {
    ["-r".to_string(), format!("{}/{}", fps.num, fps.den)]
}

/// Return `true` when `ffmpeg -version` runs successfully.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
