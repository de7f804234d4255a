use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::animate::sequence::CapturedFrame;
use crate::encode::png::encode_png;
use crate::encode::sink::{FrameSink, SinkConfig, check_frame, ensure_parent_dir};
use crate::foundation::error::{VoyageError, VoyageResult};
use crate::scene::layer::SceneStats;
use crate::tracks::table::GroupKey;

const FRAMES_DIR: &str = "frames";
const MANIFEST: &str = "frames.json";
const INDEX: &str = "index.html";

/// Options for [`HtmlSink`].
#[derive(Clone, Debug)]
pub struct HtmlSinkOpts {
    /// Output directory; replaced as a whole on success.
    pub out_dir: PathBuf,
    /// Replace an existing output directory.
    pub overwrite: bool,
    /// Page title.
    pub title: String,
}

impl HtmlSinkOpts {
    /// Create options for writing a player into `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            overwrite: true,
            title: "voyagemap".to_string(),
        }
    }
}

/// Manifest written to `frames.json` and embedded in `index.html`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HtmlManifest {
    /// Page title.
    pub title: String,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Milliseconds each frame is shown at normal speed.
    pub frame_ms: f64,
    /// Frames in playback order.
    pub frames: Vec<ManifestFrame>,
}

/// One manifest entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ManifestFrame {
    /// Position in the sequence.
    pub index: usize,
    /// Grouping value.
    pub key: GroupKey,
    /// Title text.
    pub title: String,
    /// Path of the PNG relative to the output directory.
    pub file: String,
    /// xxh3 fingerprint of the pixels, hex.
    pub fingerprint: String,
    /// Route statistics.
    #[serde(flatten)]
    pub stats: SceneStats,
}

/// Writes a self-contained HTML player: `frames/frame_NNNN.png`, `frames.json` and `index.html`.
///
/// Everything goes to a hidden staging directory next to `out_dir` which is renamed into place by
/// `end`; a failed export leaves `out_dir` untouched.
pub struct HtmlSink {
    opts: HtmlSinkOpts,
    staging: Option<PathBuf>,
    cfg: Option<SinkConfig>,
    frames: Vec<ManifestFrame>,
    last_index: Option<usize>,
}

impl HtmlSink {
    /// Create a sink writing to `opts.out_dir`.
    pub fn new(opts: HtmlSinkOpts) -> Self {
        Self {
            opts,
            staging: None,
            cfg: None,
            frames: Vec::new(),
            last_index: None,
        }
    }

    fn staging_path(&self) -> VoyageResult<PathBuf> {
        let name = self.opts.out_dir.file_name().ok_or_else(|| {
            VoyageError::validation(format!(
                "html output '{}' has no directory name",
                self.opts.out_dir.display()
            ))
        })?;
        let mut staged = std::ffi::OsString::from(".");
        staged.push(name);
        staged.push(".partial");
        Ok(self.opts.out_dir.with_file_name(staged))
    }

    fn manifest(&self, cfg: &SinkConfig) -> HtmlManifest {
        HtmlManifest {
            title: self.opts.title.clone(),
            width: cfg.width,
            height: cfg.height,
            frame_ms: cfg.fps.frame_duration_ms(),
            frames: self.frames.clone(),
        }
    }
}

impl FrameSink for HtmlSink {
    fn begin(&mut self, cfg: SinkConfig) -> VoyageResult<()> {
        if !self.opts.overwrite && self.opts.out_dir.exists() {
            return Err(VoyageError::export(format!(
                "output directory '{}' already exists",
                self.opts.out_dir.display()
            )));
        }
        ensure_parent_dir(&self.opts.out_dir)?;

        let staging = self.staging_path()?;
        if staging.exists() {
            std::fs::remove_dir_all(&staging).map_err(|e| {
                VoyageError::export(format!("clear stale '{}': {e}", staging.display()))
            })?;
        }
        std::fs::create_dir_all(staging.join(FRAMES_DIR))
            .map_err(|e| VoyageError::export(format!("create '{}': {e}", staging.display())))?;

        tracing::debug!(staging = %staging.display(), "html export started");
        self.staging = Some(staging);
        self.frames = Vec::with_capacity(cfg.frame_count);
        self.cfg = Some(cfg);
        self.last_index = None;
        Ok(())
    }

    fn push_frame(&mut self, frame: &CapturedFrame) -> VoyageResult<()> {
        let (Some(cfg), Some(staging)) = (self.cfg.as_ref(), self.staging.as_ref()) else {
            return Err(VoyageError::export("html sink not started"));
        };
        check_frame(cfg, self.last_index, frame)?;

        let file = format!("{FRAMES_DIR}/frame_{:04}.png", frame.index);
        let bytes = encode_png(&frame.frame)?;
        write_file(&staging.join(&file), &bytes)?;

        self.last_index = Some(frame.index);
        self.frames.push(ManifestFrame {
            index: frame.index,
            key: frame.key.clone(),
            title: frame.title.clone(),
            file,
            fingerprint: format!("{:016x}", frame.frame.fingerprint()),
            stats: frame.stats,
        });
        Ok(())
    }

    fn end(&mut self) -> VoyageResult<()> {
        let (Some(cfg), Some(staging)) = (self.cfg.as_ref(), self.staging.as_ref()) else {
            return Err(VoyageError::export("html sink not started"));
        };

        let manifest = self.manifest(cfg);
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| VoyageError::export(format!("serialize manifest: {e}")))?;
        write_file(&staging.join(MANIFEST), json.as_bytes())?;
        write_file(
            &staging.join(INDEX),
            render_index_html(&manifest.title, &json).as_bytes(),
        )?;

        let out = &self.opts.out_dir;
        if out.exists() {
            std::fs::remove_dir_all(out)
                .map_err(|e| VoyageError::export(format!("replace '{}': {e}", out.display())))?;
        }
        std::fs::rename(staging, out).map_err(|e| {
            VoyageError::export(format!(
                "move '{}' to '{}': {e}",
                staging.display(),
                out.display()
            ))
        })?;

        tracing::info!(out = %out.display(), frames = self.frames.len(), "wrote html player");
        self.staging = None;
        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        if let Some(staging) = self.staging.take() {
            let _ = std::fs::remove_dir_all(staging);
        }
        self.cfg = None;
        self.frames.clear();
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> VoyageResult<()> {
    std::fs::write(path, bytes)
        .map_err(|e| VoyageError::export(format!("write '{}': {e}", path.display())))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Player page with the manifest inlined, so it also works from `file://`.
fn render_index_html(title: &str, manifest_json: &str) -> String {
    PLAYER_TEMPLATE
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{MANIFEST}}", &manifest_json.replace("</", "<\\/"))
}

const PLAYER_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{TITLE}}</title>
<style>
  body { margin: 0; font-family: Georgia, serif; background: #f4ecd8; color: #3b2f1e; }
  main { max-width: 100%; display: flex; flex-direction: column; align-items: center; padding: 16px; }
  img { max-width: 100%; height: auto; box-shadow: 0 1px 6px rgba(0,0,0,.25); }
  .controls { display: flex; gap: 8px; align-items: center; margin-top: 12px; flex-wrap: wrap; }
  button { font: inherit; padding: 4px 12px; }
  #label { min-width: 10ch; text-align: center; font-weight: bold; }
</style>
</head>
<body>
<main>
  <h1>{{TITLE}}</h1>
  <img id="frame" alt="">
  <div class="controls">
    <button id="prev" title="previous frame">&#9664;</button>
    <button id="play">pause</button>
    <button id="next" title="next frame">&#9654;</button>
    <span id="label"></span>
    <input id="scrub" type="range" min="0" value="0">
    <label>speed
      <select id="speed">
        <option value="0.5">0.5x</option>
        <option value="1" selected>1x</option>
        <option value="2">2x</option>
        <option value="4">4x</option>
      </select>
    </label>
  </div>
</main>
<script id="manifest" type="application/json">{{MANIFEST}}</script>
<script>
(function () {
  var m = JSON.parse(document.getElementById("manifest").textContent);
  var img = document.getElementById("frame");
  var label = document.getElementById("label");
  var scrub = document.getElementById("scrub");
  var play = document.getElementById("play");
  var speed = document.getElementById("speed");
  var i = 0, timer = null;

  img.width = m.width;
  img.height = m.height;
  scrub.max = Math.max(0, m.frames.length - 1);

  function show(n) {
    if (m.frames.length === 0) { label.textContent = "no frames"; return; }
    i = (n + m.frames.length) % m.frames.length;
    var f = m.frames[i];
    img.src = f.file;
    img.alt = f.title;
    label.textContent = f.title;
    scrub.value = i;
  }
  function start() {
    stop();
    timer = setInterval(function () { show(i + 1); }, m.frame_ms / parseFloat(speed.value));
    play.textContent = "pause";
  }
  function stop() {
    if (timer !== null) { clearInterval(timer); timer = null; }
    play.textContent = "play";
  }

  play.onclick = function () { timer === null ? start() : stop(); };
  document.getElementById("prev").onclick = function () { stop(); show(i - 1); };
  document.getElementById("next").onclick = function () { stop(); show(i + 1); };
  scrub.oninput = function () { stop(); show(parseInt(scrub.value, 10)); };
  speed.onchange = function () { if (timer !== null) start(); };

  m.frames.forEach(function (f) { new Image().src = f.file; });
  show(0);
  if (m.frames.length > 1) start(); else stop();
})();
</script>
</body>
</html>
"#;

#[cfg(test)]
#[path = "../../tests/unit/encode/html.rs"]
mod tests;
