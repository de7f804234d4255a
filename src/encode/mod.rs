//! Export sinks.
//!
//! Sinks consume a finished [`crate::FrameSequence`] in capture order via [`sink::export_sequence`].

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub(crate) mod ffmpeg;
/// Animated GIF sink.
pub(crate) mod gif;
/// Browsable HTML player sink.
pub(crate) mod html;
/// Single-frame PNG output.
pub(crate) mod png;
/// Generic frame sink trait and built-in sinks.
pub(crate) mod sink;
