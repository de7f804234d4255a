//! voyagemap renders historical shipping-route maps and animates them one frame per year.
//!
//! The public API follows the pipeline stages:
//!
//! - Load a [`TrackTable`] (CSV), a [`BoundaryLayer`] (GeoJSON) and [`ImageOverlay`]s
//! - Build a [`StaticComposer`] that turns a filtered [`TrackView`] into a [`Scene`]
//! - Capture a [`FrameSequence`] with a [`FrameSequenceGenerator`] on a [`CpuBackend`]
//! - Export it through a [`FrameSink`] ([`HtmlSink`], [`GifSink`], [`FfmpegSink`])
//!
//! [`MapSession`] wires these together from a [`MapConfig`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod animate;
mod assets;
mod config;
mod encode;
mod foundation;
mod geo;
mod render;
mod scene;
mod session;
mod tracks;

pub use crate::foundation::color::Rgba8;
pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, GeoBounds, GeoPoint, Point, Rect, Rgba8Premul,
};
pub use crate::foundation::error::{VoyageError, VoyageResult};

pub use crate::tracks::load::{load_tracks_csv, load_tracks_reader};
pub use crate::tracks::point::{Cell, TrackPoint};
pub use crate::tracks::table::{GroupBy, GroupKey, KeyOrder, TrackTable, TrackView};

pub use crate::geo::boundary::{BoundaryLayer, Polygon};
pub use crate::geo::projection::Projection;

pub use crate::assets::decode::{ImageOverlay, PreparedImage, decode_image};
pub use crate::assets::text::FontAsset;

pub use crate::scene::composer::StaticComposer;
pub use crate::scene::layer::{Layer, RouteSegment, Scene, SceneStats};
pub use crate::scene::style::{MIN_GRATICULE_STEP_DEG, MapStyle};

pub use crate::render::backend::{FrameRGBA, RenderBackend};
pub use crate::render::cpu::CpuBackend;

pub use crate::animate::generator::{
    FailurePolicy, FrameSequenceGenerator, GeneratorOpts, GeneratorState,
};
pub use crate::animate::sequence::{CapturedFrame, FrameSequence, SkippedFrame};

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::gif::GifSink;
pub use crate::encode::html::{HtmlManifest, HtmlSink, HtmlSinkOpts, ManifestFrame};
pub use crate::encode::png::{encode_png, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig, export_sequence};

pub use crate::config::{MapConfig, OverlaySpec, default_viewport};
pub use crate::session::{MapInputs, MapSession};
