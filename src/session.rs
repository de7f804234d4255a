use std::path::PathBuf;

use crate::animate::generator::{FrameSequenceGenerator, GeneratorOpts};
use crate::animate::sequence::{CapturedFrame, FrameSequence};
use crate::assets::decode::ImageOverlay;
use crate::assets::text::FontAsset;
use crate::config::MapConfig;
use crate::encode::sink::{FrameSink, export_sequence};
use crate::foundation::error::VoyageResult;
use crate::geo::boundary::BoundaryLayer;
use crate::geo::projection::Projection;
use crate::render::backend::RenderBackend;
use crate::render::cpu::CpuBackend;
use crate::scene::composer::StaticComposer;
use crate::tracks::load::load_tracks_csv;
use crate::tracks::table::{GroupKey, TrackTable};

/// Input files of a map.
#[derive(Clone, Debug, Default)]
pub struct MapInputs {
    /// Track-point CSV.
    pub tracks: PathBuf,
    /// GeoJSON landmasses.
    pub boundary: Option<PathBuf>,
    /// TTF/OTF font for frame titles.
    pub font: Option<PathBuf>,
}

/// Loaded inputs plus the composer and rendering surface shared by every frame.
///
/// All file IO happens in [`MapSession::open`]; rendering afterwards only fails on malformed rows
/// or rasterizer errors.
pub struct MapSession {
    cfg: MapConfig,
    table: TrackTable,
    composer: StaticComposer,
    backend: CpuBackend,
}

impl MapSession {
    /// Load every input named by `inputs` and `cfg`.
    #[tracing::instrument(skip(cfg))]
    pub fn open(cfg: MapConfig, inputs: &MapInputs) -> VoyageResult<Self> {
        cfg.validate()?;
        let table = load_tracks_csv(&inputs.tracks)?;
        let boundary = match &inputs.boundary {
            Some(p) => BoundaryLayer::from_geojson_path(p)?,
            None => BoundaryLayer::default(),
        };
        let overlays = cfg
            .overlays
            .iter()
            .map(|o| ImageOverlay::load(&o.path, o.bounds, o.opacity))
            .collect::<VoyageResult<Vec<_>>>()?;
        let font = inputs.font.as_deref().map(FontAsset::load).transpose()?;

        tracing::info!(
            rows = table.len(),
            polygons = boundary.polygons().len(),
            overlays = overlays.len(),
            font = font.is_some(),
            "inputs loaded"
        );
        Self::from_parts(cfg, table, &boundary, overlays, font)
    }

    /// Build a session from already-loaded inputs.
    pub fn from_parts(
        cfg: MapConfig,
        table: TrackTable,
        boundary: &BoundaryLayer,
        overlays: Vec<ImageOverlay>,
        font: Option<FontAsset>,
    ) -> VoyageResult<Self> {
        cfg.validate()?;
        let viewport = cfg.resolve_viewport(&table, boundary);
        let projection = Projection::fit(viewport, cfg.canvas, cfg.margin_px)?;
        tracing::debug!(?viewport, scale = projection.scale(), "fitted projection");

        let composer = StaticComposer::new(projection, cfg.style.clone(), boundary, overlays)?;
        Ok(Self {
            cfg,
            table,
            composer,
            backend: CpuBackend::new(font),
        })
    }

    /// Effective configuration.
    pub fn config(&self) -> &MapConfig {
        &self.cfg
    }

    /// The loaded track table.
    pub fn table(&self) -> &TrackTable {
        &self.table
    }

    /// The scene composer.
    pub fn composer(&self) -> &StaticComposer {
        &self.composer
    }

    /// Generator options derived from the configuration.
    pub fn generator_opts(&self) -> VoyageResult<GeneratorOpts> {
        let keys = self
            .cfg
            .keys
            .as_ref()
            .map(|ks| {
                ks.iter()
                    .map(|k| GroupKey::parse(self.cfg.group_by, k))
                    .collect::<VoyageResult<Vec<_>>>()
            })
            .transpose()?;
        Ok(GeneratorOpts {
            group_by: self.cfg.group_by,
            order: self.cfg.order,
            policy: self.cfg.failure_policy,
            keys,
        })
    }

    /// Capture one frame per grouping value.
    pub fn render_all(&mut self) -> VoyageResult<FrameSequence> {
        let mut generator = FrameSequenceGenerator::new(self.generator_opts()?);
        generator.run(&self.table, &self.composer, &mut self.backend)?;
        Ok(generator.into_sequence())
    }

    /// Capture the single frame for `key`.
    pub fn render_key(&mut self, key: &GroupKey) -> VoyageResult<CapturedFrame> {
        let view = self.table.filter(self.cfg.group_by, key)?;
        let title = self.composer.title_for(&key.to_string());
        let scene = self.composer.compose(&view, &title)?;
        let frame = self.backend.render_scene(&scene)?;
        Ok(CapturedFrame {
            index: 0,
            key: key.clone(),
            title,
            stats: scene.stats(),
            frame,
        })
    }

    /// Write `seq` to `sink` at the configured fps.
    pub fn export(&self, seq: &FrameSequence, sink: &mut dyn FrameSink) -> VoyageResult<()> {
        export_sequence(seq, self.cfg.fps, sink)
    }
}
