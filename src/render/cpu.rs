use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape as _;

use crate::assets::decode::ImageOverlay;
use crate::assets::text::{FontAsset, TextBrushRgba8, TitleTypesetter};
use crate::foundation::color::Rgba8;
use crate::foundation::core::{Affine, BezPath, GeoPoint, Point, Rect};
use crate::foundation::error::{VoyageError, VoyageResult};
use crate::geo::projection::Projection;
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::scene::layer::{Layer, RouteSegment, Scene};
use crate::scene::style::MIN_GRATICULE_STEP_DEG;

const TITLE_INSET_PX: f64 = 12.0;

/// Software rasterizer built on `vello_cpu`.
///
/// The render context, decoded overlay pixmaps and the title font survive between frames.
pub struct CpuBackend {
    ctx: Option<vello_cpu::RenderContext>,
    font: Option<FontAsset>,
    titles: Option<TitleTypesetter>,
    image_cache: HashMap<usize, (Arc<ImageOverlay>, vello_cpu::Image)>,
}

impl CpuBackend {
    /// Create a backend; titles are only drawn when `font` is given.
    pub fn new(font: Option<FontAsset>) -> Self {
        Self {
            ctx: None,
            font,
            titles: None,
            image_cache: HashMap::new(),
        }
    }

    /// Whether frame titles are rasterized.
    pub fn draws_titles(&self) -> bool {
        self.font.is_some()
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> VoyageResult<R>,
    ) -> VoyageResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn image_paint_for(&mut self, overlay: &Arc<ImageOverlay>) -> VoyageResult<vello_cpu::Image> {
        let key = Arc::as_ptr(overlay) as usize;
        if let Some((_, paint)) = self.image_cache.get(&key) {
            return Ok(paint.clone());
        }

        let img = &overlay.image;
        let pixmap =
            image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache
            .insert(key, (Arc::clone(overlay), paint.clone()));
        Ok(paint)
    }

    fn draw_title(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        origin: Point,
        text: &str,
        color: Rgba8,
        size_px: f32,
    ) -> VoyageResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let Some(font) = &self.font else {
            return Ok(());
        };
        let titles = match &mut self.titles {
            Some(t) => t,
            slot => slot.insert(TitleTypesetter::new(font)?),
        };

        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        let layout = titles.layout(text, size_px, brush)?;

        ctx.set_transform(affine_to_cpu(Affine::translate((origin.x, origin.y))));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&titles.font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn draw_layer(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        projection: &Projection,
        layer: &Layer,
    ) -> VoyageResult<()> {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match layer {
            Layer::Panel { fill } => {
                set_color(ctx, *fill);
                ctx.fill_rect(&rect_to_cpu(projection.plot_rect()));
            }
            Layer::Graticule {
                step_deg,
                color,
                width_px,
            } => {
                let grid = graticule_path(projection, *step_deg);
                set_color(ctx, *color);
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width_px));
                ctx.stroke_path(&bezpath_to_cpu(&grid));
            }
            Layer::Land {
                paths,
                fill,
                stroke,
                stroke_px,
            } => {
                let to_px = projection.to_affine();
                let projected: Vec<_> = paths
                    .iter()
                    .map(|p| bezpath_to_cpu(&(to_px * p.clone())))
                    .collect();

                set_color(ctx, *fill);
                for p in &projected {
                    ctx.fill_path(p);
                }
                if *stroke_px > 0.0 {
                    set_color(ctx, *stroke);
                    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*stroke_px));
                    for p in &projected {
                        ctx.stroke_path(p);
                    }
                }
            }
            Layer::Routes {
                segments,
                width_px,
                opacity,
            } => {
                if segments.is_empty() {
                    return Ok(());
                }
                if *opacity < 1.0 {
                    ctx.push_opacity_layer(*opacity);
                }
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width_px));
                for seg in segments {
                    draw_route(ctx, projection, seg, *width_px);
                }
                if *opacity < 1.0 {
                    ctx.pop_layer();
                }
            }
            Layer::Image { overlay } => {
                let paint = self.image_paint_for(overlay)?;
                let (w, h) = (
                    f64::from(overlay.image.width),
                    f64::from(overlay.image.height),
                );
                let dst = projection.rect_for(overlay.bounds);
                let transform = Affine::translate((dst.x0, dst.y0))
                    * Affine::scale_non_uniform(dst.width() / w, dst.height() / h);

                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint(paint);
                if overlay.opacity < 1.0 {
                    ctx.push_opacity_layer(overlay.opacity);
                }
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                if overlay.opacity < 1.0 {
                    ctx.pop_layer();
                }
            }
            Layer::Title {
                text,
                color,
                size_px,
            } => {
                let plot = projection.plot_rect();
                let origin = Point::new(plot.x0 + TITLE_INSET_PX, plot.y0 + TITLE_INSET_PX);
                self.draw_title(ctx, origin, text, *color, *size_px)?;
            }
        }
        Ok(())
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(level = "debug", skip(self, scene), fields(title = %scene.title))]
    fn render_scene(&mut self, scene: &Scene) -> VoyageResult<FrameRGBA> {
        let canvas = scene.canvas();
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| VoyageError::capture("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| VoyageError::capture("canvas height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(VoyageError::capture("canvas width/height must be > 0"));
        }

        self.with_ctx_mut(width, height, |this, ctx| {
            set_color(ctx, scene.clear);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));

            for layer in &scene.layers {
                this.draw_layer(ctx, &scene.projection, layer)
                    .map_err(|e| e.context(format!("{} layer", layer.kind())))?;
            }

            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);

            Ok(FrameRGBA {
                width: canvas.width,
                height: canvas.height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        })
    }
}

fn draw_route(
    ctx: &mut vello_cpu::RenderContext,
    projection: &Projection,
    seg: &RouteSegment,
    width_px: f64,
) {
    set_color(ctx, seg.color);
    match seg.points.as_slice() {
        [] => {}
        [only] => {
            let c = projection.project(*only);
            let dot = kurbo::Circle::new(c, (width_px / 2.0).max(0.5)).to_path(0.05);
            ctx.fill_path(&bezpath_to_cpu(&dot));
        }
        [first, rest @ ..] => {
            let mut path = BezPath::new();
            path.move_to(projection.project(*first));
            for p in rest {
                path.line_to(projection.project(*p));
            }
            ctx.stroke_path(&bezpath_to_cpu(&path));
        }
    }
}

fn graticule_path(projection: &Projection, step_deg: f64) -> BezPath {
    let mut path = BezPath::new();
    if step_deg.is_nan() || step_deg < MIN_GRATICULE_STEP_DEG {
        return path;
    }
    let plot = projection.plot_rect();
    let vp = projection.viewport();

    for lon in grid_values(vp.min_lon, vp.max_lon, step_deg) {
        let x = projection.project(GeoPoint::new(lon, vp.min_lat)).x;
        path.move_to((x, plot.y0));
        path.line_to((x, plot.y1));
    }
    for lat in grid_values(vp.min_lat, vp.max_lat, step_deg) {
        let y = projection.project(GeoPoint::new(vp.min_lon, lat)).y;
        path.move_to((plot.x0, y));
        path.line_to((plot.x1, y));
    }
    path
}

/// Multiples of `step` within `min..=max`, indexed rather than accumulated.
fn grid_values(min: f64, max: f64, step: f64) -> impl Iterator<Item = f64> {
    let start = (min / step).ceil() * step;
    let count = if start <= max {
        ((max - start) / step).floor() as usize + 1
    } else {
        0
    };
    (0..count).map(move |i| start + i as f64 * step)
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> VoyageResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| VoyageError::capture("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| VoyageError::capture("image height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(VoyageError::capture("overlay image is empty"));
    }
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(VoyageError::capture("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
