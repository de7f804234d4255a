use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use parley::style::{FontStack, StyleProperty};

use crate::foundation::error::{VoyageError, VoyageResult};

/// Straight RGBA8 brush carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Raw font bytes (TTF/OTF) used for frame titles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontAsset {
    /// Font file contents.
    pub bytes: Arc<Vec<u8>>,
}

impl FontAsset {
    /// Read a font file from disk.
    pub fn load(path: &Path) -> VoyageResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            VoyageError::load(format!("failed to read font '{}': {e}", path.display()))
        })?;
        if bytes.is_empty() {
            return Err(VoyageError::load(format!("font '{}' is empty", path.display())));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
        })
    }
}

/// Lays out single-line titles in one registered font family.
pub(crate) struct TitleTypesetter {
    fonts: parley::FontContext,
    layouts: parley::LayoutContext<TextBrushRgba8>,
    family: String,
    /// The same bytes as handed to the rasterizer for glyph runs.
    pub(crate) font_data: vello_cpu::peniko::FontData,
}

impl TitleTypesetter {
    /// Register `font` and remember its first family.
    pub(crate) fn new(font: &FontAsset) -> VoyageResult<Self> {
        let mut fonts = parley::FontContext::default();
        let registered = fonts
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes.as_ref().clone()), None);
        let (family_id, _) = registered
            .first()
            .ok_or_else(|| VoyageError::load("font bytes contain no usable family"))?;
        let family = fonts
            .collection
            .family_name(*family_id)
            .ok_or_else(|| VoyageError::load("font family has no name"))?
            .to_string();
        tracing::debug!(%family, "registered title font");

        let font_data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
            0,
        );
        Ok(Self {
            fonts,
            layouts: parley::LayoutContext::new(),
            family,
            font_data,
        })
    }

    /// Shape `text` on a single unbroken line.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> VoyageResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(VoyageError::validation(format!(
                "title size must be finite and > 0, got {size_px}"
            )));
        }

        let mut builder = self
            .layouts
            .ranged_builder(&mut self.fonts, text, 1.0, true);
        builder.push_default(StyleProperty::FontStack(FontStack::Source(Cow::Owned(
            self.family.clone(),
        ))));
        builder.push_default(StyleProperty::FontSize(size_px));
        builder.push_default(StyleProperty::Brush(brush));

        let mut layout = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}
