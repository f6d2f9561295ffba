use std::borrow::Cow;

use crate::{
    foundation::error::{PostreelError, PostreelResult},
    text::font::{FontHandle, FontLibrary, FontMetrics, register_family},
};

/// Text measurement capability consumed by the wrapper, estimator and layout engine.
pub trait TextMeasurer {
    /// Resolve a font at `size_px`.
    ///
    /// Fails with [`PostreelError::Configuration`] when the size cannot be resolved.
    fn font(&mut self, size_px: u32) -> PostreelResult<FontHandle>;

    /// Rendered advance width of `text` as a single line.
    fn line_width(&mut self, font: &FontHandle, text: &str) -> f32;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

const METRICS_PROBE: &str = "Hg";

/// Parley-backed [`TextMeasurer`] that owns the shaping contexts for one render.
///
/// Resolved sizes are read from and written to the shared [`FontLibrary`] cache.
pub struct Typesetter<'a> {
    library: &'a FontLibrary,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family: String,
}

impl<'a> Typesetter<'a> {
    /// Register the library's font in fresh shaping contexts.
    pub fn new(library: &'a FontLibrary) -> PostreelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let family = register_family(&mut font_ctx, library.shaping_blob())?;
        Ok(Self {
            library,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
        })
    }

    /// Font library backing this typesetter.
    pub fn library(&self) -> &'a FontLibrary {
        self.library
    }

    /// Shape `text` as one unbroken line.
    pub fn shape_line(
        &mut self,
        size_px: u32,
        text: &str,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px as f32));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    fn probe_metrics(&mut self, size_px: u32) -> PostreelResult<FontMetrics> {
        let layout = self.shape_line(size_px, METRICS_PROBE, TextBrushRgba8::default());
        let line = layout.lines().next().ok_or_else(|| {
            PostreelError::configuration(format!("font size {size_px} produced no line metrics"))
        })?;
        let m = line.metrics();
        if !(m.ascent.is_finite() && m.descent.is_finite()) {
            return Err(PostreelError::configuration(format!(
                "font size {size_px} produced non-finite metrics"
            )));
        }
        Ok(FontMetrics {
            ascent: m.ascent,
            descent: m.descent,
        })
    }
}

impl TextMeasurer for Typesetter<'_> {
    #[tracing::instrument(level = "trace", skip(self))]
    fn font(&mut self, size_px: u32) -> PostreelResult<FontHandle> {
        if size_px == 0 {
            return Err(PostreelError::configuration("invalid font size 0"));
        }
        if let Some(handle) = self.library.cached(size_px) {
            return Ok(handle);
        }

        let metrics = self.probe_metrics(size_px)?;
        self.library.insert(FontHandle { size_px, metrics })
    }

    fn line_width(&mut self, font: &FontHandle, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        self.shape_line(font.size_px, text, TextBrushRgba8::default())
            .width()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/measure.rs"]
mod tests;
