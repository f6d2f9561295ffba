use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::{
        core::{Canvas, Rgba8},
        error::{PostreelError, PostreelResult},
    },
    layout::fit::MAX_FIT_PROBES,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Immutable layout configuration for one render.
///
/// Every layout/render entry point takes this by reference; there is no global state.
/// Missing fields in JSON fall back to [`LayoutConfig::default`].
pub struct LayoutConfig {
    /// Output canvas dimensions.
    pub canvas: Canvas,
    /// Background image block.
    pub image: ImageBlock,
    /// Vertical gaps between blocks.
    pub gaps: BlockGaps,
    /// Fixed title font size in pixels.
    pub title_font_size: u32,
    /// Extra spacing after each title line in pixels.
    pub title_line_spacing_px: f32,
    /// Fixed identifier font size in pixels.
    pub identifier_font_size: u32,
    /// Allowed body font sizes.
    pub content_font_size: FontSizeRange,
    /// Maximum width of any text line in pixels.
    pub max_content_width: f32,
    /// Body inter-line spacing as a fraction of line height (estimation) or font size (drawing).
    pub content_line_spacing_ratio: f32,
    /// Upper bound on body font-size probes, at most [`MAX_FIT_PROBES`].
    pub fit_max_probes: u32,
    /// Canvas fill color. Must be opaque.
    pub background: Rgba8,
    /// Color of all text blocks.
    pub text_color: Rgba8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Size and placement of the background image block.
pub struct ImageBlock {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Distance from the canvas top in pixels.
    pub top_margin: u32,
}

impl Default for ImageBlock {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 400,
            top_margin: 30,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Vertical gaps between consecutive blocks, in pixels.
pub struct BlockGaps {
    /// Between the image bottom and the first title line.
    pub image_title: f32,
    /// Between the title block and the body block.
    pub title_content: f32,
    /// Between the body block and the identifier line.
    pub content_identifier: f32,
}

impl Default for BlockGaps {
    fn default() -> Self {
        Self {
            image_title: 40.0,
            title_content: 15.0,
            content_identifier: 15.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Inclusive integer font-size range.
pub struct FontSizeRange {
    /// Smallest allowed size.
    pub min: u32,
    /// Largest allowed size.
    pub max: u32,
}

impl FontSizeRange {
    /// Build a range, rejecting `min > max` and zero sizes.
    pub fn new(min: u32, max: u32) -> PostreelResult<Self> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Check that the range is non-empty and excludes zero.
    pub fn validate(self) -> PostreelResult<()> {
        if self.min == 0 {
            return Err(PostreelError::validation("font size range min must be > 0"));
        }
        if self.min > self.max {
            return Err(PostreelError::validation(format!(
                "font size range min ({}) must be <= max ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Whether `size` lies in the range.
    pub fn contains(self, size: u32) -> bool {
        self.min <= size && size <= self.max
    }
}

impl Default for FontSizeRange {
    fn default() -> Self {
        Self { min: 20, max: 40 }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1080,
                height: 1920,
            },
            image: ImageBlock::default(),
            gaps: BlockGaps::default(),
            title_font_size: 50,
            title_line_spacing_px: 10.0,
            identifier_font_size: 35,
            content_font_size: FontSizeRange::default(),
            max_content_width: 980.0,
            content_line_spacing_ratio: 0.2,
            fit_max_probes: 10,
            background: Rgba8::BLACK,
            text_color: Rgba8::WHITE,
        }
    }
}

impl LayoutConfig {
    /// Read a JSON config file. Missing fields use defaults.
    pub fn from_path(path: impl AsRef<Path>) -> PostreelResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read layout config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&s).map_err(|e| {
            PostreelError::serde(format!("parse layout config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations no layout could honor.
    pub fn validate(&self) -> PostreelResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(PostreelError::validation("canvas width/height must be > 0"));
        }
        if self.image.width == 0 || self.image.height == 0 {
            return Err(PostreelError::validation(
                "image block width/height must be > 0",
            ));
        }
        if self.image.width > self.canvas.width
            || self.image.top_margin.saturating_add(self.image.height) > self.canvas.height
        {
            return Err(PostreelError::validation(
                "image block must fit inside the canvas",
            ));
        }
        if self.title_font_size == 0 || self.identifier_font_size == 0 {
            return Err(PostreelError::validation(
                "title/identifier font sizes must be > 0",
            ));
        }
        self.content_font_size.validate()?;
        if self.fit_max_probes == 0 || self.fit_max_probes > MAX_FIT_PROBES {
            return Err(PostreelError::validation(format!(
                "fit_max_probes must be in 1..={MAX_FIT_PROBES}, got {}",
                self.fit_max_probes
            )));
        }
        for (name, value) in [
            ("gaps.image_title", self.gaps.image_title),
            ("gaps.title_content", self.gaps.title_content),
            ("gaps.content_identifier", self.gaps.content_identifier),
            ("title_line_spacing_px", self.title_line_spacing_px),
            ("content_line_spacing_ratio", self.content_line_spacing_ratio),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PostreelError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if self.background.a != 255 {
            return Err(PostreelError::validation("background color must be opaque"));
        }
        if !self.max_content_width.is_finite() || self.max_content_width <= 0.0 {
            return Err(PostreelError::validation(
                "max_content_width must be finite and > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/config.rs"]
mod tests;
