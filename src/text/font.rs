use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};

use anyhow::Context;

use crate::foundation::error::{PostreelError, PostreelResult};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// Vertical font metrics in pixels at a given size.
pub struct FontMetrics {
    /// Distance from the top of the line box to the baseline.
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f32,
}

impl FontMetrics {
    /// Height of one line box (`ascent + descent`).
    pub fn line_height(self) -> f32 {
        self.ascent + self.descent
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// A font resolved at one pixel size.
///
/// Handles are immutable once resolved, so they are cached per size in [`FontLibrary`] and
/// shared across renders.
pub struct FontHandle {
    /// Font size in pixels.
    pub size_px: u32,
    /// Vertical metrics at `size_px`.
    pub metrics: FontMetrics,
}

/// One font file plus a read-through cache of its resolved sizes.
///
/// `FontLibrary` is `Send + Sync`; concurrent renders share it by reference. Shaping state is
/// not kept here but in the per-render [`Typesetter`](crate::Typesetter).
pub struct FontLibrary {
    family: String,
    font_bytes: Arc<Vec<u8>>,
    shaping_blob: parley::fontique::Blob<u8>,
    draw_font: vello_cpu::peniko::FontData,
    handles: RwLock<HashMap<u32, FontHandle>>,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("family", &self.family)
            .field("font_bytes_len", &self.font_bytes.len())
            .field("cached_sizes", &self.cached_sizes())
            .finish()
    }
}

impl FontLibrary {
    /// Load a font file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> PostreelResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))
            .map_err(|e| PostreelError::configuration(format!("{e:#}")))?;
        Self::from_bytes(bytes)
    }

    /// Build a library from raw TrueType/OpenType bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> PostreelResult<Self> {
        let shaping_blob = parley::fontique::Blob::from(bytes.clone());
        let family = {
            let mut font_ctx = parley::FontContext::default();
            register_family(&mut font_ctx, shaping_blob.clone())?
        };
        let draw_font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes.clone()), 0);

        Ok(Self {
            family,
            font_bytes: Arc::new(bytes),
            shaping_blob,
            draw_font,
            handles: RwLock::new(HashMap::new()),
        })
    }

    /// Primary family name detected in the font data.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Raw font bytes.
    pub fn font_bytes(&self) -> &[u8] {
        self.font_bytes.as_slice()
    }

    /// Previously resolved handle for `size_px`, if any.
    pub fn cached(&self, size_px: u32) -> Option<FontHandle> {
        self.handles
            .read()
            .ok()
            .and_then(|map| map.get(&size_px).copied())
    }

    /// Sizes resolved so far, ascending.
    pub fn cached_sizes(&self) -> Vec<u32> {
        let mut sizes = self
            .handles
            .read()
            .map(|map| map.keys().copied().collect::<Vec<_>>())
            .unwrap_or_default();
        sizes.sort_unstable();
        sizes
    }

    pub(crate) fn insert(&self, handle: FontHandle) -> PostreelResult<FontHandle> {
        let mut map = self
            .handles
            .write()
            .map_err(|_| PostreelError::configuration("font handle cache lock poisoned"))?;
        // First writer wins so every render sees the same metrics for a size.
        Ok(*map.entry(handle.size_px).or_insert(handle))
    }

    pub(crate) fn shaping_blob(&self) -> parley::fontique::Blob<u8> {
        self.shaping_blob.clone()
    }

    pub(crate) fn draw_font(&self) -> &vello_cpu::peniko::FontData {
        &self.draw_font
    }
}

pub(crate) fn register_family(
    font_ctx: &mut parley::FontContext,
    blob: parley::fontique::Blob<u8>,
) -> PostreelResult<String> {
    let families = font_ctx.collection.register_fonts(blob, None);
    let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
        PostreelError::configuration("no font families registered from font bytes")
    })?;

    font_ctx
        .collection
        .family_name(family_id)
        .map(str::to_string)
        .ok_or_else(|| PostreelError::configuration("registered font family has no name"))
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
