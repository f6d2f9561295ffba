use crate::{
    foundation::error::PostreelResult,
    layout::config::FontSizeRange,
    text::{font::FontHandle, measure::TextMeasurer, wrap::wrap_text},
};

/// Hard ceiling on height estimates per [`find_optimal_size`] call.
pub const MAX_FIT_PROBES: u32 = 10;

#[derive(Clone, Debug, PartialEq)]
/// Lines of one text block wrapped at a single font size.
pub struct WrappedBlock {
    /// Wrapped lines in reading order.
    pub lines: Vec<String>,
    /// Font the lines were wrapped with.
    pub font: FontHandle,
    /// Estimated block height in pixels.
    pub height: f32,
}

/// Wrap `text` at `size_px` and estimate the resulting block height.
///
/// `height = n * line_height + (n - 1) * line_height * line_spacing_ratio`, or `0` for no lines.
pub fn wrap_block<M: TextMeasurer + ?Sized>(
    text: &str,
    size_px: u32,
    max_width: f32,
    line_spacing_ratio: f32,
    measurer: &mut M,
) -> PostreelResult<WrappedBlock> {
    let font = measurer.font(size_px)?;
    let lines = wrap_text(text, &font, max_width, measurer);
    let height = block_height(lines.len(), font.metrics.line_height(), line_spacing_ratio);
    Ok(WrappedBlock {
        lines,
        font,
        height,
    })
}

/// Estimated pixel height of `text` wrapped to `max_width` at `size_px`.
pub fn estimate_height<M: TextMeasurer + ?Sized>(
    text: &str,
    size_px: u32,
    max_width: f32,
    line_spacing_ratio: f32,
    measurer: &mut M,
) -> PostreelResult<f32> {
    wrap_block(text, size_px, max_width, line_spacing_ratio, measurer).map(|b| b.height)
}

fn block_height(line_count: usize, line_height: f32, line_spacing_ratio: f32) -> f32 {
    if line_count == 0 {
        return 0.0;
    }
    let n = line_count as f32;
    n * line_height + (n - 1.0) * line_height * line_spacing_ratio
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Outcome of [`find_optimal_size`].
pub struct SizeFit {
    /// Chosen font size; always inside the searched range.
    pub size_px: u32,
    /// Whether some probed size fit the height budget.
    pub fits: bool,
    /// Number of height estimates performed.
    pub probes: u32,
}

/// Largest font size in `range` whose estimated height fits `max_height`.
///
/// Binary search with at most `max_probes` estimates, never more than [`MAX_FIT_PROBES`].
/// Height is treated as monotonic in size, which wrapping does not strictly guarantee. When no
/// probed size fits, the range minimum is returned with `fits == false`; the caller decides how
/// to surface the overflow.
pub fn find_optimal_size<M: TextMeasurer + ?Sized>(
    text: &str,
    max_width: f32,
    max_height: f32,
    range: FontSizeRange,
    line_spacing_ratio: f32,
    max_probes: u32,
    measurer: &mut M,
) -> PostreelResult<SizeFit> {
    range.validate()?;
    let max_probes = max_probes.min(MAX_FIT_PROBES);

    let mut low = i64::from(range.min);
    let mut high = i64::from(range.max);
    let mut best = None;
    let mut probes = 0u32;

    while probes < max_probes && low <= high {
        let mid = (low + high) / 2;
        // `mid` lies in [range.min, range.max], so it fits in u32.
        let size = mid as u32;
        let height = estimate_height(text, size, max_width, line_spacing_ratio, measurer)?;
        probes += 1;
        tracing::debug!(size, height, max_height, "body font size probe");

        if height <= max_height {
            best = Some(size);
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }

    Ok(SizeFit {
        size_px: best.unwrap_or(range.min),
        fits: best.is_some(),
        probes,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
