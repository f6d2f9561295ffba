use crate::{
    foundation::{core::Point, error::PostreelResult},
    layout::{
        config::LayoutConfig,
        fit::{WrappedBlock, find_optimal_size, wrap_block},
    },
    post::model::Post,
    render::plan::{BlockRole, FitOverflow, ImagePlacement, PlacedLine, RenderPlan, TextBlock},
    text::measure::TextMeasurer,
};

/// Compute the render plan for one post.
///
/// Blocks stack top to bottom: image, title, body, identifier. The identifier height is
/// reserved before the body is sized, so the body gets
/// `canvas_height - cursor - (identifier_height + gap)` pixels. Body text that does not fit
/// at the minimum size overflows downward and is reported in [`RenderPlan::overflow`].
#[tracing::instrument(skip_all, fields(post_id = %post.post_id))]
pub fn layout_post<M: TextMeasurer + ?Sized>(
    post: &Post,
    config: &LayoutConfig,
    measurer: &mut M,
) -> PostreelResult<RenderPlan> {
    let canvas = config.canvas;
    let image = ImagePlacement {
        x: canvas.width.saturating_sub(config.image.width) / 2,
        y: config.image.top_margin,
        width: config.image.width,
        height: config.image.height,
    };

    let mut cursor = f64::from(config.image.top_margin + config.image.height)
        + f64::from(config.gaps.image_title);

    let title = wrap_block(
        &post.title,
        config.title_font_size,
        config.max_content_width,
        0.0,
        measurer,
    )?;
    let title_block = place_block(
        BlockRole::Title,
        title,
        f64::from(config.title_line_spacing_px),
        cursor,
        config,
        measurer,
    );
    cursor = title_block.bottom + f64::from(config.gaps.title_content);

    let identifier_text = post.identifier_text();
    let identifier_font = measurer.font(config.identifier_font_size)?;
    let reserved = f64::from(identifier_font.metrics.line_height())
        + f64::from(config.gaps.content_identifier);
    let body_budget = (f64::from(canvas.height) - cursor - reserved) as f32;

    let fit = find_optimal_size(
        &post.content,
        config.max_content_width,
        body_budget,
        config.content_font_size,
        config.content_line_spacing_ratio,
        config.fit_max_probes,
        measurer,
    )?;
    let body = wrap_block(
        &post.content,
        fit.size_px,
        config.max_content_width,
        config.content_line_spacing_ratio,
        measurer,
    )?;

    let overflow = (body.height > body_budget).then(|| FitOverflow {
        size_px: fit.size_px,
        required_height: body.height,
        budget: body_budget,
    });
    if let Some(o) = &overflow {
        tracing::warn!(
            size_px = o.size_px,
            required_height = o.required_height,
            budget = o.budget,
            "body text overflows its budget at minimum font size"
        );
    }

    let body_spacing = f64::from(fit.size_px) * f64::from(config.content_line_spacing_ratio);
    let body_block = place_block(BlockRole::Body, body, body_spacing, cursor, config, measurer);
    cursor = body_block.bottom + f64::from(config.gaps.content_identifier);

    let identifier = WrappedBlock {
        lines: vec![identifier_text],
        font: identifier_font,
        height: identifier_font.metrics.line_height(),
    };
    let identifier_block = place_block(
        BlockRole::Identifier,
        identifier,
        0.0,
        cursor,
        config,
        measurer,
    );

    Ok(RenderPlan {
        canvas,
        background: config.background,
        image,
        blocks: vec![title_block, body_block, identifier_block],
        body_budget,
        overflow,
    })
}

fn place_block<M: TextMeasurer + ?Sized>(
    role: BlockRole,
    block: WrappedBlock,
    line_spacing: f64,
    top: f64,
    config: &LayoutConfig,
    measurer: &mut M,
) -> TextBlock {
    let font = block.font;
    let line_height = f64::from(font.metrics.line_height());
    let canvas_width = f64::from(config.canvas.width);

    let mut y = top;
    let mut lines = Vec::with_capacity(block.lines.len());
    for text in block.lines {
        let width = measurer.line_width(&font, &text);
        let x = ((canvas_width - f64::from(width)) / 2.0).floor();
        lines.push(PlacedLine {
            text,
            origin: Point::new(x, y),
            width,
        });
        y += line_height + line_spacing;
    }

    TextBlock {
        role,
        font,
        color: config.text_color,
        lines,
        top,
        bottom: y,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/engine.rs"]
mod tests;
