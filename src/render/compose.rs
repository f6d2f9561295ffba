use std::sync::Arc;

use crate::{
    assets::background::BackgroundImage,
    foundation::{
        core::{FrameRGBA, Rgba8},
        error::{PostreelError, PostreelResult},
    },
    render::plan::{RenderPlan, TextBlock},
    text::measure::{TextBrushRgba8, Typesetter},
};

/// Rasterize `plan` onto a fresh canvas.
///
/// Draw order is background fill, image paste, then title, body and identifier text. The
/// returned frame is premultiplied RGBA8 and fully opaque whenever the background is.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(w = plan.canvas.width, h = plan.canvas.height)
)]
pub fn compose(
    plan: &RenderPlan,
    image: &BackgroundImage,
    typesetter: &mut Typesetter<'_>,
) -> PostreelResult<FrameRGBA> {
    let width: u16 = plan
        .canvas
        .width
        .try_into()
        .map_err(|_| PostreelError::render("canvas width exceeds u16"))?;
    let height: u16 = plan
        .canvas
        .height
        .try_into()
        .map_err(|_| PostreelError::render("canvas height exceeds u16"))?;

    if image.width != plan.image.width || image.height != plan.image.height {
        return Err(PostreelError::render(format!(
            "background is {}x{}, layout expects {}x{}",
            image.width, image.height, plan.image.width, plan.image.height
        )));
    }

    let mut ctx = vello_cpu::RenderContext::new(width, height);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(color_to_cpu(plan.background));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(width),
        f64::from(height),
    ));

    let pixmap = premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)?;
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((
        f64::from(plan.image.x),
        f64::from(plan.image.y),
    )));
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(image.width),
        f64::from(image.height),
    ));

    for block in &plan.blocks {
        draw_block(&mut ctx, block, typesetter);
    }

    ctx.flush();
    let mut target = vello_cpu::Pixmap::new(width, height);
    ctx.render_to_pixmap(&mut target);

    Ok(FrameRGBA {
        width: plan.canvas.width,
        height: plan.canvas.height,
        data: target.data_as_u8_slice().to_vec(),
        premultiplied: true,
    })
}

fn draw_block(
    ctx: &mut vello_cpu::RenderContext,
    block: &TextBlock,
    typesetter: &mut Typesetter<'_>,
) {
    let brush = TextBrushRgba8 {
        r: block.color.r,
        g: block.color.g,
        b: block.color.b,
        a: block.color.a,
    };
    let library = typesetter.library();
    let font = library.draw_font();

    for line in &block.lines {
        if line.text.is_empty() {
            continue;
        }
        let layout = typesetter.shape_line(block.font.size_px, &line.text, brush);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            line.origin.x,
            line.origin.y,
        )));

        for layout_line in layout.lines() {
            for item in layout_line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> PostreelResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PostreelError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PostreelError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(PostreelError::render("background byte length mismatch"));
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
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
