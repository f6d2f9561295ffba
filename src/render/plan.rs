use crate::{
    foundation::core::{Canvas, Point, Rgba8},
    text::font::FontHandle,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Which part of the post a text block carries.
pub enum BlockRole {
    /// Post title, fixed font size.
    Title,
    /// Post body, size chosen by the optimizer.
    Body,
    /// `Post ID: ...` line, fixed font size.
    Identifier,
}

#[derive(Clone, Debug, PartialEq)]
/// One line of text with its top-left draw origin.
pub struct PlacedLine {
    /// Line contents.
    pub text: String,
    /// Top-left corner of the line box on the canvas.
    pub origin: Point,
    /// Measured advance width.
    pub width: f32,
}

#[derive(Clone, Debug, PartialEq)]
/// A positioned, wrapped text block.
pub struct TextBlock {
    /// Block kind.
    pub role: BlockRole,
    /// Font the block is drawn with.
    pub font: FontHandle,
    /// Fill color.
    pub color: Rgba8,
    /// Lines in draw order.
    pub lines: Vec<PlacedLine>,
    /// Cursor position where the block starts.
    pub top: f64,
    /// Cursor position after the block's last line.
    pub bottom: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Where the background bitmap is pasted.
pub struct ImagePlacement {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Body text did not fit its budget even at the minimum font size.
///
/// Not an error: the render proceeds and the body spills downward.
pub struct FitOverflow {
    /// Font size the body was laid out with.
    pub size_px: u32,
    /// Estimated body height at that size.
    pub required_height: f32,
    /// Height that was available.
    pub budget: f32,
}

#[derive(Clone, Debug, PartialEq)]
/// Positioned draw operations for one post: one image paste and three text blocks.
pub struct RenderPlan {
    /// Output canvas.
    pub canvas: Canvas,
    /// Canvas fill color.
    pub background: Rgba8,
    /// Background bitmap placement.
    pub image: ImagePlacement,
    /// Title, body and identifier, in that order.
    pub blocks: Vec<TextBlock>,
    /// Height that was reserved for the body.
    pub body_budget: f32,
    /// Set when the body overflows `body_budget`.
    pub overflow: Option<FitOverflow>,
}

impl RenderPlan {
    /// First block with the given role.
    pub fn block(&self, role: BlockRole) -> Option<&TextBlock> {
        self.blocks.iter().find(|b| b.role == role)
    }
}
