#![forbid(unsafe_code)]
//! Render social-media posts into vertical still-frame videos.
//!
//! A post's body text is wrapped and sized to fit the space left between its title and its
//! identifier line; the composited canvas is then encoded with the system `ffmpeg`.

pub mod assets;
pub mod encode;
pub mod foundation;
pub mod layout;
pub mod post;
pub mod render;
pub mod text;

pub use assets::background::{BackgroundImage, ImageSource, decode_background, load_background};
pub use encode::ffmpeg::{
    EncodeConfig, FfmpegEncoder, VideoConfig, is_ffmpeg_on_path, write_still_video,
};
pub use foundation::core::{Canvas, FrameRGBA, Point, Rgba8};
pub use foundation::error::{PostreelError, PostreelResult};
pub use layout::config::{BlockGaps, FontSizeRange, ImageBlock, LayoutConfig};
pub use layout::engine::layout_post;
pub use layout::fit::{SizeFit, WrappedBlock, estimate_height, find_optimal_size, wrap_block};
pub use post::model::{IdentityFilter, Post, TextFilter, load_posts, parse_posts};
pub use render::compose::compose;
pub use render::pipeline::{
    BatchThreading, RenderedPost, fetch_and_render, process_batch, render_batch, render_post,
};
pub use render::plan::{BlockRole, FitOverflow, ImagePlacement, PlacedLine, RenderPlan, TextBlock};
pub use text::font::{FontHandle, FontLibrary, FontMetrics};
pub use text::measure::{TextBrushRgba8, TextMeasurer, Typesetter};
pub use text::wrap::wrap_text;
