use std::path::Path;

use rayon::prelude::*;

use crate::{
    assets::background::{BackgroundImage, ImageSource, load_background},
    foundation::{
        core::FrameRGBA,
        error::{PostreelError, PostreelResult},
    },
    layout::{config::LayoutConfig, engine::layout_post},
    post::model::Post,
    render::{compose::compose, plan::RenderPlan},
    text::{font::FontLibrary, measure::Typesetter},
};

#[derive(Clone, Debug)]
/// A composited post together with the plan it was drawn from.
pub struct RenderedPost {
    /// Identifier of the source post.
    pub post_id: String,
    /// Final canvas.
    pub frame: FrameRGBA,
    /// Positioned blocks, including any fit overflow.
    pub plan: RenderPlan,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// How a batch of posts is scheduled.
pub struct BatchThreading {
    /// Render posts on a rayon pool instead of one after another.
    pub parallel: bool,
    /// Pool size for parallel batches. `None` lets rayon decide.
    pub threads: Option<usize>,
}

/// Lay out and composite one post onto its already-loaded background.
pub fn render_post(
    post: &Post,
    image: &BackgroundImage,
    config: &LayoutConfig,
    fonts: &FontLibrary,
) -> PostreelResult<RenderedPost> {
    config.validate()?;
    let mut typesetter = Typesetter::new(fonts)?;
    let plan = layout_post(post, config, &mut typesetter)?;
    let frame = compose(&plan, image, &mut typesetter)?;
    Ok(RenderedPost {
        post_id: post.post_id.clone(),
        frame,
        plan,
    })
}

/// Load the post's background image, then [`render_post`].
///
/// Relative image paths resolve against `assets_dir`, normally the posts file's directory.
pub fn fetch_and_render(
    post: &Post,
    assets_dir: &Path,
    config: &LayoutConfig,
    fonts: &FontLibrary,
) -> PostreelResult<RenderedPost> {
    let source = ImageSource::parse(&post.image, assets_dir)?;
    let image = load_background(&source, config.image.width, config.image.height)?;
    render_post(post, &image, config, fonts)
}

/// Render every post, fetching backgrounds as needed. One result per post, in input order.
pub fn render_batch(
    posts: &[Post],
    assets_dir: &Path,
    config: &LayoutConfig,
    fonts: &FontLibrary,
    threading: BatchThreading,
) -> PostreelResult<Vec<PostreelResult<RenderedPost>>> {
    config.validate()?;
    process_batch(posts, threading, |post| {
        fetch_and_render(post, assets_dir, config, fonts)
    })
}

/// Run `job` once per post and collect the results in input order.
///
/// A failing post never stops the others. The outer error is reserved for problems with the
/// batch itself, such as an invalid thread count.
#[tracing::instrument(
    level = "info",
    skip_all,
    fields(posts = posts.len(), parallel = threading.parallel)
)]
pub fn process_batch<T, F>(
    posts: &[Post],
    threading: BatchThreading,
    job: F,
) -> PostreelResult<Vec<PostreelResult<T>>>
where
    T: Send,
    F: Fn(&Post) -> PostreelResult<T> + Sync,
{
    let run_one = |post: &Post| {
        let result = job(post);
        if let Err(e) = &result {
            tracing::warn!(post_id = %post.post_id, error = %e, "post failed");
        }
        result
    };

    let results: Vec<PostreelResult<T>> = if threading.parallel {
        let pool = build_thread_pool(threading.threads)?;
        pool.install(|| posts.par_iter().map(run_one).collect())
    } else {
        if threading.threads == Some(0) {
            return Err(PostreelError::validation(
                "batch threading 'threads' must be >= 1 when set",
            ));
        }
        posts.iter().map(run_one).collect()
    };

    let ok = results.iter().filter(|r| r.is_ok()).count();
    tracing::info!(ok, total = results.len(), "batch finished");
    Ok(results)
}

fn build_thread_pool(threads: Option<usize>) -> PostreelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PostreelError::validation(
            "batch threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PostreelError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
