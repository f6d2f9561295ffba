use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use sha2::Digest as _;

use postreel::{
    BatchThreading, FontLibrary, FrameRGBA, IdentityFilter, LayoutConfig, Post, PostreelResult,
    VideoConfig,
};

#[derive(Parser, Debug)]
#[command(name = "postreel", version)]
struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every post as a PNG frame.
    Frame(FrameArgs),
    /// Render every post as a still MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Posts JSON: an array of {title, content, post_id, image} objects.
    #[arg(long)]
    json: PathBuf,

    /// TrueType/OpenType font used for all text.
    #[arg(long)]
    font: PathBuf,

    /// Layout configuration JSON. Missing fields use the defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render posts concurrently.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,

    /// Print the font family name and the SHA-256 of the font bytes.
    #[arg(long)]
    dump_fonts: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    batch: BatchArgs,

    /// Directory receiving `<post_id>.png`.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    batch: BatchArgs,

    /// Directory receiving `<post_id>.mp4`.
    #[arg(long)]
    video_output: PathBuf,

    /// Clip length in seconds.
    #[arg(long, default_value_t = 60)]
    duration: u32,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Also write each composited frame as `<post_id>.png` here.
    #[arg(long)]
    keep_frames: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    run_batch(&args.batch, |post, assets_dir, config, fonts| {
        let rendered = postreel::fetch_and_render(post, assets_dir, config, fonts)?;
        let out = args.out_dir.join(format!("{}.png", post.file_stem()));
        write_png(&rendered.frame, &out)?;
        eprintln!("wrote {}", out.display());
        Ok(())
    })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let video = VideoConfig {
        duration_s: args.duration,
        fps: args.fps,
    };
    video.validate()?;
    if !postreel::is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for `render`, but was not found on PATH");
    }
    std::fs::create_dir_all(&args.video_output)
        .with_context(|| format!("create output dir '{}'", args.video_output.display()))?;
    if let Some(dir) = &args.keep_frames {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create frames dir '{}'", dir.display()))?;
    }

    run_batch(&args.batch, |post, assets_dir, config, fonts| {
        let rendered = postreel::fetch_and_render(post, assets_dir, config, fonts)?;
        let stem = post.file_stem();
        if let Some(dir) = &args.keep_frames {
            write_png(&rendered.frame, &dir.join(format!("{stem}.png")))?;
        }
        let out = args.video_output.join(format!("{stem}.mp4"));
        postreel::write_still_video(&rendered.frame, &out, &video, true)?;
        eprintln!("wrote {}", out.display());
        Ok(())
    })
}

/// Load inputs, run `job` for every valid post and report `processed N/M posts`.
///
/// Fails only when the inputs are unusable or no post succeeded.
fn run_batch<F>(args: &BatchArgs, job: F) -> anyhow::Result<()>
where
    F: Fn(&Post, &Path, &LayoutConfig, &FontLibrary) -> PostreelResult<()> + Sync,
{
    let fonts = FontLibrary::from_path(&args.font)?;
    if args.dump_fonts {
        eprintln!("font diagnostics:");
        eprintln!("  source:  {}", args.font.display());
        eprintln!("  family:  {}", fonts.family());
        eprintln!("  sha256:  {}", sha256_hex(fonts.font_bytes()));
    }

    let config = match &args.config {
        Some(path) => LayoutConfig::from_path(path)?,
        None => LayoutConfig::default(),
    };
    config.validate()?;

    let records = postreel::load_posts(&args.json, &IdentityFilter)?;
    let total = records.len();
    if total == 0 {
        println!("processed 0/0 posts");
        anyhow::bail!("'{}' contains no posts", args.json.display());
    }

    let mut posts = Vec::with_capacity(total);
    for record in records {
        match record {
            Ok(post) => posts.push(post),
            Err(e) => eprintln!("skipping: {e}"),
        }
    }

    let assets_dir = args.json.parent().unwrap_or_else(|| Path::new("."));
    let threading = BatchThreading {
        parallel: args.parallel,
        threads: args.threads,
    };
    let results = postreel::process_batch(&posts, threading, |post| {
        job(post, assets_dir, &config, &fonts)
    })?;

    let mut ok = 0usize;
    for (post, result) in posts.iter().zip(&results) {
        match result {
            Ok(()) => ok += 1,
            Err(e) => eprintln!("post {}: {e}", post.post_id),
        }
    }

    println!("processed {ok}/{total} posts");
    if ok == 0 {
        anyhow::bail!("no post was processed successfully");
    }
    Ok(())
}

fn write_png(frame: &FrameRGBA, out: &Path) -> PostreelResult<()> {
    image::save_buffer_with_format(
        out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
