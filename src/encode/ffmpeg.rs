use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use anyhow::Context as _;

use crate::foundation::{
    core::FrameRGBA,
    error::{PostreelError, PostreelResult},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Length and frame rate of the still video written for each post.
pub struct VideoConfig {
    /// Clip length in seconds.
    pub duration_s: u32,
    /// Frames per second.
    pub fps: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            duration_s: 60,
            fps: 30,
        }
    }
}

impl VideoConfig {
    pub fn validate(&self) -> PostreelResult<()> {
        if self.duration_s == 0 {
            return Err(PostreelError::validation("video duration must be non-zero"));
        }
        if self.fps == 0 {
            return Err(PostreelError::validation("video fps must be non-zero"));
        }
        Ok(())
    }

    /// Number of frames in the clip.
    pub fn frame_count(&self) -> u64 {
        u64::from(self.duration_s) * u64::from(self.fps)
    }
}

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn validate(&self) -> PostreelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PostreelError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(PostreelError::validation("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // yuv420p subsamples chroma 2x2.
            return Err(PostreelError::validation(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> PostreelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Pipes raw RGBA frames into a system `ffmpeg` process producing an H.264 MP4.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    bg_rgba: [u8; 4],
    child: Child,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig, bg_rgba: [u8; 4]) -> PostreelResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(PostreelError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(PostreelError::encode(
                "ffmpeg is required for video output, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-tune",
            "stillimage",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        tracing::debug!(out = %cfg.out_path.display(), "spawning ffmpeg");
        let mut child = cmd.spawn().map_err(|e| {
            PostreelError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PostreelError::encode("failed to open ffmpeg stdin"))?;

        Ok(Self {
            scratch: vec![0u8; cfg.width as usize * cfg.height as usize * 4],
            cfg,
            bg_rgba,
            child,
            stdin: Some(stdin),
        })
    }

    /// Flatten `frame` and write it `repeat` times.
    pub fn encode_frame(&mut self, frame: &FrameRGBA, repeat: u64) -> PostreelResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(PostreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(PostreelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(PostreelError::encode("ffmpeg encoder is already finalized"));
        };
        for _ in 0..repeat {
            stdin.write_all(&self.scratch).map_err(|e| {
                PostreelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
            })?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> PostreelResult<()> {
        drop(self.stdin.take());

        let output = self.child.wait_with_output().map_err(|e| {
            PostreelError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PostreelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Encode a single still frame as a `video.duration_s` long MP4 at `out_path`.
///
/// A partially written file is removed if encoding fails.
#[tracing::instrument(
    level = "info",
    skip(frame, video, out_path),
    fields(out = %out_path.display())
)]
pub fn write_still_video(
    frame: &FrameRGBA,
    out_path: &Path,
    video: &VideoConfig,
    overwrite: bool,
) -> PostreelResult<()> {
    video.validate()?;
    let cfg = EncodeConfig {
        width: frame.width,
        height: frame.height,
        fps: video.fps,
        out_path: out_path.to_path_buf(),
        overwrite,
    };

    let mut encoder = FfmpegEncoder::new(cfg, [0, 0, 0, 255])?;
    let mut guard = PartialOutputGuard(Some(out_path.to_path_buf()));
    let written = encoder.encode_frame(frame, video.frame_count());
    // ffmpeg's own status explains a broken pipe better than the write error does.
    encoder.finish()?;
    written?;
    guard.0 = None;
    Ok(())
}

struct PartialOutputGuard(Option<PathBuf>);

impl Drop for PartialOutputGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> PostreelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PostreelError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let (r, g, b) = if src_is_premul {
            (
                u16::from(s[0]) + mul_div255(bg_r, inv),
                u16::from(s[1]) + mul_div255(bg_g, inv),
                u16::from(s[2]) + mul_div255(bg_b, inv),
            )
        } else {
            (
                mul_div255(u16::from(s[0]), a) + mul_div255(bg_r, inv),
                mul_div255(u16::from(s[1]), a) + mul_div255(bg_g, inv),
                mul_div255(u16::from(s[2]), a) + mul_div255(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
