use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
    time::Duration,
};

use anyhow::Context;

use crate::foundation::error::{PostreelError, PostreelResult};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
/// Background bitmap resized to the image block, as opaque premultiplied RGBA8.
pub struct BackgroundImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl BackgroundImage {
    /// Single-color image, mostly useful for previews and tests.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        Self {
            width,
            height,
            rgba8_premul: Arc::new(data),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Where a post's background image comes from.
pub enum ImageSource {
    /// Fetched over http(s).
    Url(String),
    /// Read from disk.
    Path(PathBuf),
}

impl ImageSource {
    /// Classify a post's `image` field. Relative paths resolve against `base_dir`.
    pub fn parse(raw: &str, base_dir: &Path) -> PostreelResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PostreelError::input("image reference must be non-empty"));
        }
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Url(raw.to_string()));
        }
        let path = Path::new(raw);
        if path.is_absolute() {
            Ok(Self::Path(path.to_path_buf()))
        } else {
            Ok(Self::Path(base_dir.join(path)))
        }
    }

    /// Read the encoded image bytes.
    #[tracing::instrument(level = "debug")]
    pub fn fetch(&self) -> PostreelResult<Vec<u8>> {
        match self {
            Self::Url(url) => fetch_url(url),
            Self::Path(path) => std::fs::read(path)
                .with_context(|| format!("read image '{}'", path.display()))
                .map_err(PostreelError::from),
        }
    }
}

/// Process-wide HTTP client, so every download shares one connection pool.
fn http_client() -> PostreelResult<&'static reqwest::blocking::Client> {
    static CLIENT: OnceLock<reqwest::blocking::Client> = OnceLock::new();
    if let Some(client) = CLIENT.get() {
        return Ok(client);
    }
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("build http client")?;
    Ok(CLIENT.get_or_init(|| client))
}

fn fetch_url(url: &str) -> PostreelResult<Vec<u8>> {
    let resp = http_client()?
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| PostreelError::input(format!("failed to download image '{url}': {e}")))?;
    let bytes = resp
        .bytes()
        .map_err(|e| PostreelError::input(format!("failed to download image '{url}': {e}")))?;
    Ok(bytes.to_vec())
}

/// Decode image bytes and resize them to exactly `width` x `height`.
///
/// Alpha is dropped: the result is opaque, like a pasted RGB photo.
pub fn decode_background(bytes: &[u8], width: u32, height: u32) -> PostreelResult<BackgroundImage> {
    if width == 0 || height == 0 {
        return Err(PostreelError::validation(
            "background width/height must be > 0",
        ));
    }

    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgb = dyn_img.to_rgb8();
    let resized = if rgb.dimensions() == (width, height) {
        rgb
    } else {
        image::imageops::resize(&rgb, width, height, image::imageops::FilterType::CatmullRom)
    };

    let mut rgba8_premul = Vec::with_capacity(width as usize * height as usize * 4);
    for px in resized.pixels() {
        rgba8_premul.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }

    Ok(BackgroundImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Fetch, decode and resize a post's background image.
pub fn load_background(
    source: &ImageSource,
    width: u32,
    height: u32,
) -> PostreelResult<BackgroundImage> {
    let bytes = source.fetch()?;
    decode_background(&bytes, width, height)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/background.rs"]
mod tests;
