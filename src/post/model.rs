use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{PostreelError, PostreelResult};

/// Fields every post record must carry.
pub const REQUIRED_FIELDS: [&str; 4] = ["title", "content", "post_id", "image"];

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// One social-media post to render.
pub struct Post {
    /// Headline, drawn at a fixed size under the image.
    pub title: String,
    /// Body text, sized to fit the remaining space.
    pub content: String,
    /// Identifier shown at the bottom and used to name outputs.
    pub post_id: String,
    /// Background image: an http(s) URL or a path relative to the posts file.
    pub image: String,
}

impl Post {
    /// Text of the identifier line.
    pub fn identifier_text(&self) -> String {
        format!("Post ID: {}", self.post_id)
    }

    /// `post_id` reduced to characters that are safe in a file name.
    pub fn file_stem(&self) -> String {
        self.post_id
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Build a post from one JSON record.
    ///
    /// `index` is 0-based; messages report it 1-based. Title and content pass through
    /// `filter` exactly once.
    pub fn from_value(
        index: usize,
        value: &serde_json::Value,
        filter: &dyn TextFilter,
    ) -> PostreelResult<Self> {
        let obj = value.as_object().ok_or_else(|| {
            PostreelError::input(format!("post {} is not a JSON object", index + 1))
        })?;

        for field in REQUIRED_FIELDS {
            if !obj.contains_key(field) {
                return Err(PostreelError::input(format!(
                    "post {} missing required field: {field}",
                    index + 1
                )));
            }
        }

        let text_field = |field: &str| -> PostreelResult<String> {
            match &obj[field] {
                serde_json::Value::String(s) => Ok(s.clone()),
                serde_json::Value::Number(n) if field == "post_id" => Ok(n.to_string()),
                other => Err(PostreelError::input(format!(
                    "post {} field '{field}' must be a string, got {}",
                    index + 1,
                    json_kind(other)
                ))),
            }
        };

        let post_id = text_field("post_id")?;
        if post_id.trim().is_empty() {
            return Err(PostreelError::input(format!(
                "post {} has an empty post_id",
                index + 1
            )));
        }

        Ok(Self {
            title: filter.filter(&text_field("title")?),
            content: filter.filter(&text_field("content")?),
            post_id,
            image: text_field("image")?,
        })
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Text transform applied to title and content when posts are loaded.
pub trait TextFilter: Send + Sync {
    /// Return the transformed text.
    fn filter(&self, text: &str) -> String;
}

#[derive(Clone, Copy, Debug, Default)]
/// [`TextFilter`] that returns its input unchanged.
pub struct IdentityFilter;

impl TextFilter for IdentityFilter {
    fn filter(&self, text: &str) -> String {
        text.to_string()
    }
}

impl<F> TextFilter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn filter(&self, text: &str) -> String {
        self(text)
    }
}

/// Parse a JSON array of post records.
///
/// A document that is not valid JSON or not an array fails as a whole. Otherwise each record
/// yields its own result, so one bad record does not hide the others.
pub fn parse_posts(
    json: &str,
    filter: &dyn TextFilter,
) -> PostreelResult<Vec<PostreelResult<Post>>> {
    let doc: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| PostreelError::serde(format!("invalid posts JSON: {e}")))?;
    let records = doc
        .as_array()
        .ok_or_else(|| PostreelError::input("posts JSON must be an array of objects"))?;

    Ok(records
        .iter()
        .enumerate()
        .map(|(i, v)| Post::from_value(i, v, filter))
        .collect())
}

/// Read and parse a posts file. See [`parse_posts`].
pub fn load_posts(
    path: impl AsRef<Path>,
    filter: &dyn TextFilter,
) -> PostreelResult<Vec<PostreelResult<Post>>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read posts file '{}'", path.display()))?;
    parse_posts(&json, filter)
}

#[cfg(test)]
#[path = "../../tests/unit/post/model.rs"]
mod tests;
