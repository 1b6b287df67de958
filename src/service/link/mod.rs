use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static YOUTUBE_LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://)?(www\.)?(youtube\.com/watch\?v=|youtu\.be/)[\w\-]{11}").unwrap());

// Tried in order: short domain first, then the watch query parameter.
static VIDEO_ID_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"youtu\.be/([\w\-]{11})").unwrap(),
        Regex::new(r"youtube\.com/watch\?v=([\w\-]{11})").unwrap(),
    ]
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("Invalid YouTube URL format")]
    InvalidFormat,
}

/// A link the user submitted together with its canonical 11-character video id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLink {
    pub url: String,
    pub video_id: String,
}

pub fn is_valid_link(text: &str) -> bool {
    YOUTUBE_LINK_REGEX.is_match(text)
}

pub fn extract_video_id(text: &str) -> Result<String, LinkError> {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(LinkError::InvalidFormat)
}

pub fn parse_link(text: &str) -> Result<VideoLink, LinkError> {
    let text = text.trim();
    if !is_valid_link(text) {
        return Err(LinkError::InvalidFormat);
    }

    Ok(VideoLink {
        url: text.to_string(),
        video_id: extract_video_id(text)?,
    })
}
