use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";

static TEXT_ELEMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<text start="([\d.]+)"(?:\s+dur="([\d.]+)")?[^>]*>(.*?)</text>"#).unwrap()
});

static INNER_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static NUMERIC_ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#(x?[0-9A-Fa-f]+);").unwrap());

/// One timed piece of a video's spoken text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("No transcript available for video {0}")]
    NotAvailable(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, TranscriptError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Reads the caption tracks YouTube embeds in the watch page and downloads the timed text.
#[derive(Clone)]
pub struct YoutubeTranscriptFetcher {
    client: Client,
    preferred_languages: Vec<String>,
}

impl YoutubeTranscriptFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            preferred_languages: vec!["en".to_string()],
        }
    }

    async fn load_caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>, TranscriptError> {
        let html = self
            .client
            .get(format!("{}{}", WATCH_URL, video_id))
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_caption_tracks(&html).ok_or_else(|| TranscriptError::NotAvailable(video_id.to_string()))
    }
}

#[async_trait]
impl TranscriptFetcher for YoutubeTranscriptFetcher {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        let tracks = self.load_caption_tracks(video_id).await?;
        let track = pick_track(&tracks, &self.preferred_languages)
            .ok_or_else(|| TranscriptError::NotAvailable(video_id.to_string()))?;

        debug!(
            "Using {} caption track '{}' for {}",
            if track.is_generated() { "generated" } else { "manual" },
            track.language_code,
            video_id
        );

        let xml = self
            .client
            .get(&track.base_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let segments = parse_timedtext(&xml);
        if segments.is_empty() {
            return Err(TranscriptError::NotAvailable(video_id.to_string()));
        }

        Ok(segments)
    }
}

fn extract_caption_tracks(html: &str) -> Option<Vec<CaptionTrack>> {
    let start = html.find(CAPTION_TRACKS_KEY)? + CAPTION_TRACKS_KEY.len();
    // The array is followed by the rest of the player JSON; stop after the first value.
    serde_json::Deserializer::from_str(&html[start..])
        .into_iter::<Vec<CaptionTrack>>()
        .next()?
        .ok()
        .filter(|tracks| !tracks.is_empty())
}

/// Manual tracks beat generated ones; preferred languages beat the rest.
fn pick_track<'a>(tracks: &'a [CaptionTrack], preferred: &[String]) -> Option<&'a CaptionTrack> {
    let preferred_match = |track: &&CaptionTrack| {
        preferred
            .iter()
            .any(|lang| track.language_code == *lang || track.language_code.starts_with(&format!("{}-", lang)))
    };

    tracks
        .iter()
        .filter(|t| !t.is_generated())
        .find(preferred_match)
        .or_else(|| tracks.iter().filter(|t| t.is_generated()).find(preferred_match))
        .or_else(|| tracks.iter().find(|t| !t.is_generated()))
        .or_else(|| tracks.first())
}

fn parse_timedtext(xml: &str) -> Vec<TranscriptSegment> {
    TEXT_ELEMENT_REGEX
        .captures_iter(xml)
        .filter_map(|caps| {
            let start = caps.get(1)?.as_str().parse::<f64>().ok()?;
            let duration = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);
            // XML escaping wraps HTML escaping, so decode twice.
            let raw = decode_entities(&decode_entities(caps.get(3)?.as_str()));
            let text = INNER_TAG_REGEX.replace_all(&raw, "").replace('\n', " ");
            let text = text.trim();

            if text.is_empty() {
                return None;
            }

            Some(TranscriptSegment {
                text: text.to_string(),
                start,
                duration,
            })
        })
        .collect()
}

fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY_REGEX.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    numeric
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lang: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://example.test/{}/{}", lang, kind.unwrap_or("manual")),
            language_code: lang.to_string(),
            kind: kind.map(str::to_string),
        }
    }

    #[test]
    fn test_extract_caption_tracks_from_player_json() {
        let html = r#"<script>var ytInitialPlayerResponse = {"captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=en","languageCode":"en","kind":"asr"},{"baseUrl":"https://www.youtube.com/api/timedtext?v=abc&lang=de","languageCode":"de"}],"audioTracks":[]}}};</script>"#;

        let tracks = extract_caption_tracks(html).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].base_url, "https://www.youtube.com/api/timedtext?v=abc&lang=en");
        assert!(tracks[0].is_generated());
        assert!(!tracks[1].is_generated());
    }

    #[test]
    fn test_no_caption_tracks() {
        assert!(extract_caption_tracks("<html>no captions here</html>").is_none());
        assert!(extract_caption_tracks(r#"{"captionTracks":[]}"#).is_none());
    }

    #[test]
    fn test_pick_track_prefers_manual_in_preferred_language() {
        let preferred = vec!["en".to_string()];

        let tracks = vec![track("en", Some("asr")), track("de", None), track("en-GB", None)];
        assert_eq!(pick_track(&tracks, &preferred).unwrap().language_code, "en-GB");

        let tracks = vec![track("de", None), track("en", Some("asr"))];
        assert_eq!(pick_track(&tracks, &preferred).unwrap().language_code, "en");

        let tracks = vec![track("fr", Some("asr")), track("de", None)];
        assert_eq!(pick_track(&tracks, &preferred).unwrap().language_code, "de");

        assert!(pick_track(&[], &preferred).is_none());
    }

    #[test]
    fn test_parse_timedtext() {
        let xml = r##"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.5" dur="1.2">Hello &amp;amp; welcome</text><text start="1.7" dur="2">it&amp;#39;s <font color="#FFF">great</font></text><text start="3.7" dur="1"> </text><text start="4.7">line
break</text></transcript>"##;

        let segments = parse_timedtext(xml);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].text, "Hello & welcome");
        assert_eq!(segments[0].start, 0.5);
        assert_eq!(segments[0].duration, 1.2);
        assert_eq!(segments[1].text, "it's great");
        assert_eq!(segments[2].text, "line break");
        assert_eq!(segments[2].duration, 0.0);
    }
}
