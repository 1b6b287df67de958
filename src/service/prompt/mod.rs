use serde::{Deserialize, Serialize};

use crate::service::{Language, RequestKind, TranscriptSegment};

pub const DEFAULT_MAX_TRANSCRIPT_CHARS: usize = 5000;
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 100;

/// Generation task a prompt is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Task {
    Summary,
    Takeaways,
}

impl Task {
    pub fn request_kind(&self) -> RequestKind {
        match self {
            Task::Summary => RequestKind::Summarize,
            Task::Takeaways => RequestKind::Takeaways,
        }
    }
}

/// Joins all segments with single spaces, keeps the first `max_chars` characters and trims.
pub fn format_transcript(segments: &[TranscriptSegment], max_chars: usize) -> String {
    let full_text = segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    truncate_chars(&full_text, max_chars).trim().to_string()
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_prompt(transcript_text: &str, language: Language, task: Task) -> String {
    let instruction = match task {
        Task::Summary => {
            "Please summarize the following YouTube video transcript in 2-3 clear and concise sentences. \
             Only provide the summary, with no additional commentary or explanations."
        }
        Task::Takeaways => {
            "Please extract the main takeaways from the following YouTube video transcript. \
             Provide a list of key points or insights, formatted as bullet points. \
             Only include the takeaways in your response, with no additional commentary."
        }
    };

    format!(
        "{}\n\nYour response should be explicitly and exclusively in this language: {}.\n\nHere is the transcript:\n\n{}",
        instruction,
        language.name().to_lowercase(),
        transcript_text
    )
}
