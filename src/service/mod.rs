pub mod generation;
mod language;
pub mod link;
pub mod orchestrator;
pub mod prompt;
mod session;
pub mod transcript;
mod usage;
mod user;

pub use generation::{CerebrasClient, GenerationError, TextGenerator};
pub use language::Language;
pub use link::{LinkError, VideoLink};
pub use orchestrator::{FlowError, Generated, Menu, Orchestrator, PipelineSettings, Reply};
pub use prompt::Task;
pub use session::*;
pub use transcript::{TranscriptError, TranscriptFetcher, TranscriptSegment, YoutubeTranscriptFetcher};
pub use usage::*;
pub use user::*;
