//! Summarizer engine: content acquisition, prompt construction, and the
//! generation-provider pipeline behind the job store.
mod captions;
mod content;
mod decode;
mod extract;
mod fetch;
mod orchestrator;
mod prompt;
mod provider;
mod sanitize;
mod youtube;

pub use captions::decode_caption_document;
pub use content::{youtube_video_id, Content, ContentFetcher, MAX_TEXT_LENGTH};
pub use decode::{decode_body, DecodeError};
pub use extract::{ExtractedText, ReadableTextExtractor, TextExtractor};
pub use fetch::{
    FetchError, FetchFailureKind, FetchSettings, FetchedDoc, PageFetcher, ReqwestFetcher,
};
pub use orchestrator::{JobError, JobRunner};
pub use prompt::build_summary_prompt;
pub use provider::{GeminiClient, GenerateError, GenerativeClient, GEMINI_API_URL};
pub use sanitize::sanitize_summary_html;
pub use youtube::{extract_player_response, select_caption_track, CaptionTrack, PlayerResponse};
