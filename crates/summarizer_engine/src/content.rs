use std::sync::Arc;

use thiserror::Error;
use url::Url;

use engine_logging::engine_warn;
use summarizer_core::SourceKind;

use crate::captions::decode_caption_document;
use crate::extract::{ReadableTextExtractor, TextExtractor};
use crate::fetch::{FetchError, FetchFailureKind, PageFetcher};
use crate::youtube::{extract_player_response, select_caption_track, PlayerResponse};

/// Upper bound on extracted text handed to the prompt, in characters.
pub const MAX_TEXT_LENGTH: usize = 30_000;

const WATCH_BASE: &str = "https://www.youtube.com/watch?v=";
const UNKNOWN_TITLE: &str = "タイトル不明";

/// Normalized content for one job: what gets summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub source: SourceKind,
    pub title: String,
    pub text: String,
}

/// Classifies a URL and produces a `Content` value for it.
pub struct ContentFetcher {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Box<dyn TextExtractor>,
    watch_base: String,
}

impl ContentFetcher {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            extractor: Box::new(ReadableTextExtractor),
            watch_base: WATCH_BASE.to_string(),
        }
    }

    /// Substitute the readable-text extractor.
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Point watch-page fetches at a different base (tests).
    pub fn with_watch_base(mut self, base: impl Into<String>) -> Self {
        self.watch_base = base.into();
        self
    }

    pub async fn fetch(&self, url: &str) -> Result<Content, FetchError> {
        match youtube_video_id(url) {
            Some(video_id) => self.fetch_youtube(&video_id).await,
            None => self.fetch_web(url).await,
        }
    }

    async fn fetch_youtube(&self, video_id: &str) -> Result<Content, FetchError> {
        let page_url = format!("{}{}", self.watch_base, video_id);
        let doc = self
            .fetcher
            .fetch_text(&page_url)
            .await
            .map_err(|err| status_message(err, "YouTubeページの取得に失敗しました"))?;

        let player = extract_player_response(&doc.text);
        let title = player
            .as_ref()
            .and_then(PlayerResponse::title)
            .unwrap_or(UNKNOWN_TITLE)
            .to_string();
        let description = player
            .as_ref()
            .and_then(PlayerResponse::description)
            .unwrap_or_default()
            .to_string();

        // Captions fail soft: fall back to the description.
        let captions = match self.fetch_captions(player.as_ref()).await {
            Ok(text) => text,
            Err(err) => {
                engine_warn!("caption fetch failed, using description only: {err}");
                String::new()
            }
        };

        let text = if captions.is_empty() {
            format!("タイトル: {title}\n\n説明:\n{description}")
        } else {
            format!("タイトル: {title}\n\n字幕:\n{captions}")
        };

        Ok(Content {
            source: SourceKind::Youtube,
            title,
            text: truncate_chars(&text, MAX_TEXT_LENGTH),
        })
    }

    async fn fetch_captions(&self, player: Option<&PlayerResponse>) -> Result<String, CaptionError> {
        let player = player.ok_or(CaptionError::NoPlayerResponse)?;
        let track = select_caption_track(player.caption_tracks()).ok_or(CaptionError::NoTracks)?;
        let track_url = track.base_url.as_deref().ok_or(CaptionError::NoTrackUrl)?;

        let doc = self
            .fetcher
            .fetch_text(track_url)
            .await
            .map_err(|err| CaptionError::Fetch(status_message(err, "字幕の取得に失敗しました")))?;
        Ok(decode_caption_document(&doc.text))
    }

    async fn fetch_web(&self, url: &str) -> Result<Content, FetchError> {
        let doc = self
            .fetcher
            .fetch_text(url)
            .await
            .map_err(|err| status_message(err, "ページの取得に失敗しました"))?;

        let extracted = self.extractor.extract(&doc.text);
        Ok(Content {
            source: SourceKind::Web,
            title: extracted.title.unwrap_or_else(|| url.to_string()),
            text: truncate_chars(&extracted.text, MAX_TEXT_LENGTH),
        })
    }
}

/// Caption acquisition failures never abort a job; they are logged and the
/// pipeline falls back to the video description.
#[derive(Debug, Error)]
enum CaptionError {
    #[error("player response missing")]
    NoPlayerResponse,
    #[error("no caption tracks listed")]
    NoTracks,
    #[error("caption track has no url")]
    NoTrackUrl,
    #[error("{0}")]
    Fetch(FetchError),
}

const YOUTUBE_HOSTS: &[&str] = &["www.youtube.com", "youtube.com", "m.youtube.com", "youtu.be"];

/// Extract a video id from a YouTube URL. `None` means the URL is handled as
/// a generic web page, including youtube.com URLs with no recognizable id.
pub fn youtube_video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?;
    if !YOUTUBE_HOSTS.contains(&host) {
        return None;
    }

    if host == "youtu.be" {
        return url
            .path_segments()?
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);
    }

    if let Some((_, v)) = url.query_pairs().find(|(key, _)| key == "v") {
        if !v.is_empty() {
            return Some(v.into_owned());
        }
    }

    let mut segments = url.path_segments()?;
    match segments.next() {
        Some("shorts" | "live" | "embed" | "v") => segments
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Replace the transport message with the product string for HTTP status
/// failures; other kinds keep their original message.
fn status_message(mut err: FetchError, label: &str) -> FetchError {
    if let FetchFailureKind::HttpStatus(status) = err.kind {
        err.message = format!("{label} ({status})");
    }
    err
}

/// Boundary-safe truncation to at most `max` characters.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
