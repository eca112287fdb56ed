use serde::Deserialize;

/// The slice of `ytInitialPlayerResponse` this pipeline cares about. Every
/// field is optional; watch pages routinely omit or reshape parts of it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerResponse {
    video_details: Option<VideoDetails>,
    captions: Option<CaptionsRenderer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VideoDetails {
    title: Option<String>,
    short_description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CaptionsRenderer {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct TracklistRenderer {
    caption_tracks: Vec<CaptionTrack>,
}

/// One timed-text track offered by the watch page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionTrack {
    pub language_code: Option<String>,
    pub base_url: Option<String>,
}

impl PlayerResponse {
    pub fn title(&self) -> Option<&str> {
        self.video_details.as_ref()?.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.video_details.as_ref()?.short_description.as_deref()
    }

    pub fn caption_tracks(&self) -> &[CaptionTrack] {
        self.captions
            .as_ref()
            .and_then(|c| c.player_captions_tracklist_renderer.as_ref())
            .map(|r| r.caption_tracks.as_slice())
            .unwrap_or_default()
    }
}

/// Locate and parse the `ytInitialPlayerResponse` JSON embedded in a watch
/// page. Candidate sites are every `ytInitialPlayerResponse =` assignment;
/// the object is delimited with a string-aware bracket-depth scan, since the
/// blob nests braces far too deeply for a non-greedy pattern match.
pub fn extract_player_response(html: &str) -> Option<PlayerResponse> {
    const NEEDLE: &str = "ytInitialPlayerResponse";

    let mut search = 0;
    while let Some(found) = html[search..].find(NEEDLE) {
        let after_needle = search + found + NEEDLE.len();
        search = after_needle;

        if let Some(json) = assigned_object(html, after_needle) {
            if let Ok(parsed) = serde_json::from_str::<PlayerResponse>(json) {
                return Some(parsed);
            }
        }
    }
    None
}

/// Expect `= {` (with arbitrary whitespace) at `idx` and return the balanced
/// object that starts there.
fn assigned_object(html: &str, idx: usize) -> Option<&str> {
    let bytes = html.as_bytes();
    let mut i = idx;
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    if bytes.get(i) != Some(&b'=') {
        return None;
    }
    i += 1;
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    if bytes.get(i) != Some(&b'{') {
        return None;
    }
    balanced_object(&html[i..])
}

/// Return the `{...}` object beginning at the first byte, tracking brace depth
/// outside of JSON string literals.
fn balanced_object(s: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in s.as_bytes().iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Prefer a Japanese track, then English, then the first listed.
pub fn select_caption_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    for lang in ["ja", "en"] {
        if let Some(track) = tracks
            .iter()
            .find(|t| t.language_code.as_deref() == Some(lang))
        {
            return Some(track);
        }
    }
    tracks.first()
}
