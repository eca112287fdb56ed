use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed generation endpoint, model included.
pub const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent";

const TEMPERATURE: f32 = 0.3;
const MAX_OUTPUT_TOKENS: u32 = 16_384;

/// Provider failures, mapped from the transport status. The display strings
/// are the product strings the viewer shows verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("APIリクエストが不正です。APIキーを確認してください。")]
    InvalidRequest,
    #[error("APIキーが無効か、権限がありません。")]
    InvalidCredential,
    #[error("APIの利用制限に達しました。\n詳細: {detail}")]
    RateLimited { detail: String },
    #[error("Gemini APIエラー ({status}): {body}")]
    Upstream { status: u16, body: String },
    #[error("Gemini APIから有効な応答が得られませんでした")]
    EmptyResponse,
    #[error("Gemini APIへの接続に失敗しました: {message}")]
    Transport { message: String },
}

/// Issues one generation request and returns the generated text.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self::with_endpoint(GEMINI_API_URL)
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, GenerateError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };
        let body = serde_json::to_string(&request).map_err(|err| GenerateError::Transport {
            message: err.to_string(),
        })?;

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| GenerateError::Transport {
                message: err.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GenerateError::Transport {
                message: err.to_string(),
            })?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                400 => GenerateError::InvalidRequest,
                403 => GenerateError::InvalidCredential,
                429 => GenerateError::RateLimited {
                    detail: rate_limit_detail(&body),
                },
                status => GenerateError::Upstream { status, body },
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|_| GenerateError::EmptyResponse)?;
        first_candidate_text(parsed).ok_or(GenerateError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidatePart {
    text: Option<String>,
}

/// Walk `candidates[0].content.parts[0].text`; any missing hop yields `None`.
fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
        .filter(|text| !text.is_empty())
}

/// Best-effort `error.message` out of a JSON error body; the raw body is the
/// fallback detail.
fn rate_limit_detail(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| body.to_string())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorDetail {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{first_candidate_text, rate_limit_detail, GenerateResponse};

    fn parse(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn traversal_reads_the_first_candidate_text() {
        let response =
            parse(r#"{"candidates":[{"content":{"parts":[{"text":"<h2>サマリー</h2>"}]}}]}"#);
        assert_eq!(
            first_candidate_text(response).as_deref(),
            Some("<h2>サマリー</h2>")
        );
    }

    #[test]
    fn any_missing_hop_yields_none() {
        for json in [
            r#"{}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{}]}"#,
            r#"{"candidates":[{"content":{}}]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{}]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#,
        ] {
            assert_eq!(first_candidate_text(parse(json)), None, "input: {json}");
        }
    }

    #[test]
    fn rate_limit_detail_prefers_the_nested_message() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded"}}"#;
        assert_eq!(rate_limit_detail(body), "Quota exceeded");
    }

    #[test]
    fn rate_limit_detail_falls_back_to_the_raw_body() {
        assert_eq!(rate_limit_detail("plain text overload"), "plain text overload");
        assert_eq!(rate_limit_detail(r#"{"error":{}}"#), r#"{"error":{}}"#);
    }
}
