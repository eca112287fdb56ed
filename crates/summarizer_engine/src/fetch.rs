use std::fmt;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

use crate::decode::decode_body;

/// Transport settings shared by page, watch-page, and caption fetches.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// A fetched document, already decoded to UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDoc {
    pub final_url: String,
    pub content_type: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FetchFailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FetchFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailureKind::InvalidUrl => write!(f, "invalid url"),
            FetchFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FetchFailureKind::Timeout => write!(f, "timeout"),
            FetchFailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FetchFailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FetchFailureKind::Decode => write!(f, "decode error"),
            FetchFailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Retrieves a URL and yields its decoded text body.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<FetchedDoc, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(
        &self,
        redirect_counter: Arc<AtomicUsize>,
    ) -> Result<reqwest::Client, FetchError> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if count >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(policy)
            .build()
            .map_err(|err| FetchError::new(FetchFailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch_text(&self, url: &str) -> Result<FetchedDoc, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FetchFailureKind::InvalidUrl, err.to_string()))?;
        let redirect_counter = Arc::new(AtomicUsize::new(0));
        let client = self.build_client(redirect_counter.clone())?;

        let response = client.get(parsed).send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FetchFailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FetchFailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FetchFailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        let text = decode_body(&bytes, content_type.as_deref())
            .map_err(|err| FetchError::new(FetchFailureKind::Decode, err.to_string()))?;

        Ok(FetchedDoc {
            final_url,
            content_type,
            text,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FetchFailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FetchFailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FetchFailureKind::Network, err.to_string())
}
