use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use engine_logging::{engine_debug, engine_error, engine_info};
use summarizer_core::{CredentialStore, JobId, JobPhase, JobRecord, JobStore, SummarySurface};

use crate::content::ContentFetcher;
use crate::fetch::FetchError;
use crate::prompt::build_summary_prompt;
use crate::provider::{GenerateError, GenerativeClient};
use crate::sanitize::sanitize_summary_html;

/// Failure of one summarization job. The display string is exactly what the
/// viewer shows next to the original URL.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("APIキーが設定されていません。設定ページからGemini APIキーを入力してください。")]
    CredentialMissing,
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Generate(#[from] GenerateError),
}

/// Coordinates the fetch -> prompt -> provider -> sanitize pipeline for one
/// URL and owns all writes to the job store. Failures never escape: every
/// outcome lands in the store as a terminal phase.
pub struct JobRunner {
    content: ContentFetcher,
    client: Arc<dyn GenerativeClient>,
    jobs: Arc<dyn JobStore>,
    credentials: Arc<dyn CredentialStore>,
    surface: Arc<dyn SummarySurface>,
    next_job_id: AtomicU64,
}

impl JobRunner {
    pub fn new(
        content: ContentFetcher,
        client: Arc<dyn GenerativeClient>,
        jobs: Arc<dyn JobStore>,
        credentials: Arc<dyn CredentialStore>,
        surface: Arc<dyn SummarySurface>,
    ) -> Arc<Self> {
        Arc::new(Self {
            content,
            client,
            jobs,
            credentials,
            surface,
            next_job_id: AtomicU64::new(0),
        })
    }

    /// Start a job for `url`. The `Loading` record is written before this
    /// returns, so a poller never observes a gap; the pipeline itself runs on
    /// a spawned task observed through the store.
    pub fn spawn(self: Arc<Self>, url: impl Into<String>) -> (JobId, JoinHandle<()>) {
        let url = url.into();
        let job_id = self.next_job_id.fetch_add(1, Ordering::Relaxed) + 1;

        self.jobs.begin(JobRecord::loading(job_id, url.clone()));
        self.surface.open();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(async move {
            self.run(job_id, url, cancel).await;
        });
        (job_id, handle)
    }

    /// Drive one job to a terminal phase. The caller must have written the
    /// job's `Loading` record already (as `spawn` does).
    pub async fn run(&self, job_id: JobId, url: String, cancel: CancellationToken) {
        engine_info!("summarize job {job_id} started for {url}");

        let phase = tokio::select! {
            _ = cancel.cancelled() => JobPhase::Failed {
                message: "要約を中断しました".to_string(),
            },
            outcome = self.pipeline(&url) => match outcome {
                Ok(phase) => phase,
                Err(err) => {
                    engine_error!("summarize job {job_id} failed: {err}");
                    JobPhase::Failed {
                        message: err.to_string(),
                    }
                }
            },
        };

        if !self.jobs.finish(job_id, phase) {
            engine_debug!("job {job_id} result discarded; a newer job owns the record");
        }
    }

    async fn pipeline(&self, url: &str) -> Result<JobPhase, JobError> {
        // Credential first: a missing key fails before any network traffic.
        let api_key = self.credentials.api_key().ok_or(JobError::CredentialMissing)?;

        let content = self.content.fetch(url).await?;
        let prompt = build_summary_prompt(&content);
        let raw = self.client.generate(&api_key, &prompt).await?;

        Ok(JobPhase::Done {
            title: content.title,
            summary_html: sanitize_summary_html(&raw),
            source: content.source,
        })
    }
}
