//! CLI trigger surface and polling viewer for the link summarizer.
mod export;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use engine_logging::{engine_error, engine_info};
use summarizer_core::{
    InMemoryCredentialStore, InMemoryJobStore, JobStore, SummarySurface, SummaryView,
};
use summarizer_engine::{ContentFetcher, FetchSettings, GeminiClient, JobRunner, ReqwestFetcher};

use crate::logging::LogDestination;

/// Store-poll cadence of the viewer side.
const POLL_INTERVAL_MS: u64 = 500;

/// Summarize a web page or YouTube video into an illustrated HTML page.
#[derive(Debug, Parser)]
#[command(name = "summarize", version)]
struct Cli {
    /// URL to summarize.
    url: String,

    /// Gemini API key; falls back to the GEMINI_API_KEY environment variable.
    #[arg(long)]
    api_key: Option<String>,

    /// Directory the rendered summary page is written to.
    #[arg(long, default_value = "summaries")]
    out_dir: PathBuf,

    /// Also write logs to ./summarizer.log.
    #[arg(long)]
    log_file: bool,
}

/// The CLI's "viewer" is this process itself; opening it just marks the
/// moment polling may begin.
struct TerminalSurface;

impl SummarySurface for TerminalSurface {
    fn open(&self) {
        engine_info!("viewer attached, polling the job store");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(if cli.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    });

    let credentials = Arc::new(InMemoryCredentialStore::new());
    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok());
    if let Some(key) = api_key {
        credentials.set(key);
    }

    let jobs = Arc::new(InMemoryJobStore::new());
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let runner = JobRunner::new(
        ContentFetcher::new(fetcher),
        Arc::new(GeminiClient::new()),
        jobs.clone(),
        credentials,
        Arc::new(TerminalSurface),
    );

    let (job_id, handle) = runner.spawn(cli.url.clone());
    engine_info!("summarize job {job_id} triggered for {}", cli.url);

    let view = poll_until_terminal(jobs.as_ref()).await;
    let _ = handle.await;

    match view {
        SummaryView::Ready {
            url,
            title,
            summary_html,
            badge_label,
            badge_class,
        } => {
            match export::write_summary_page(
                &cli.out_dir,
                &title,
                &url,
                badge_label,
                badge_class,
                &summary_html,
            ) {
                Ok(path) => {
                    engine_info!("summary written to {}", path.display());
                    println!("{}", path.display());
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    engine_error!("failed to write summary page: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        SummaryView::Failure { url, message } => {
            engine_error!("summarization of {url} failed");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
        SummaryView::Pending { .. } => {
            engine_error!("poller returned a non-terminal view");
            ExitCode::FAILURE
        }
    }
}

async fn poll_until_terminal(jobs: &dyn JobStore) -> SummaryView {
    loop {
        if let Some(record) = jobs.current() {
            let view = SummaryView::from_record(&record);
            if view.is_terminal() {
                return view;
            }
        }
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}
