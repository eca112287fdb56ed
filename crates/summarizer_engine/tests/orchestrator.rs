use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use summarizer_core::{
    InMemoryCredentialStore, InMemoryJobStore, JobPhase, JobRecord, JobStore, SourceKind,
    SummarySurface,
};
use summarizer_engine::{
    ContentFetcher, FetchSettings, GeminiClient, JobRunner, ReqwestFetcher,
};

#[derive(Default)]
struct RecordingSurface {
    opens: AtomicUsize,
}

impl SummarySurface for RecordingSurface {
    fn open(&self) {
        self.opens.fetch_add(1, Ordering::Relaxed);
    }
}

struct Harness {
    runner: Arc<JobRunner>,
    jobs: Arc<InMemoryJobStore>,
    surface: Arc<RecordingSurface>,
}

fn harness(server: &MockServer, api_key: Option<&str>) -> Harness {
    let jobs = Arc::new(InMemoryJobStore::new());
    let credentials = Arc::new(match api_key {
        Some(key) => InMemoryCredentialStore::with_key(key),
        None => InMemoryCredentialStore::new(),
    });
    let surface = Arc::new(RecordingSurface::default());

    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let content = ContentFetcher::new(fetcher)
        .with_watch_base(format!("{}/watch?v=", server.uri()));
    let client = Arc::new(GeminiClient::with_endpoint(format!(
        "{}/generate",
        server.uri()
    )));

    let runner = JobRunner::new(
        content,
        client,
        jobs.clone(),
        credentials,
        surface.clone(),
    );
    Harness {
        runner,
        jobs,
        surface,
    }
}

async fn mount_article(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>記事</title></head>\
             <body><article><p>本文です</p></article></body></html>",
            "text/html; charset=utf-8",
        ))
        .mount(server)
        .await;
}

async fn mount_generation(server: &MockServer, text: &str) {
    let body = serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    });
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn web_job_runs_to_done_with_sanitized_summary() {
    let server = MockServer::start().await;
    mount_article(&server).await;
    // Fenced and script-laden output exercises the sanitizer on the way out.
    mount_generation(
        &server,
        "```html\n<h2>サマリー</h2><script>evil()</script><p onclick=\"x()\">本文</p>\n```",
    )
    .await;

    let h = harness(&server, Some("secret"));
    let url = format!("{}/article", server.uri());
    let (job_id, handle) = h.runner.clone().spawn(url.clone());
    handle.await.unwrap();

    let record = h.jobs.current().unwrap();
    assert_eq!(record.job_id, job_id);
    assert_eq!(record.url, url);
    match record.phase {
        JobPhase::Done {
            title,
            summary_html,
            source,
        } => {
            assert_eq!(title, "記事");
            assert_eq!(source, SourceKind::Web);
            assert!(!summary_html.is_empty());
            assert!(summary_html.contains("<h2>サマリー</h2>"));
            assert!(!summary_html.contains("<script"));
            assert!(!summary_html.contains("onclick"));
            assert!(!summary_html.contains("```"));
        }
        other => panic!("unexpected phase: {other:?}"),
    }
    assert_eq!(h.surface.opens.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn missing_credential_fails_before_any_network_call() {
    let server = MockServer::start().await;
    mount_article(&server).await;
    mount_generation(&server, "unused").await;

    let h = harness(&server, None);
    let url = format!("{}/article", server.uri());
    let (_, handle) = h.runner.clone().spawn(url);
    handle.await.unwrap();

    match h.jobs.current().unwrap().phase {
        JobPhase::Failed { message } => {
            assert!(message.contains("APIキーが設定されていません"), "{message}");
        }
        other => panic!("unexpected phase: {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn loading_is_written_before_the_pipeline_runs() {
    // Single-threaded test runtime: the spawned task cannot run until the
    // handle is awaited, so the synchronous Loading write is observable.
    let server = MockServer::start().await;
    mount_article(&server).await;
    mount_generation(&server, "<p>ok</p>").await;

    let h = harness(&server, Some("secret"));
    let url = format!("{}/article", server.uri());
    let (job_id, handle) = h.runner.clone().spawn(url.clone());

    assert_eq!(
        h.jobs.current().unwrap(),
        JobRecord::loading(job_id, url)
    );

    handle.await.unwrap();
    assert!(h.jobs.current().unwrap().is_terminal());
}

#[tokio::test]
async fn stale_job_cannot_overwrite_a_newer_one() {
    let server = MockServer::start().await;
    mount_article(&server).await;
    mount_generation(&server, "<p>ok</p>").await;

    let h = harness(&server, Some("secret"));
    let url = format!("{}/article", server.uri());
    let (first_id, first) = h.runner.clone().spawn(url.clone());
    let (second_id, second) = h.runner.clone().spawn(url);
    assert_ne!(first_id, second_id);

    // The first pipeline finishes after the second trigger replaced its
    // record; its terminal write must be discarded whatever the interleaving.
    first.await.unwrap();
    let record = h.jobs.current().unwrap();
    assert_eq!(record.job_id, second_id);

    second.await.unwrap();
    let record = h.jobs.current().unwrap();
    assert_eq!(record.job_id, second_id);
    assert!(record.is_terminal());
}

#[tokio::test]
async fn cancellation_lands_as_a_terminal_failure() {
    let server = MockServer::start().await;
    mount_article(&server).await;
    mount_generation(&server, "<p>ok</p>").await;

    let h = harness(&server, Some("secret"));
    let url = format!("{}/article", server.uri());

    let job_id = 1;
    h.jobs.begin(JobRecord::loading(job_id, url.clone()));
    let cancel = CancellationToken::new();
    cancel.cancel();
    h.runner.run(job_id, url, cancel).await;

    match h.jobs.current().unwrap().phase {
        JobPhase::Failed { message } => assert_eq!(message, "要約を中断しました"),
        other => panic!("unexpected phase: {other:?}"),
    }
}
