use pretty_assertions::assert_eq;
use summarizer_engine::{GeminiClient, GenerateError, GenerativeClient};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT_PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::with_endpoint(format!("{}{}", server.uri(), ENDPOINT_PATH))
}

#[tokio::test]
async fn successful_generation_returns_the_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .and(query_param("key", "secret-key"))
        .and(body_string_contains("generationConfig"))
        .and(body_string_contains("要約してください"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"candidates":[{"content":{"parts":[{"text":"<h2>サマリー</h2><p>結果</p>"}]}}]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let text = client(&server)
        .generate("secret-key", "この記事を要約してください")
        .await
        .expect("generated text");
    assert_eq!(text, "<h2>サマリー</h2><p>結果</p>");
}

#[tokio::test]
async fn status_mapping_is_total() {
    for (status, body) in [
        (400, "bad request"),
        (403, "forbidden"),
        (429, "limit"),
        (500, "boom"),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;

        let err = client(&server).generate("k", "p").await.unwrap_err();
        match status {
            400 => assert_eq!(err, GenerateError::InvalidRequest),
            403 => assert_eq!(err, GenerateError::InvalidCredential),
            429 => assert_eq!(
                err,
                GenerateError::RateLimited {
                    detail: "limit".to_string()
                }
            ),
            _ => assert_eq!(
                err,
                GenerateError::Upstream {
                    status: 500,
                    body: "boom".to_string()
                }
            ),
        }
    }
}

#[tokio::test]
async fn rate_limit_detail_comes_from_the_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_raw(
            r#"{"error":{"code":429,"message":"Quota exceeded for today"}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let err = client(&server).generate("k", "p").await.unwrap_err();
    assert_eq!(
        err,
        GenerateError::RateLimited {
            detail: "Quota exceeded for today".to_string()
        }
    );
}

#[tokio::test]
async fn response_without_text_is_empty_response() {
    for body in [
        r#"{"candidates":[]}"#,
        r#"{"candidates":[{"content":{"parts":[]}}]}"#,
        r#"not even json"#,
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let err = client(&server).generate("k", "p").await.unwrap_err();
        assert_eq!(err, GenerateError::EmptyResponse, "body: {body}");
    }
}
