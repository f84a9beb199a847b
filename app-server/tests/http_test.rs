//! End-to-end tests: a real server on a local port, with the archive host and
//! the completion API replaced by wiremock servers.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use flate2::Compression;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;
use readiscover_app_server::{
    ArchiveSource, ArxivSource, ClientError, RetryPolicy, SessionHandler, SourceError,
    TutorClient, router,
};
use readiscover_archive::{ArchiveEntry, encode_entries};
use readiscover_completion::{CompletionConfig, OpenRouterProvider};
use readiscover_tutor::{SessionRegistry, Tutor, TutorConfig};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MAIN_TEX: &str = r"\documentclass{article}
\title{Rediscovering {Attention}}
\begin{document}
\section{Results}
\begin{figure}
  \includegraphics{plots/fig1}
  \caption{Results}
  \label{fig:res}
\end{figure}
\end{document}
";

const CONCEPTS: &str = r#"[
  {"id": 1, "title": "Scaled dot-product attention", "core_idea": "Weigh values by query-key similarity.", "required_background": "Softmax", "relevant_figures": ["fig:res"]},
  {"id": 2, "title": "Multi-head attention", "core_idea": "Attend in several subspaces.", "required_background": "", "relevant_figures": []}
]"#;

fn gzipped_archive(entries: &[ArchiveEntry]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&encode_entries(entries)).unwrap();
    encoder.finish().unwrap()
}

fn paper_archive() -> Vec<u8> {
    gzipped_archive(&[
        ArchiveEntry::file("main.tex", MAIN_TEX.as_bytes().to_vec()),
        ArchiveEntry::file("plots/fig1.png", vec![0x89, b'P', b'N', b'G']),
    ])
}

fn completion_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "test",
        "choices": [{"message": {"role": "assistant", "content": text}}]
    })
}

async fn mount_completions(server: &MockServer, dialogue_reply: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "test/summarizer"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(CONCEPTS)))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "test/dialogue"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(dialogue_reply)))
        .mount(server)
        .await;
}

struct TestServer {
    base_url: String,
    registry: Arc<SessionRegistry>,
}

/// Serve the real router against mocked upstreams.
async fn spawn_server(source_url: &str, completion_url: &str) -> TestServer {
    let provider = Arc::new(OpenRouterProvider::from_config(
        &CompletionConfig::default().with_base_url(completion_url),
    ));
    let registry = Arc::new(SessionRegistry::default());
    let tutor = Tutor::new(
        provider,
        Arc::clone(&registry),
        TutorConfig::default().with_models("test/summarizer", "test/dialogue"),
    );
    let handler = Arc::new(SessionHandler::new(
        tutor,
        Arc::new(ArxivSource::new(source_url)),
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(handler)).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        registry,
    }
}

async fn post(url: String, body: serde_json::Value) -> (u16, serde_json::Value) {
    let response = reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let upstream = MockServer::start().await;
    let server = spawn_server(&upstream.uri(), &upstream.uri()).await;

    let response = reqwest::get(format!("{}/health", server.base_url)).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"status": "ok", "service": "readiscover-api"})
    );

    let response = reqwest::get(format!("{}/nope", server.base_url)).await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"error": "Not found"}));
}

#[tokio::test]
async fn full_session_through_client() {
    let source = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/src/1706.03762"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(paper_archive()))
        .mount(&source)
        .await;
    let completions = MockServer::start().await;
    mount_completions(&completions, "PROGRESS: 40%\nLook at {{fig:res}} for evidence.").await;

    let server = spawn_server(&source.uri(), &completions.uri()).await;
    let client = TutorClient::new(&server.base_url);

    let started = client
        .start_session("1706.03762", "sk-or-test", "I know linear algebra.")
        .await
        .unwrap();
    assert_eq!(started.paper_title, "Rediscovering Attention");
    assert_eq!(started.total_concepts, 2);
    assert_eq!(started.initial_message, "Look at  for evidence.");
    assert_eq!(server.registry.len().await, 1);

    let outcome = client
        .submit_answer(&started.session_id, "It compares queries and keys.")
        .await
        .unwrap();
    assert_eq!(outcome.tutor_message, "Look at  for evidence.");
    assert_eq!(outcome.progress_percentage, Some(40));
    assert_eq!(outcome.current_concept, 1);
    assert!(!outcome.is_complete);
    assert_eq!(outcome.figures.len(), 1);
    assert_eq!(outcome.figures[0].label, "fig:res");
    assert_eq!(outcome.figures[0].caption, "Results");
    assert_eq!(outcome.figures[0].data, "iVBORw==");
}

#[tokio::test]
async fn answer_json_shape() {
    let source = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/src/1706.03762"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(paper_archive()))
        .mount(&source)
        .await;
    let completions = MockServer::start().await;
    mount_completions(&completions, "Tell me more.").await;
    let server = spawn_server(&source.uri(), &completions.uri()).await;

    let (status, started) = post(
        format!("{}/session/start", server.base_url),
        serde_json::json!({"arxiv_id": "1706.03762", "openrouter_api_key": "sk"}),
    )
    .await;
    assert_eq!(status, 200);
    let session_id = started["session_id"].clone();

    let (status, body) = post(
        format!("{}/session/answer", server.base_url),
        serde_json::json!({"session_id": session_id, "user_answer": "hm"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        serde_json::json!({
            "tutor_message": "Tell me more.",
            "current_concept": 1,
            "is_complete": false,
            "figures": [],
            "progress_percentage": null
        })
    );
}

#[tokio::test]
async fn request_validation_errors() {
    let upstream = MockServer::start().await;
    let server = spawn_server(&upstream.uri(), &upstream.uri()).await;

    let (status, body) = post(
        format!("{}/session/start", server.base_url),
        serde_json::json!({"arxiv_id": "1706.03762"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(
        body["error"],
        "Missing required fields: arxiv_id, openrouter_api_key"
    );

    let (status, _) = post(
        format!("{}/session/start", server.base_url),
        serde_json::json!({"arxiv_id": "../../etc/passwd?", "openrouter_api_key": "sk"}),
    )
    .await;
    assert_eq!(status, 400);

    let (status, body) = post(
        format!("{}/session/answer", server.base_url),
        serde_json::json!({"session_id": "missing", "user_answer": "hi"}),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Session not found or expired");

    let response = reqwest::Client::new()
        .post(format!("{}/session/answer", server.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn archive_without_tex_is_unprocessable() {
    let source = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/src/2401.00001"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzipped_archive(&[
            ArchiveEntry::file("figure.png", vec![1, 2, 3]),
        ])))
        .mount(&source)
        .await;
    let server = spawn_server(&source.uri(), &source.uri()).await;

    let (status, body) = post(
        format!("{}/session/start", server.base_url),
        serde_json::json!({"arxiv_id": "2401.00001", "openrouter_api_key": "sk"}),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(body["error"], "could not find main LaTeX file in source");
    assert!(server.registry.is_empty().await);
}

#[tokio::test]
async fn unavailable_source_is_bad_gateway() {
    let source = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&source)
        .await;
    let server = spawn_server(&source.uri(), &source.uri()).await;

    let (status, _) = post(
        format!("{}/session/start", server.base_url),
        serde_json::json!({"arxiv_id": "0000.00000", "openrouter_api_key": "sk"}),
    )
    .await;
    assert_eq!(status, 502);
}

#[tokio::test]
async fn arxiv_source_gunzips_and_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/src/1706.03762"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(paper_archive()))
        .mount(&server)
        .await;

    let source = ArxivSource::new(server.uri());
    let tar = source.fetch("1706.03762").await.unwrap();
    assert_eq!(tar.len() % 512, 0);

    let err = source.fetch("9999.99999").await.unwrap_err();
    assert!(matches!(err, SourceError::Unavailable { status: 404, .. }));
}

#[tokio::test]
async fn client_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/answer"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/answer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tutor_message": "ok",
            "current_concept": 1,
            "is_complete": false,
            "figures": [],
            "progress_percentage": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TutorClient::new(server.uri())
        .with_retry_policy(RetryPolicy::default().with_initial_delay(Duration::from_millis(10)));
    let outcome = client.submit_answer("s", "a").await.unwrap();

    assert_eq!(outcome.tutor_message, "ok");
}

#[tokio::test]
async fn client_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/answer"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"error": "Session not found or expired"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = TutorClient::new(server.uri())
        .with_retry_policy(RetryPolicy::default().with_initial_delay(Duration::from_millis(10)));
    let err = client.submit_answer("s", "a").await.unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Session not found or expired");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn client_does_not_resubmit_after_undecodable_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/answer"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = TutorClient::new(server.uri())
        .with_retry_policy(RetryPolicy::default().with_initial_delay(Duration::from_millis(10)));
    let err = client.submit_answer("s", "a").await.unwrap_err();

    match err {
        ClientError::Http(e) => assert!(e.is_decode()),
        other => panic!("unexpected error: {other:?}"),
    }
}
