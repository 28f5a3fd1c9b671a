use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderValue, Request, StatusCode},
    Router,
};
use file_insights::{
    ChatCompletionClient, CompletionBackend, CompletionRequest, Config, QueryError, QueryResult,
    QueryService, TextExtractor, MAX_DOCUMENT_CHARS, MAX_UPLOAD_BYTES,
};
use insights_api::{router, AppState};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "----insights-test-boundary";
const ORIGIN: &str = "http://localhost:5173";

enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        bytes: Vec<u8>,
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

fn pdf_part(bytes: Vec<u8>) -> Part<'static> {
    Part::File {
        name: "pdf",
        filename: "report.pdf",
        content_type: "application/pdf",
        bytes,
    }
}

fn question(value: &str) -> Part<'_> {
    Part::Text {
        name: "question",
        value,
    }
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn query_request(parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/query")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[derive(Default)]
struct StubExtractor {
    text: String,
    fail: bool,
    calls: AtomicUsize,
}

impl TextExtractor for StubExtractor {
    fn extract(&self, _bytes: &[u8]) -> QueryResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(QueryError::Extraction("invalid file header".into()));
        }
        Ok(self.text.clone())
    }
}

#[derive(Default)]
struct RecordingBackend {
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

#[async_trait]
impl CompletionBackend for RecordingBackend {
    async fn complete(&self, request: &CompletionRequest) -> QueryResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        Ok("This is a lease agreement.".to_string())
    }
}

struct Harness {
    app: Router,
    extractor: Arc<StubExtractor>,
    backend: Arc<RecordingBackend>,
}

fn harness(extractor: StubExtractor) -> Harness {
    let extractor = Arc::new(extractor);
    let backend = Arc::new(RecordingBackend::default());
    let service = QueryService::new(extractor.clone(), backend.clone(), "test-model");
    let app = router(AppState::new(service), &[ORIGIN.to_string()]);
    Harness {
        app,
        extractor,
        backend,
    }
}

fn document(text: &str) -> StubExtractor {
    StubExtractor {
        text: text.to_string(),
        ..Default::default()
    }
}

impl Harness {
    fn extractor_calls(&self) -> usize {
        self.extractor.calls.load(Ordering::SeqCst)
    }

    fn backend_calls(&self) -> usize {
        self.backend.calls.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn health_is_ok() {
    let h = harness(document(""));
    let response = h
        .app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn answers_a_valid_query() {
    let h = harness(document("This lease is between A and B."));
    let (status, body) = send(
        &h.app,
        query_request(&[pdf_part(b"%PDF-1.4".to_vec()), question("What is this?")]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "answer": "This is a lease agreement." }));
    assert_eq!(h.extractor_calls(), 1);
    assert_eq!(h.backend_calls(), 1);
}

#[tokio::test]
async fn rejects_blank_and_long_questions() {
    let h = harness(document("text"));
    let too_long = "x".repeat(251);

    for q in ["", "   ", too_long.as_str()] {
        let (status, body) = send(
            &h.app,
            query_request(&[pdf_part(b"%PDF-1.4".to_vec()), question(q)]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Question must be 1–250 characters");
    }

    let (status, body) = send(&h.app, query_request(&[pdf_part(b"%PDF-1.4".to_vec())])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Question must be 1–250 characters");

    assert_eq!(h.extractor_calls(), 0);
    assert_eq!(h.backend_calls(), 0);
}

#[tokio::test]
async fn requires_a_file() {
    let h = harness(document("text"));
    let (status, body) = send(&h.app, query_request(&[question("What is this?")])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "PDF file is required");
    assert_eq!(h.backend_calls(), 0);
}

#[tokio::test]
async fn gate_rejects_non_pdf_before_the_handler() {
    let h = harness(document("text"));
    let text_file = Part::File {
        name: "pdf",
        filename: "notes.txt",
        content_type: "text/plain",
        bytes: b"hello".to_vec(),
    };
    // An invalid question would fail in the handler; the gate answers first.
    let (status, body) = send(&h.app, query_request(&[text_file, question("")])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only PDF files are allowed");
    assert_eq!(h.extractor_calls(), 0);
}

#[tokio::test]
async fn gate_rejects_oversized_files() {
    let h = harness(document("text"));
    let (status, body) = send(
        &h.app,
        query_request(&[
            pdf_part(vec![b'0'; MAX_UPLOAD_BYTES + 1]),
            question("What is this?"),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    assert_eq!(h.extractor_calls(), 0);

    let big_text = Part::File {
        name: "pdf",
        filename: "dump.bin",
        content_type: "application/octet-stream",
        bytes: vec![b'0'; MAX_UPLOAD_BYTES + 1],
    };
    let (status, _) = send(&h.app, query_request(&[big_text, question("q")])).await;
    assert!(status.is_client_error());
    assert_eq!(h.extractor_calls(), 0);
}

#[tokio::test]
async fn body_over_the_route_limit_is_refused() {
    let h = harness(document("text"));
    let (status, _) = send(
        &h.app,
        query_request(&[
            pdf_part(vec![b'0'; MAX_UPLOAD_BYTES / 2]),
            pdf_part(vec![b'0'; MAX_UPLOAD_BYTES / 2 + 128 * 1024]),
            question("q"),
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(h.extractor_calls(), 0);
}

#[tokio::test]
async fn non_multipart_body_is_a_bad_request() {
    let h = harness(document("text"));
    let request = Request::post("/api/query")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"question":"hi"}"#))
        .unwrap();
    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn extraction_failure_is_a_server_error() {
    let h = harness(StubExtractor {
        fail: true,
        ..Default::default()
    });
    let (status, body) = send(
        &h.app,
        query_request(&[pdf_part(b"%PDF-broken".to_vec()), question("What is this?")]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    assert_eq!(h.backend_calls(), 0);
}

#[tokio::test]
async fn long_documents_are_truncated_in_the_prompt() {
    let text: String = "0123456789".repeat(3_500);
    let h = harness(document(&text));
    let (status, _) = send(
        &h.app,
        query_request(&[pdf_part(b"%PDF-1.4".to_vec()), question("Summarise")]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let requests = h.backend.requests.lock().unwrap();
    assert_eq!(
        requests[0].messages[1].content,
        format!("PDF content:\n{}\n\nQuestion: Summarise", &text[..MAX_DOCUMENT_CHARS])
    );
}

#[tokio::test]
async fn identical_requests_get_identical_answers() {
    let h = harness(document("Same document."));
    let parts = || [pdf_part(b"%PDF-1.4".to_vec()), question("What is this?")];

    let first = send(&h.app, query_request(&parts())).await;
    let second = send(&h.app, query_request(&parts())).await;

    assert_eq!(first, second);
    assert_eq!(first.0, StatusCode::OK);
    let requests = h.backend.requests.lock().unwrap();
    assert_eq!(requests[0], requests[1]);
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let h = harness(document(""));
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/query")
        .header(header::ORIGIN, ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&HeaderValue::from_static(ORIGIN))
    );
}

fn upstream_app(server: &MockServer) -> Router {
    let config = Config {
        api_key: "gsk_test_key".to_string(),
        api_url: format!("{}/openai/v1/chat/completions", server.uri()),
        model: "llama-3.3-70b-versatile".to_string(),
        port: 0,
        allowed_origins: vec![ORIGIN.to_string()],
        upstream_timeout: Duration::from_secs(5),
    };
    let completion = ChatCompletionClient::new(&config).unwrap();
    let service = QueryService::new(
        Arc::new(document("Rent is $900 per month.")),
        Arc::new(completion),
        config.model.clone(),
    );
    router(AppState::new(service), &config.allowed_origins)
}

#[tokio::test]
async fn relays_trimmed_upstream_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "\n  The rent is $900.  " } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = upstream_app(&server);
    let (status, body) = send(
        &app,
        query_request(&[pdf_part(b"%PDF-1.4".to_vec()), question("How much is rent?")]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "answer": "The rent is $900." }));
}

#[tokio::test]
async fn relays_upstream_error_message_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached for model llama-3.3-70b-versatile" }
        })))
        .mount(&server)
        .await;

    let app = upstream_app(&server);
    let (status, body) = send(
        &app,
        query_request(&[pdf_part(b"%PDF-1.4".to_vec()), question("How much is rent?")]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Rate limit reached for model llama-3.3-70b-versatile" })
    );
}

#[tokio::test]
async fn relays_error_body_sent_with_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "message": "Organization has been restricted" }
        })))
        .mount(&server)
        .await;

    let app = upstream_app(&server);
    let (status, body) = send(
        &app,
        query_request(&[pdf_part(b"%PDF-1.4".to_vec()), question("How much is rent?")]),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Organization has been restricted" }));
}
