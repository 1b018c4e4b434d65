//! Integration tests for the chat HTTP surface.
//!
//! Each test spins up an Axum server on a random port and drives it with
//! reqwest, exercising the real request/response contract.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use onboard_assist::config::AssistConfig;
use onboard_assist::error::LlmError;
use onboard_assist::knowledge::{Chunk, ContentStore};
use onboard_assist::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
};
use onboard_assist::session::{SessionDispatcher, chat_routes};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stub LLM provider (no real API calls).
struct StubLlm {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(LlmError::RequestFailed {
                provider: "stub".to_string(),
                reason: "unreachable".to_string(),
            });
        }
        Ok(CompletionResponse {
            content: "We offer tax advisory and capital raising.".to_string(),
            input_tokens: 0,
            output_tokens: 0,
            finish_reason: FinishReason::Stop,
        })
    }
}

fn stub(fail: bool) -> Arc<StubLlm> {
    Arc::new(StubLlm {
        calls: AtomicUsize::new(0),
        fail,
    })
}

/// Start an Axum server on a random port, return its base URL.
async fn start_server(content: ContentStore, llm: Option<Arc<StubLlm>>) -> String {
    let llm = llm.map(|l| l as Arc<dyn LlmProvider>);
    let dispatcher = SessionDispatcher::new(&AssistConfig::default(), Arc::new(content), llm);
    let app = chat_routes(Arc::new(dispatcher));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

fn services_store() -> ContentStore {
    ContentStore::from_chunks(vec![
        Chunk::new(
            "Our services include tax advisory and capital raising.",
            "https://example.com/services",
        )
        .with_title("Services"),
        Chunk::new("Contact us at our Fort Lauderdale office.", "https://example.com/contact"),
    ])
}

async fn send(client: &reqwest::Client, base: &str, session: &str, message: &str) -> Value {
    let resp = client
        .post(format!("{base}/chat"))
        .json(&json!({"session_id": session, "message": message}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn full_conversation_goes_online_after_onboarding() {
    timeout(TEST_TIMEOUT, async {
        let llm = stub(false);
        let base = start_server(services_store(), Some(llm.clone())).await;
        let client = reqwest::Client::new();

        let greeting = send(&client, &base, "visitor-1", "").await;
        assert_eq!(greeting["stage"], "need_name");
        assert!(greeting["response"].as_str().unwrap().contains("Occams Advisory"));

        let bad_name = send(&client, &base, "visitor-1", "").await;
        assert_eq!(bad_name["stage"], "need_name");

        send(&client, &base, "visitor-1", "Alice").await;
        let bad_email = send(&client, &base, "visitor-1", "alice-at-example").await;
        assert_eq!(bad_email["stage"], "need_email");
        assert_eq!(bad_email["mode"], "onboarding");

        send(&client, &base, "visitor-1", "alice@x.com").await;
        let done = send(&client, &base, "visitor-1", "+1 (555) 123-4567").await;
        assert_eq!(done["stage"], "complete");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);

        let answer = send(&client, &base, "visitor-1", "What services do you offer?").await;
        assert_eq!(answer["mode"], "online");
        assert_eq!(answer["response"], "We offer tax advisory and capital raising.");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn provider_outage_degrades_to_offline() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(services_store(), Some(stub(true))).await;
        let client = reqwest::Client::new();

        for message in ["", "Bob", "bob@example.com", "5551234567"] {
            send(&client, &base, "visitor-2", message).await;
        }

        let answer = send(&client, &base, "visitor-2", "Which services do you provide?").await;
        assert_eq!(answer["mode"], "offline");
        let text = answer["response"].as_str().unwrap();
        assert!(text.starts_with("[Offline Mode]"));
        assert!(text.contains("tax advisory"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn empty_store_answers_no_info() {
    timeout(TEST_TIMEOUT, async {
        let llm = stub(false);
        let base = start_server(ContentStore::empty(), Some(llm.clone())).await;
        let client = reqwest::Client::new();

        for message in ["", "Carol", "carol@example.com", "+44 20 7946 0958"] {
            send(&client, &base, "visitor-3", message).await;
        }

        let answer = send(&client, &base, "visitor-3", "What services do you offer?").await;
        assert_eq!(answer["mode"], "offline");
        assert!(answer["response"].as_str().unwrap().contains("couldn't find information"));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn session_endpoint_hides_values() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(services_store(), None).await;
        let client = reqwest::Client::new();

        for message in ["", "Dana", "dana@example.com"] {
            send(&client, &base, "visitor-4", message).await;
        }

        let resp = client
            .get(format!("{base}/api/sessions/visitor-4"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body = resp.text().await.unwrap();
        assert!(!body.contains("Dana"));
        assert!(!body.contains("dana@example.com"));

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["stage"], "need_phone");
        assert_eq!(json["collected_fields"], json!(["name", "email"]));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn blank_session_id_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(services_store(), None).await;
        let resp = reqwest::Client::new()
            .post(format!("{base}/chat"))
            .json(&json!({"session_id": "  ", "message": "hello"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn health_endpoint() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(services_store(), None).await;
        let json: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["chunks"], 2);
    })
    .await
    .expect("test timed out");
}
