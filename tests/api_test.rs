//! End-to-end tests for the HTTP API
//!
//! Boots the server on an ephemeral port with the in-memory store and all
//! upstream services mocked by a single wiremock server.

use clap::Parser;
use healthbot::db::InMemoryHealthStore;
use healthbot::reference::seed_quizzes;
use healthbot::{serve, AppState, Args};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct TestServer {
    base: String,
    client: reqwest::Client,
    store: Arc<InMemoryHealthStore>,
    upstream: MockServer,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<healthbot::Result<()>>,
    _cache: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let upstream = MockServer::start().await;
        let cache = TempDir::new().unwrap();
        let uri = upstream.uri();

        let args = Args::parse_from([
            "healthbot".to_string(),
            "--dev-mode".to_string(),
            "--anonymization-salt".to_string(),
            "test-salt".to_string(),
            "--classifier-url".to_string(),
            format!("{}/classify", uri),
            "--llm-api-url".to_string(),
            format!("{}/llm", uri),
            "--llm-api-key".to_string(),
            "test-key".to_string(),
            "--translation-url".to_string(),
            format!("{}/translate", uri),
            "--translation-api-key".to_string(),
            "test-key".to_string(),
            "--tts-url".to_string(),
            format!("{}/tts", uri),
            "--cache-dir".to_string(),
            cache.path().display().to_string(),
        ]);

        let store = Arc::new(InMemoryHealthStore::new());
        seed_quizzes(store.as_ref()).await.unwrap();

        let state = Arc::new(AppState::new(args, store.clone()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(listener, state, async {
            let _ = rx.await;
        }));

        Self {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
            store,
            upstream,
            shutdown: Some(tx),
            handle,
            _cache: cache,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Value) -> (u16, Value) {
        let response = self
            .client
            .request(method, self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        self.send(reqwest::Method::POST, path, body).await
    }

    async fn quiz_id(&self, title: &str) -> String {
        let (_, body) = self.get("/gamification/quizzes").await;
        body["quizzes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|q| q["title"] == title)
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

async fn mock_classifier(server: &TestServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/classify"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server.upstream)
        .await;
}

#[tokio::test]
async fn test_health_reports_memory_store() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["healthy"], true);
    assert_eq!(body["store"], "memory");

    let (status, body) = server.get("/version").await;
    assert_eq!(status, 200);
    assert_eq!(body["service"], "healthbot");
}

#[tokio::test]
async fn test_chat_uses_confident_classifier() {
    let server = TestServer::start().await;
    mock_classifier(
        &server,
        200,
        json!({"text": "Hello! How can I help?", "confidence": 0.9, "intent": {"name": "greeting"}}),
    )
    .await;

    let (status, body) = server
        .post("/chat", json!({"message": "hello", "user_id": "user_001"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["source"], "classifier");
    assert_eq!(body["response"], "Hello! How can I help?");
    assert_eq!(body["language"], "en-IN");
    assert_eq!(server.store.conversation_count(), 1);

    let (status, body) = server.get("/chat/user_001/history?limit=5").await;
    assert_eq!(status, 200);
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["message"], "hello");
    assert_ne!(body["user_id"], "user_001");
}

#[tokio::test]
async fn test_chat_falls_through_to_llm() {
    let server = TestServer::start().await;
    mock_classifier(&server, 500, json!({})).await;
    Mock::given(method("POST"))
        .and(path("/llm/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "  Drink boiled water.  "}}]
        })))
        .mount(&server.upstream)
        .await;

    let (status, body) = server
        .post("/chat", json!({"message": "how to avoid cholera"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["source"], "llm");
    assert_eq!(body["response"], "Drink boiled water.");
}

#[tokio::test]
async fn test_chat_falls_back_to_rules() {
    let server = TestServer::start().await;
    // Low confidence is rejected; the LLM endpoint is unmocked and fails
    mock_classifier(
        &server,
        200,
        json!({"text": "?", "confidence": 0.3, "intent": {"name": "greeting"}}),
    )
    .await;

    let (status, body) = server
        .post("/chat", json!({"message": "what are the symptoms of dengue"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["source"], "fallback");
    assert!(body["response"].as_str().unwrap().contains("Dengue"));
}

#[tokio::test]
async fn test_chat_rejects_blank_message() {
    let server = TestServer::start().await;
    let (status, body) = server.post("/chat", json!({"message": "   "})).await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(server.store.conversation_count(), 0);
}

#[tokio::test]
async fn test_user_lifecycle() {
    let server = TestServer::start().await;

    let (status, body) = server
        .post(
            "/users",
            json!({"user_id": "asha", "district": "Puri", "language": "or-IN", "age": 34}),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(body["user_id"], "asha");

    let (status, _) = server
        .post("/users", json!({"user_id": "asha", "district": "Puri"}))
        .await;
    assert_eq!(status, 409);

    let (status, body) = server.get("/users/asha").await;
    assert_eq!(status, 200);
    assert_eq!(body["district"], "Puri");
    assert_eq!(body["language"], "or-IN");
    assert_ne!(body["user_id"], "asha");

    let (status, _) = server
        .send(
            reqwest::Method::PUT,
            "/users/asha/preferences",
            json!({"district": "Cuttack", "receive_alerts": true}),
        )
        .await;
    assert_eq!(status, 200);
    let (_, body) = server.get("/users/asha").await;
    assert_eq!(body["district"], "Cuttack");
    assert_eq!(body["receive_alerts"], true);

    let (status, _) = server.get("/users/nobody").await;
    assert_eq!(status, 404);

    let (status, _) = server
        .send(
            reqwest::Method::PUT,
            "/users/nobody/preferences",
            json!({"language": "hi-IN"}),
        )
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_generated_user_id() {
    let server = TestServer::start().await;
    let (status, body) = server.post("/users", json!({"district": "Khordha"})).await;
    assert_eq!(status, 201);
    let user_id = body["user_id"].as_str().unwrap().to_string();
    assert_eq!(user_id.len(), 36);

    let (status, _) = server.get(&format!("/users/{}", user_id)).await;
    assert_eq!(status, 200);

    let (status, _) = server.post("/users", json!({"user_id": "x"})).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_quiz_submission_flow() {
    let server = TestServer::start().await;
    let quiz_id = server.quiz_id("Nutrition Knowledge").await;

    let (status, body) = server
        .post(
            "/gamification/quiz",
            json!({"user_id": "ravi", "quiz_id": quiz_id, "answers": ["Vitamin D"]}),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(server.store.quiz_result_count(), 0);

    let (status, body) = server
        .post(
            "/gamification/quiz",
            json!({"user_id": "ravi", "quiz_id": quiz_id, "answers": ["vitamin d", "Lentils and pulses"]}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["score"], 2);
    assert_eq!(body["badge"], "Health Champion");
    assert_eq!(server.store.quiz_result_count(), 1);

    let (status, body) = server.get("/gamification/ravi/results").await;
    assert_eq!(status, 200);
    assert_eq!(body["results"][0]["quiz_id"], quiz_id.as_str());

    let (status, _) = server.get("/gamification/nobody/results").await;
    assert_eq!(status, 404);

    let (status, _) = server
        .post(
            "/gamification/quiz",
            json!({"user_id": "ravi", "quiz_id": "64b7f0000000000000000000", "answers": ["a"]}),
        )
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_quiz_listing_hides_answers() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/gamification/quizzes").await;
    assert_eq!(status, 200);
    assert_eq!(body["quizzes"].as_array().unwrap().len(), 2);
    assert!(!body.to_string().contains("correct_answer"));
}

#[tokio::test]
async fn test_disease_info_is_translated() {
    let server = TestServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translatedText": "ଅନୁବାଦ"})))
        .expect(3)
        .mount(&server.upstream)
        .await;

    let (status, body) = server.get("/health/disease-info/Malaria").await;
    assert_eq!(status, 200);
    assert!(body["symptoms"].as_str().unwrap().starts_with("Fever, chills"));

    let (status, body) = server
        .get("/health/disease-info/malaria?language=or-IN")
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["symptoms"], "ଅନୁବାଦ");
    assert_eq!(body["treatment"], "ଅନୁବାଦ");

    let (status, _) = server.get("/health/disease-info/..%2Fetc").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_vaccination_schedule_and_alerts() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/health/vaccination-schedule?age=9").await;
    assert_eq!(status, 200);
    assert_eq!(body["age"], 9);
    assert_eq!(body["schedule"], "Measles-Rubella-1, JE-1 at 9-12 months");

    let (status, _) = server.get("/health/vaccination-schedule").await;
    assert_eq!(status, 400);

    let (status, body) = server.get("/health/outbreak-alerts/Bhubaneswar").await;
    assert_eq!(status, 200);
    assert_eq!(body["district"], "Bhubaneswar");
    assert_eq!(body["alerts"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_assistant_endpoints() {
    let server = TestServer::start().await;

    let (status, body) = server
        .post(
            "/assistant/symptom-advice",
            json!({"symptom": "headache", "severity": "mild", "age": 30}),
        )
        .await;
    assert_eq!(status, 200);
    assert!(body["advice"].as_str().unwrap().contains("Headache"));

    let (status, body) = server
        .post("/assistant/symptom-advice", json!({"symptom": "chest pain"}))
        .await;
    assert_eq!(status, 200);
    assert!(body["advice"].as_str().unwrap().contains("EMERGENCY"));

    let (status, body) = server
        .post("/assistant/next-steps", json!({"symptom": "fever", "duration": "3 weeks"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["urgency"], "medium");

    let (status, body) = server
        .post(
            "/assistant/emergency-check",
            json!({"message": "my father can't breathe"}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["emergency"], true);

    let (status, body) = server
        .post("/assistant/prevention-tips", json!({}))
        .await;
    assert_eq!(status, 200);
    assert!(body["tips"].as_str().unwrap().starts_with("🛡️"));
}

#[tokio::test]
async fn test_tts_returns_mp3_attachment() {
    let server = TestServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tts"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3".to_vec()))
        .mount(&server.upstream)
        .await;

    let response = server
        .client
        .post(server.url("/tts"))
        .json(&json!({"text": "Drink clean water", "language": "or-IN"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers()["content-type"], "audio/mpeg");
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"speech.mp3\""
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"ID3");

    let (status, _) = server.post("/tts", json!({"text": "  "})).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_unknown_route_and_preflight() {
    let server = TestServer::start().await;
    let (status, body) = server.get("/nope").await;
    assert_eq!(status, 404);
    assert_eq!(body["code"], "NOT_FOUND");

    let response = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/chat"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_shutdown_stops_server() {
    let mut server = TestServer::start().await;
    server.shutdown.take().unwrap().send(()).unwrap();
    let result = (&mut server.handle).await.unwrap();
    assert!(result.is_ok());
}
