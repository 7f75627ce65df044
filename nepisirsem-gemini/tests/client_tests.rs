//! Client tests against a local axum server that mimics the Gemini REST API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
};
use nepisirsem_gemini::{Error, GeminiBuilder, Model, TaskType};
use serde_json::{Value, json};
use url::Url;

#[derive(Debug, Clone)]
struct Captured {
    call: String,
    api_key: Option<String>,
    body: Value,
}

type Requests = Arc<Mutex<Vec<Captured>>>;

async fn handle(
    State(requests): State<Requests>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let api_key =
        headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()).map(ToString::to_string);
    requests.lock().unwrap().push(Captured { call: call.clone(), api_key, body: body.clone() });

    if call.starts_with("slow-model:") {
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
    if call.starts_with("quota-model:") {
        return Err((StatusCode::TOO_MANY_REQUESTS, "quota exceeded".to_string()));
    }

    if call.ends_with(":generateContent") {
        Ok(Json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "Menemen hazır."}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5}
        })))
    } else if call.ends_with(":batchEmbedContents") {
        let count = body["requests"].as_array().map(Vec::len).unwrap_or(0);
        let embeddings: Vec<Value> =
            (0..count).map(|i| json!({"values": [i as f32, 1.0, 0.0]})).collect();
        Ok(Json(json!({ "embeddings": embeddings })))
    } else if call.ends_with(":embedContent") {
        Ok(Json(json!({"embedding": {"values": [0.5, 0.5, 0.0]}})))
    } else {
        Err((StatusCode::NOT_FOUND, format!("unknown call {call}")))
    }
}

async fn spawn_server() -> (Url, Requests, tokio::task::JoinHandle<()>) {
    let requests: Requests = Arc::default();
    let app =
        Router::new().route("/v1beta/models/{call}", post(handle)).with_state(requests.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    let base = Url::parse(&format!("http://{addr}/v1beta/")).unwrap();
    (base, requests, handle)
}

#[tokio::test]
async fn generate_content_sends_prompt_with_api_key_and_temperature() {
    let (base, requests, handle) = spawn_server().await;
    let gemini = GeminiBuilder::new("test-key")
        .with_model(Model::Gemini25Flash)
        .with_base_url(base)
        .build()
        .unwrap();

    let response = gemini
        .generate_content()
        .with_user_message("Menemen tarifi nedir?")
        .with_temperature(0.0)
        .execute()
        .await
        .unwrap();

    assert_eq!(response.text(), "Menemen hazır.");

    let captured = requests.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].call, "gemini-2.5-flash:generateContent");
    assert_eq!(captured[0].api_key.as_deref(), Some("test-key"));
    assert_eq!(captured[0].body["contents"][0]["parts"][0]["text"], "Menemen tarifi nedir?");
    assert_eq!(captured[0].body["contents"][0]["role"], "user");
    assert_eq!(captured[0].body["generationConfig"]["temperature"], 0.0);

    handle.abort();
}

#[tokio::test]
async fn embed_content_uses_task_type() {
    let (base, requests, handle) = spawn_server().await;
    let gemini = GeminiBuilder::new("test-key")
        .with_model(Model::TextEmbedding004)
        .with_base_url(base)
        .build()
        .unwrap();

    let response = gemini
        .embed_content()
        .with_text("yumurta")
        .with_task_type(TaskType::RetrievalQuery)
        .execute()
        .await
        .unwrap();

    assert_eq!(response.embedding.values, vec![0.5, 0.5, 0.0]);
    let captured = requests.lock().unwrap().clone();
    assert_eq!(captured[0].call, "text-embedding-004:embedContent");
    assert_eq!(captured[0].body["taskType"], "RETRIEVAL_QUERY");
    assert_eq!(captured[0].body["model"], "models/text-embedding-004");

    handle.abort();
}

#[tokio::test]
async fn batch_embed_preserves_order() {
    let (base, requests, handle) = spawn_server().await;
    let gemini = GeminiBuilder::new("test-key")
        .with_model(Model::TextEmbedding004)
        .with_base_url(base)
        .build()
        .unwrap();

    let response = gemini
        .embed_content()
        .with_chunks(vec!["bir".into(), "iki".into(), "üç".into()])
        .with_task_type(TaskType::RetrievalDocument)
        .execute_batch()
        .await
        .unwrap();

    let firsts: Vec<f32> = response.embeddings.iter().map(|e| e.values[0]).collect();
    assert_eq!(firsts, vec![0.0, 1.0, 2.0]);

    let captured = requests.lock().unwrap().clone();
    assert_eq!(captured[0].call, "text-embedding-004:batchEmbedContents");
    assert_eq!(captured[0].body["requests"][2]["content"]["parts"][0]["text"], "üç");

    handle.abort();
}

#[tokio::test]
async fn error_status_is_reported_as_transient_bad_response() {
    let (base, _requests, handle) = spawn_server().await;
    let gemini = GeminiBuilder::new("test-key")
        .with_model("quota-model")
        .with_base_url(base)
        .build()
        .unwrap();

    let err = gemini.generate_content().with_user_message("merhaba").execute().await.unwrap_err();
    match &err {
        Error::BadResponse { code, description } => {
            assert_eq!(*code, 429);
            assert_eq!(description.as_deref(), Some("quota exceeded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_transient());

    handle.abort();
}

#[tokio::test]
async fn request_timeout_is_a_transient_transport_error() {
    let (base, _requests, handle) = spawn_server().await;
    let gemini = GeminiBuilder::new("test-key")
        .with_model("slow-model")
        .with_base_url(base)
        .with_timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = gemini.generate_content().with_user_message("merhaba").execute().await.unwrap_err();
    assert!(matches!(err, Error::PerformRequest { .. }), "{err:?}");
    assert!(err.is_transient());

    handle.abort();
}
