//! Local stand-in for the completion endpoint, used by async tests.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::settings::Settings;

#[derive(Debug, Clone)]
pub(crate) struct SeenRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

pub(crate) struct FakeEndpoint {
    pub url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FakeEndpoint {
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// Settings pointing at this endpoint with a dummy key
    pub fn settings(&self) -> Settings {
        Settings {
            api_key: Some("test-key".to_string()),
            endpoint: self.url.clone(),
            ..Settings::default()
        }
    }
}

async fn handle(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state.seen.lock().unwrap().push(SeenRequest { authorization, body });

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

/// Serve `body` with `status` for every POST to /v1/chat/completions
pub(crate) async fn spawn_fake_endpoint(status: u16, body: String) -> FakeEndpoint {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let state = FakeState {
        status: StatusCode::from_u16(status).unwrap(),
        body,
        seen: seen.clone(),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(handle))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeEndpoint {
        url: format!("http://{}/v1/chat/completions", addr),
        seen,
    }
}

/// Completion envelope whose first choice carries `content`
pub(crate) fn completion_body(content: &str) -> String {
    json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"total_tokens": 17}
    })
    .to_string()
}

/// Fake endpoint that answers every request with `content`
pub(crate) async fn spawn_completion(content: &str) -> FakeEndpoint {
    spawn_fake_endpoint(200, completion_body(content)).await
}
