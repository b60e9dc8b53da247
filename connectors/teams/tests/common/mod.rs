#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use omni_teams_connector::{
    AuthError, CompletionBackend, CompletionRequest, LlmError, TokenProvider,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct MockResponse {
    status: StatusCode,
    content_type: &'static str,
    body: String,
    delay: Option<Duration>,
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    routes: Arc<Mutex<Vec<(String, MockResponse)>>>,
}

/// In-process stand-in for Graph, the Entra token endpoint and Azure OpenAI.
///
/// Routes match on exact path first, then on the longest registered prefix.
/// A route registered with a delay sleeps before answering.
pub struct MockGraphServer {
    pub base_url: String,
    state: MockState,
    _server_handle: tokio::task::JoinHandle<()>,
}

impl MockGraphServer {
    pub async fn start() -> anyhow::Result<Self> {
        let state = MockState::default();

        let app = Router::new()
            .fallback(handle_request)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        sleep(Duration::from_millis(50)).await;

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            _server_handle: server_handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn respond(
        &self,
        path: &str,
        status: StatusCode,
        content_type: &'static str,
        body: String,
        delay: Option<Duration>,
    ) {
        self.state.routes.lock().unwrap().push((
            path.to_string(),
            MockResponse {
                status,
                content_type,
                body,
                delay,
            },
        ));
    }

    pub fn respond_json(&self, path: &str, status: StatusCode, body: serde_json::Value) {
        self.respond(path, status, "application/json", body.to_string(), None);
    }

    pub fn respond_text(&self, path: &str, status: StatusCode, body: &str) {
        self.respond(path, status, "text/vtt", body.to_string(), None);
    }

    pub fn respond_json_after(
        &self,
        delay: Duration,
        path: &str,
        status: StatusCode,
        body: serde_json::Value,
    ) {
        self.respond(path, status, "application/json", body.to_string(), Some(delay));
    }

    pub fn respond_text_after(&self, delay: Duration, path: &str, status: StatusCode, body: &str) {
        self.respond(path, status, "text/vtt", body.to_string(), Some(delay));
    }

    pub fn mock_token(&self, authority_path: &str) {
        self.respond_json(
            &format!("{}/oauth2/v2.0/token", authority_path),
            StatusCode::OK,
            serde_json::json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "mock-token"
            }),
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_matching(&self, fragment: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.contains(fragment))
            .collect()
    }
}

async fn handle_request(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();

    let recorded_headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        headers: recorded_headers,
        body,
    });

    let routes = state.routes.lock().unwrap().clone();
    let matched = routes
        .iter()
        .find(|(route, _)| *route == path)
        .or_else(|| {
            routes
                .iter()
                .filter(|(route, _)| path.starts_with(route.as_str()))
                .max_by_key(|(route, _)| route.len())
        })
        .map(|(_, response)| response.clone());

    match matched {
        Some(response) => {
            if let Some(delay) = response.delay {
                sleep(delay).await;
            }
            (
                response.status,
                [(header::CONTENT_TYPE, response.content_type)],
                response.body,
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("no mock for {}", path)).into_response(),
    }
}

pub fn vtt(lines: &[(&str, &str)]) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for (i, (speaker, text)) in lines.iter().enumerate() {
        out.push_str(&format!(
            "{}\n00:00:{:02}.000 --> 00:00:{:02}.500\n<v {}>{}</v>\n\n",
            i + 1,
            i,
            i,
            speaker,
            text
        ));
    }
    out
}

pub struct StaticToken;

#[async_trait]
impl TokenProvider for StaticToken {
    async fn get_bearer_token(&self) -> Result<String, AuthError> {
        Ok("static-token".to_string())
    }
}

/// Completion backend that answers with a fixed text and records every request.
pub struct RecordingBackend {
    reply: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl RecordingBackend {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for RecordingBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<Option<String>, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(Some(self.reply.clone()))
    }
}
