//! Common test setup: engine wiring and a fake TheHive upstream.

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use incident_core::{IncidentProvider, RiskStore};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use worker::{EngineConfig, IncidentProcessor, SyncEngine};

/// Engine config with millisecond backoff, for tests that run in real time.
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        max_retries: 3,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(40),
        interval: Duration::from_secs(60),
    }
}

/// Builds an idle engine over `provider` and `store`.
pub fn engine_with(
    provider: Arc<dyn IncidentProvider>,
    store: Arc<dyn RiskStore>,
    config: EngineConfig,
) -> Arc<SyncEngine> {
    let processor = IncidentProcessor::new(store);
    Arc::new(SyncEngine::new(provider, processor, config).expect("valid engine config"))
}

#[derive(Default)]
struct FakeState {
    status: Mutex<Option<StatusCode>>,
    body: Mutex<String>,
    delay: Mutex<Duration>,
    authorizations: Mutex<Vec<String>>,
    content_types: Mutex<Vec<String>>,
    last_query: Mutex<Option<String>>,
    requests: AtomicU32,
}

/// In-process stand-in for TheHive's `GET /api/case`.
///
/// Serves whatever status, body and delay the test configured, and records
/// the headers of each request.
pub struct FakeTheHive {
    addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeTheHive {
    /// Binds an ephemeral port and starts serving. Defaults to 200 with an
    /// empty case list.
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        *state.body.lock() = crate::fixtures::thehive_response(Vec::new());

        let app = Router::new()
            .route("/api/case", get(list_cases))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake TheHive");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn respond_with(&self, status: StatusCode, body: impl Into<String>) {
        *self.state.status.lock() = Some(status);
        *self.state.body.lock() = body.into();
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock() = delay;
    }

    pub fn requests(&self) -> u32 {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn authorizations(&self) -> Vec<String> {
        self.state.authorizations.lock().clone()
    }

    pub fn content_types(&self) -> Vec<String> {
        self.state.content_types.lock().clone()
    }

    pub fn last_query(&self) -> Option<String> {
        self.state.last_query.lock().clone()
    }
}

async fn list_cases(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    if let Some(auth) = header_value(header::AUTHORIZATION) {
        state.authorizations.lock().push(auth);
    }
    if let Some(content_type) = header_value(header::CONTENT_TYPE) {
        state.content_types.lock().push(content_type);
    }
    *state.last_query.lock() = query;

    let delay = *state.delay.lock();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let status = state.status.lock().unwrap_or(StatusCode::OK);
    let body = state.body.lock().clone();

    (status, [(header::CONTENT_TYPE, "application/json")], body)
}
