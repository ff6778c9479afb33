use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub const PATH_AD: &str = "/ad";
pub const PATH_STATS: &str = "/stats";
pub const PATH_HEALTH: &str = "/health";
pub const PATH_OK: &str = "/ok";
pub const PATH_FAIL: &str = "/fail";
pub const PATH_SLOW: &str = "/slow";

/// Delay used by `/slow` when no `ms` is given.
pub const DEFAULT_SLOW_MS: u64 = 1_000;

pub const DEFAULT_FRAMEWORK: &str = "testserver";

#[derive(Debug, Clone)]
pub struct TestServerStats {
    framework: Arc<str>,
    requests_total: Arc<AtomicU64>,
    redirects_total: Arc<AtomicU64>,
}

impl TestServerStats {
    pub fn new(framework: &str) -> Self {
        Self {
            framework: Arc::from(framework),
            requests_total: Arc::new(AtomicU64::new(0)),
            redirects_total: Arc::new(AtomicU64::new(0)),
        }
    }

    fn inc_requests_total(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_redirects_total(&self) {
        self.redirects_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn framework(&self) -> &str {
        &self.framework
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn redirects_total(&self) -> u64 {
        self.redirects_total.load(Ordering::Relaxed)
    }
}

impl Default for TestServerStats {
    fn default() -> Self {
        Self::new(DEFAULT_FRAMEWORK)
    }
}

#[derive(Debug, Clone)]
pub struct TestServerUrls {
    pub base_url: String,
    pub stats: String,
    pub health: String,
    pub ok: String,
    pub fail: String,
}

impl TestServerUrls {
    pub fn new(base_url: String) -> Self {
        Self {
            stats: format!("{base_url}{PATH_STATS}"),
            health: format!("{base_url}{PATH_HEALTH}"),
            ok: format!("{base_url}{PATH_OK}"),
            fail: format!("{base_url}{PATH_FAIL}"),
            base_url,
        }
    }

    pub fn ad(&self, id: &str) -> String {
        format!("{}{PATH_AD}?id={id}", self.base_url)
    }

    pub fn slow(&self, ms: u64) -> String {
        format!("{}{PATH_SLOW}?ms={ms}", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct StatsResponse<'a> {
    framework: &'a str,
    requests: u64,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    time: String,
}

async fn handle_ad(
    State(stats): State<TestServerStats>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    stats.inc_requests_total();

    let Some(id) = query.get("id").filter(|id| !id.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing ad id").into_response();
    };

    stats.inc_redirects_total();
    let location = format!("https://example.com/product/{id}");
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

async fn handle_stats(State(stats): State<TestServerStats>) -> Response {
    Json(StatsResponse {
        framework: stats.framework(),
        requests: stats.requests_total(),
    })
    .into_response()
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        time: chrono::Utc::now().to_rfc3339(),
    })
}

async fn handle_ok(State(stats): State<TestServerStats>) -> &'static str {
    stats.inc_requests_total();
    "ok"
}

async fn handle_fail(State(stats): State<TestServerStats>) -> (StatusCode, &'static str) {
    stats.inc_requests_total();
    (StatusCode::INTERNAL_SERVER_ERROR, "fail")
}

async fn handle_slow(
    State(stats): State<TestServerStats>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    stats.inc_requests_total();

    let ms = match query.get("ms").map(|v| v.parse::<u64>()) {
        None => DEFAULT_SLOW_MS,
        Some(Ok(ms)) => ms,
        Some(Err(_)) => return (StatusCode::BAD_REQUEST, "invalid ms").into_response(),
    };

    tokio::time::sleep(Duration::from_millis(ms)).await;
    "slow".into_response()
}

pub fn router(stats: TestServerStats) -> Router {
    Router::new()
        .route(PATH_AD, get(handle_ad))
        .route(PATH_STATS, get(handle_stats))
        .route(PATH_HEALTH, get(handle_health))
        .route(PATH_OK, get(handle_ok))
        .route(PATH_FAIL, get(handle_fail))
        .route(PATH_SLOW, get(handle_slow))
        .with_state(stats)
}

pub struct TestServer {
    addr: SocketAddr,
    base_url: String,
    urls: TestServerUrls,
    stats: TestServerStats,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> std::io::Result<Self> {
        Self::start_named(DEFAULT_FRAMEWORK).await
    }

    pub async fn start_named(framework: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stats = TestServerStats::new(framework);

        let app = router(stats.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        let base_url = format!("http://{addr}");
        let urls = TestServerUrls::new(base_url.clone());

        Ok(Self {
            addr,
            base_url,
            urls,
            stats,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn urls(&self) -> &TestServerUrls {
        &self.urls
    }

    pub fn stats(&self) -> &TestServerStats {
        &self.stats
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some() {
            if let Some(task) = self.task.take() {
                task.abort();
            }
        }
    }
}
