//! HTTP transport for the log viewer.
//!
//! - `GET  /`: the deducer log, relation lines carrying a "why?" control
//! - `POST /why`: form fields `id_1`, `id_2`, `name`; plain-text proof trace,
//!   or `->` when the pair has no trace data
//! - `GET  /why/{sub}/{super}?name=0|1`: the proof trace as an HTML page
//! - `GET  /health`: server status
//!
//! Store lookups are synchronous and run on the blocking pool.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use askama::Template;
use axum::extract::{Form, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::class::RelationKey;
use crate::error::WhyError;
use crate::explain::{Explainer, Explanation};
use crate::logfile::{LogLine, read_log};
use crate::store::TraceStore;

const FAILURE_MESSAGE: &str = "An error occurred while reading the trace data.";

// ── Server state ──────────────────────────────────────────────────────────

/// Shared state: one explainer over a shared store, and the log to display.
pub struct AppState {
    explainer: Explainer<Arc<dyn TraceStore>>,
    log_path: PathBuf,
}

impl AppState {
    pub fn new(explainer: Explainer<Arc<dyn TraceStore>>, log_path: PathBuf) -> Self {
        Self {
            explainer,
            log_path,
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/why", post(why_text))
        .route("/why/{sub}/{sup}", get(why_page))
        .route("/health", get(health))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Request / response types ──────────────────────────────────────────────

/// Form posted by the "why?" control.
#[derive(Debug, Deserialize)]
pub struct WhyForm {
    pub id_1: u32,
    pub id_2: u32,
    #[serde(default)]
    pub name: u8,
}

#[derive(Debug, Deserialize)]
pub struct NamesQuery {
    #[serde(default)]
    pub name: u8,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

// ── Templates ─────────────────────────────────────────────────────────────

/// One log line prepared for the page.
pub struct LogRow {
    pub kind: &'static str,
    pub text: String,
    pub sub: u32,
    pub sup: u32,
}

impl From<LogLine> for LogRow {
    fn from(line: LogLine) -> Self {
        let kind = line.kind();
        match line {
            LogLine::Header(text) | LogLine::Banner(text) | LogLine::Text(text) => LogRow {
                kind,
                text,
                sub: 0,
                sup: 0,
            },
            LogLine::Relation { key, rest } => LogRow {
                kind,
                text: rest,
                sub: key.sub.get(),
                sup: key.sup.get(),
            },
        }
    }
}

#[derive(Template)]
#[template(path = "log.html")]
pub struct LogPageTemplate {
    pub rows: Vec<LogRow>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "explanation.html")]
pub struct ExplanationTemplate {
    pub sub: u32,
    pub sup: u32,
    pub with_names: bool,
    pub trace: Option<String>,
}

/// Renders an askama template as an HTML response.
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        use axum::response::Html;

        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("template rendering error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("template error: {err}"),
                )
                    .into_response()
            }
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn index(State(state): State<Arc<AppState>>) -> HtmlTemplate<LogPageTemplate> {
    let path = state.log_path.clone();
    let lines = tokio::task::spawn_blocking(move || read_log(&path)).await;
    let page = match lines {
        Ok(Ok(lines)) => LogPageTemplate {
            rows: lines.into_iter().map(LogRow::from).collect(),
            error: None,
        },
        Ok(Err(e)) => {
            tracing::error!("{e}");
            LogPageTemplate {
                rows: Vec::new(),
                error: Some(
                    "Could not open the log file. Please check everything is in place!".into(),
                ),
            }
        }
        Err(e) => {
            tracing::error!("log reader task failed: {e}");
            LogPageTemplate {
                rows: Vec::new(),
                error: Some(FAILURE_MESSAGE.into()),
            }
        }
    };
    HtmlTemplate(page)
}

async fn why_text(
    State(state): State<Arc<AppState>>,
    Form(form): Form<WhyForm>,
) -> Result<Response, (StatusCode, String)> {
    let key = RelationKey::new(form.id_1, form.id_2);
    let explanation = explain_blocking(state, key, form.name != 0).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        explanation.render(),
    )
        .into_response())
}

async fn why_page(
    State(state): State<Arc<AppState>>,
    Path((sub, sup)): Path<(u32, u32)>,
    Query(query): Query<NamesQuery>,
) -> Result<HtmlTemplate<ExplanationTemplate>, (StatusCode, String)> {
    let with_names = query.name != 0;
    let explanation = explain_blocking(state, RelationKey::new(sub, sup), with_names).await?;
    let trace = (!explanation.is_no_data()).then(|| explanation.render());
    Ok(HtmlTemplate(ExplanationTemplate {
        sub,
        sup,
        with_names,
        trace,
    }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn explain_blocking(
    state: Arc<AppState>,
    key: RelationKey,
    with_names: bool,
) -> Result<Explanation, (StatusCode, String)> {
    let result = tokio::task::spawn_blocking(move || state.explainer.trace(key, with_names)).await;
    match result {
        Ok(Ok(explanation)) => Ok(explanation),
        Ok(Err(e)) => {
            tracing::error!(%key, "{}", WhyError::from(e));
            Err((StatusCode::SERVICE_UNAVAILABLE, FAILURE_MESSAGE.to_string()))
        }
        Err(e) => {
            tracing::error!(%key, "explain task failed: {e}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, FAILURE_MESSAGE.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassId;
    use crate::error::StoreError;
    use crate::store::{MemStore, StoreResult};
    use crate::trace::{Dependency, StoredRelation};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn store() -> Arc<dyn TraceStore> {
        let store = MemStore::new();
        store.insert_relation(
            RelationKey::new(1, 16),
            StoredRelation::new("VB", vec![Dependency::new(1, 5), Dependency::new(5, 16)]),
        );
        store.insert_relation(RelationKey::new(1, 5), StoredRelation::leaf("direct"));
        store.insert_relation(RelationKey::new(5, 16), StoredRelation::leaf("direct"));
        store.insert_name(ClassId::new(1), "<Planar>");
        store.insert_name(ClassId::new(16), "Bipartite");
        Arc::new(store)
    }

    fn app_with(store: Arc<dyn TraceStore>, log_path: PathBuf) -> Router {
        let state = Arc::new(AppState::new(Explainer::new(store), log_path));
        router(state, Duration::from_secs(5))
    }

    fn app(log_path: PathBuf) -> Router {
        app_with(store(), log_path)
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_why(form: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/why")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn post_why_returns_trace() {
        let response = app(PathBuf::from("log.txt"))
            .oneshot(post_why("id_1=1&id_2=16&name=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "1 -> 16    VB\n    1 -> 5    direct\n    5 -> 16    direct\n"
        );
    }

    #[tokio::test]
    async fn post_why_with_names() {
        let response = app(PathBuf::from("log.txt"))
            .oneshot(post_why("id_1=1&id_2=16&name=1"))
            .await
            .unwrap();
        let body = body_text(response).await;
        assert!(body.starts_with("(1) <Planar> -> (16) Bipartite    VB\n"));
    }

    #[tokio::test]
    async fn post_why_no_data_sentinel() {
        let response = app(PathBuf::from("log.txt"))
            .oneshot(post_why("id_1=2&id_2=2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "->");
    }

    #[tokio::test]
    async fn post_why_rejects_bad_ids() {
        let response = app(PathBuf::from("log.txt"))
            .oneshot(post_why("id_1=one&id_2=16"))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn why_page_escapes_names() {
        let request = Request::builder()
            .uri("/why/1/16?name=1")
            .body(Body::empty())
            .unwrap();
        let response = app(PathBuf::from("log.txt")).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("&lt;Planar&gt;"));
        assert!(!body.contains("<Planar>"));
        assert!(body.contains("<pre"));
    }

    #[tokio::test]
    async fn why_page_no_data_message() {
        let request = Request::builder()
            .uri("/why/2/2")
            .body(Body::empty())
            .unwrap();
        let response = app(PathBuf::from("log.txt")).oneshot(request).await.unwrap();
        let body = body_text(response).await;
        assert!(body.contains("No trace data available for those two IDs"));
    }

    #[tokio::test]
    async fn index_lists_log_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = dir.path().join("log.txt");
        std::fs::write(&log, "# RCheckForbidden\n1 -> 16 $a$ -> $b$\n**done\n").unwrap();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app(log).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("<h3># RCheckForbidden</h3>"));
        assert!(body.contains("data-sub=\"1\""));
        assert!(body.contains("data-sup=\"16\""));
        assert!(body.contains("done"));
    }

    #[tokio::test]
    async fn index_reports_missing_log() {
        let dir = tempfile::TempDir::new().unwrap();
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app(dir.path().join("absent.txt"))
            .oneshot(request)
            .await
            .unwrap();
        let body = body_text(response).await;
        assert!(body.contains("Could not open the log file"));
    }

    struct DownStore;

    impl TraceStore for DownStore {
        fn lookup_relation(&self, _key: RelationKey) -> StoreResult<Option<StoredRelation>> {
            Err(StoreError::Unavailable {
                path: "trace.redb".into(),
                message: "locked".into(),
            })
        }

        fn lookup_name(&self, _id: ClassId) -> StoreResult<Option<String>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn store_failure_is_service_unavailable() {
        let response = app_with(Arc::new(DownStore), PathBuf::from("log.txt"))
            .oneshot(post_why("id_1=1&id_2=16"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_text(response).await, FAILURE_MESSAGE);
    }

    struct SlowStore;

    impl TraceStore for SlowStore {
        fn lookup_relation(&self, _key: RelationKey) -> StoreResult<Option<StoredRelation>> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(Some(StoredRelation::leaf("direct")))
        }

        fn lookup_name(&self, _id: ClassId) -> StoreResult<Option<String>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn slow_lookup_hits_request_deadline() {
        let state = Arc::new(AppState::new(
            Explainer::new(Arc::new(SlowStore) as Arc<dyn TraceStore>),
            PathBuf::from("log.txt"),
        ));
        let response = router(state, Duration::from_millis(50))
            .oneshot(post_why("id_1=1&id_2=16"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app(PathBuf::from("log.txt")).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("\"status\":\"ok\""));
    }
}
