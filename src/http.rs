//! JSON front end: crawl, switch layouts and fetch render series over HTTP.
//!
//! Sessions live in a bounded LRU map keyed by UUID; the caller passes the id
//! back explicitly on every request.

use crate::config::Config;
use crate::error::{Result, WikigraphError};
use crate::layout::LayoutKind;
use crate::render::RenderData;
use crate::session::{CrawlStatus, GraphSession, SessionSettings, SessionSummary};
use crate::source::ArticleSource;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Request body of `POST /graphs`
#[derive(Debug, Deserialize)]
pub struct CreateGraphRequest {
    pub topic: String,
    pub depth: Option<usize>,
    pub layout: Option<String>,
}

/// Request body of `PUT /graphs/{id}/layout`
#[derive(Debug, Deserialize)]
pub struct ChangeLayoutRequest {
    pub layout: String,
}

/// Session description plus its render series
#[derive(Debug, Serialize)]
pub struct GraphResponse {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub render: RenderData,
}

impl GraphResponse {
    fn from_session(session: &GraphSession) -> Result<Self> {
        Ok(Self {
            summary: session.summary(),
            render: session.render()?,
        })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    source: Arc<dyn ArticleSource>,
    settings: Arc<SessionSettings>,
    default_depth: usize,
    default_layout: LayoutKind,
    sessions: Arc<Mutex<LruCache<Uuid, GraphSession>>>,
}

/// HTTP server wrapper
pub struct HttpServer {
    state: AppState,
    allowed_origins: Vec<String>,
}

impl HttpServer {
    /// Create a new HTTP server over `source`
    pub fn new(source: Arc<dyn ArticleSource>, config: &Config) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.http_server.max_sessions).ok_or_else(|| {
            WikigraphError::Config("http_server.max_sessions must be greater than 0".to_string())
        })?;

        Ok(Self {
            state: AppState {
                source,
                settings: Arc::new(SessionSettings::from_config(config)),
                default_depth: config.crawl.default_depth,
                default_layout: config.default_layout()?,
                sessions: Arc::new(Mutex::new(LruCache::new(capacity))),
            },
            allowed_origins: config.http_server.allowed_origins.clone(),
        })
    }

    /// Run the HTTP server
    pub async fn run(&self, port: u16) -> Result<()> {
        let app = self.create_router();

        let addr = format!("127.0.0.1:{}", port);
        log::info!("Starting Wikigraph HTTP server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            WikigraphError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to bind to {}: {}. Use a different port by setting http_server.port in wikigraph.toml",
                    addr, e
                ),
            ))
        })?;

        axum::serve(listener, app).await.map_err(|e| {
            WikigraphError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            ))
        })?;

        Ok(())
    }

    /// Create the axum router
    pub fn create_router(&self) -> Router {
        let cors = if self.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<axum::http::HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/health", get(handle_health))
            .route("/layouts", get(handle_layouts))
            .route("/graphs", post(handle_create))
            .route("/graphs/:id", get(handle_get).delete(handle_delete))
            .route("/graphs/:id/layout", put(handle_layout))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(self.state.clone())
    }
}

/// Error wrapper mapping crate errors to HTTP responses
struct ApiError(WikigraphError);

impl From<WikigraphError> for ApiError {
    fn from(err: WikigraphError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            WikigraphError::SeedNotFound(_) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({ "status": CrawlStatus::SeedNotFound.to_string() })),
                )
                    .into_response();
            }
            WikigraphError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            WikigraphError::UnknownLayout(_) | WikigraphError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("Request failed: {}", self.0);
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(WikigraphError::InvalidInput(rejection.body_text()))
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Handle health check endpoint
async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "wikigraph",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
        .into_response()
}

/// List the layout algorithms
async fn handle_layouts() -> Json<serde_json::Value> {
    let layouts: Vec<serde_json::Value> = LayoutKind::ALL
        .iter()
        .map(|k| serde_json::json!({ "value": k.as_str(), "label": k.label() }))
        .collect();
    Json(serde_json::json!({ "layouts": layouts }))
}

/// Crawl a topic into a new session
async fn handle_create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateGraphRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<GraphResponse>)> {
    let Json(request) = payload?;
    let layout = match &request.layout {
        Some(name) => name.parse()?,
        None => state.default_layout,
    };
    let depth = request.depth.unwrap_or(state.default_depth);

    // Lock is taken only after the crawl
    let session =
        GraphSession::build(state.source.as_ref(), &state.settings, &request.topic, depth, layout).await?;
    let body = GraphResponse::from_session(&session)?;

    state.sessions.lock().await.put(session.id(), session);

    Ok((StatusCode::CREATED, Json(body)))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GraphResponse>> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get(&id)
        .ok_or_else(|| WikigraphError::SessionNotFound(id.to_string()))?;
    Ok(Json(GraphResponse::from_session(session)?))
}

async fn handle_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: std::result::Result<Json<ChangeLayoutRequest>, JsonRejection>,
) -> ApiResult<Json<GraphResponse>> {
    let Json(request) = payload?;
    let kind: LayoutKind = request.layout.parse()?;

    // Work on a copy so the session map is not locked during the layout
    let mut session = state
        .sessions
        .lock()
        .await
        .get(&id)
        .cloned()
        .ok_or_else(|| WikigraphError::SessionNotFound(id.to_string()))?;

    let (session, body) = tokio::task::spawn_blocking(move || -> Result<(GraphSession, GraphResponse)> {
        session.relayout_kind(kind)?;
        let body = GraphResponse::from_session(&session)?;
        Ok((session, body))
    })
    .await
    .map_err(WikigraphError::from)??;

    match state.sessions.lock().await.get_mut(&id) {
        Some(slot) => *slot = session,
        // Deleted or evicted while the layout ran
        None => return Err(WikigraphError::SessionNotFound(id.to_string()).into()),
    }
    Ok(Json(body))
}

async fn handle_delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    state
        .sessions
        .lock()
        .await
        .pop(&id)
        .ok_or_else(|| WikigraphError::SessionNotFound(id.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn router_with(config: &Config) -> Router {
        let source = StaticSource::new([
            ("A", vec!["B", "C"]),
            ("B", vec!["C"]),
            ("C", vec![]),
        ]);
        HttpServer::new(Arc::new(source), config)
            .unwrap()
            .create_router()
    }

    fn router() -> Router {
        router_with(&Config::default())
    }

    async fn create(app: &Router, topic: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/graphs", serde_json::json!({ "topic": topic, "depth": 1 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        read_json(response).await["id"].as_str().unwrap().to_string()
    }

    async fn get_status(app: &Router, id: &str) -> StatusCode {
        app.clone()
            .oneshot(Request::get(format!("/graphs/{}", id)).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["service"], "wikigraph");
    }

    #[tokio::test]
    async fn test_layouts() {
        let response = router()
            .oneshot(Request::get("/layouts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["layouts"].as_array().unwrap().len(), 5);
        assert_eq!(body["layouts"][0]["value"], "kamada_kawai");
    }

    #[tokio::test]
    async fn test_create_get_relayout_delete() {
        let app = router();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/graphs",
                serde_json::json!({ "topic": "A", "depth": 2, "layout": "spiral" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = read_json(response).await;
        assert_eq!(body["nodes"], 3);
        assert_eq!(body["edges"], 3);
        assert_eq!(body["layout"], "spiral");
        assert_eq!(
            body["status"],
            "The current topic is **A** and the depth of the network is **2**."
        );
        assert_eq!(body["render"]["nodes"]["x"].as_array().unwrap().len(), 3);
        assert_eq!(body["render"]["edges"]["x"].as_array().unwrap().len(), 9);
        let id = body["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(Request::get(format!("/graphs/{}", id)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/graphs/{}/layout", id),
                serde_json::json!({ "layout": "shell" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["layout"], "shell");
        assert_eq!(body["nodes"], 3);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/graphs/{}/layout", id),
                serde_json::json!({ "layout": "circular" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(
                Request::delete(format!("/graphs/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(Request::get(format!("/graphs/{}", id)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_unknown_topic() {
        let response = router()
            .oneshot(json_request(
                "POST",
                "/graphs",
                serde_json::json!({ "topic": "Nowhere" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = read_json(response).await;
        assert_eq!(body["status"], "Topic does not exist.");
    }

    #[tokio::test]
    async fn test_create_bad_input() {
        let response = router()
            .oneshot(json_request(
                "POST",
                "/graphs",
                serde_json::json!({ "topic": "A", "layout": "random" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = router()
            .oneshot(json_request(
                "POST",
                "/graphs",
                serde_json::json!({ "topic": "A", "depth": 99 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_malformed_body_is_bad_request() {
        let bodies = [
            serde_json::json!({ "topic": "A", "depth": -1 }),
            serde_json::json!({ "depth": 1 }),
            serde_json::json!({ "topic": "A", "depth": "two" }),
        ];
        for body in bodies {
            let response = router()
                .oneshot(json_request("POST", "/graphs", body.clone()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
            let json = read_json(response).await;
            assert!(json["error"].as_str().unwrap().starts_with("Invalid input"));
        }
    }

    #[tokio::test]
    async fn test_relayout_malformed_body_is_bad_request() {
        let app = router();
        let id = create(&app, "A").await;
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/graphs/{}/layout", id),
                serde_json::json!({ "algorithm": "shell" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(&app, &id).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_relayout_keeps_session_usable() {
        let app = router();
        let id = create(&app, "A").await;
        for layout in ["kamada_kawai", "spectral", "spring"] {
            let response = app
                .clone()
                .oneshot(json_request(
                    "PUT",
                    &format!("/graphs/{}/layout", id),
                    serde_json::json!({ "layout": layout }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app
            .clone()
            .oneshot(Request::get(format!("/graphs/{}", id)).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["layout"], "spring");
        assert_eq!(body["render"]["nodes"]["x"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_relayout_unknown_session() {
        let response = router()
            .oneshot(json_request(
                "PUT",
                &format!("/graphs/{}/layout", Uuid::new_v4()),
                serde_json::json!({ "layout": "shell" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_least_recently_used_session_is_evicted() {
        let mut config = Config::default();
        config.http_server.max_sessions = 2;
        let app = router_with(&config);

        let first = create(&app, "A").await;
        let second = create(&app, "B").await;
        // Touch the first so the second becomes least recently used
        assert_eq!(get_status(&app, &first).await, StatusCode::OK);
        let third = create(&app, "C").await;

        assert_eq!(get_status(&app, &first).await, StatusCode::OK);
        assert_eq!(get_status(&app, &second).await, StatusCode::NOT_FOUND);
        assert_eq!(get_status(&app, &third).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_single_session_capacity() {
        let mut config = Config::default();
        config.http_server.max_sessions = 1;
        let app = router_with(&config);

        let first = create(&app, "A").await;
        let second = create(&app, "B").await;
        assert_eq!(get_status(&app, &first).await, StatusCode::NOT_FOUND);
        assert_eq!(get_status(&app, &second).await, StatusCode::OK);
    }
}
