//! HTTP surface for sidenote.
//!
//! The service has exactly one logical endpoint, dispatched by method:
//! `POST` submits a record, `GET` renders the feed — regardless of path.
//! Writes pass through a shared-key gate; reads are always open. Every
//! response allows cross-origin callers, since submissions typically come
//! from a browser extension running on arbitrary pages.

mod submit;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::{Html, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed::FeedRenderer;
use crate::store::{RecordLog, UploadStore};

/// Shared state available to all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The startup configuration, immutable for the process lifetime.
    pub config: Arc<Config>,
    /// The append-only record log.
    pub log: Arc<RecordLog>,
    /// The content-addressed upload store.
    pub uploads: Arc<UploadStore>,
    /// The compiled feed renderer.
    pub renderer: Arc<FeedRenderer>,
}

impl AppState {
    /// Initialize the service state from configuration.
    ///
    /// Opens the record log and upload store, creating the log's parent
    /// directory and the upload directory if absent, and compiles the feed
    /// template.
    ///
    /// # Errors
    ///
    /// Returns an error if a required path is missing from the
    /// configuration or either store cannot be opened.
    pub fn new(config: Config) -> Result<Self> {
        let log = RecordLog::open(config.log_file()?)?;
        let uploads = UploadStore::open(config.upload_dir()?)?;
        let renderer = FeedRenderer::new()?;

        Ok(Self {
            config: Arc::new(config),
            log: Arc::new(log),
            uploads: Arc::new(uploads),
            renderer: Arc::new(renderer),
        })
    }
}

/// Build the service router.
///
/// The same method router is mounted at the root and at a catch-all
/// wildcard: there is no path routing, only method dispatch. The CORS
/// layer wraps the auth gate, so rejections carry the allow-all header
/// too.
pub fn router(state: AppState) -> Router {
    let endpoint = get(feed).post(submit::submit);

    Router::new()
        .route("/", endpoint.clone())
        .route("/{*path}", endpoint)
        .route_layer(middleware::from_fn_with_state(state.clone(), require_key))
        .layer(
            CorsLayer::new()
                .allow_methods(Any)
                .allow_headers(Any)
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Gate write requests behind the configured shared key.
///
/// The client presents the key verbatim in the `Authentication` header.
/// Reads are always allowed; when no key is configured, writes are too.
async fn require_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if request.method() == Method::POST {
        if let Some(key) = state.config.server.key.as_deref() {
            let presented = request
                .headers()
                .get("authentication")
                .and_then(|value| value.to_str().ok());
            if presented != Some(key) {
                return Err(Error::Unauthorized);
            }
        }
    }
    Ok(next.run(request).await)
}

/// `GET` — render the entire log as the HTML feed.
///
/// Unauthenticated by design: the gate only protects writes.
async fn feed(State(state): State<AppState>) -> Result<Html<String>> {
    let records = state.log.read_all()?;
    let page = state.renderer.render(&records)?;
    Ok(Html(page))
}

/// Bind and run the server until shutdown.
///
/// # Errors
///
/// Returns an error if state initialization or binding fails.
pub async fn serve(config: Config) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;

    let state = AppState::new(config)?;
    info!(
        "Recording to {} (uploads in {})",
        state.log.path().display(),
        state.uploads.dir().display()
    );

    let app = router(state);
    let listener = TcpListener::bind((host.as_str(), port)).await?;
    info!("Server running at {host}:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Resolve when the process receives ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received ctrl-c, shutting down"),
        () = terminate => info!("Received terminate signal, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_state(key: Option<&str>) -> (AppState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.log = Some(dir.path().join("records.ndjson"));
        config.storage.uploads = Some(dir.path().join("uploads"));
        config.server.key = key.map(str::to_string);

        (AppState::new(config).unwrap(), dir)
    }

    fn test_server(key: Option<&str>) -> (TestServer, AppState, TempDir) {
        let (state, dir) = test_state(key);
        let server = TestServer::new(router(state.clone())).unwrap();
        (server, state, dir)
    }

    fn sample_submission() -> serde_json::Value {
        json!({
            "href": "http://x",
            "title": "T",
            "time": 1,
            "tags": ["a"],
            "html": "<p>hi</p>",
        })
    }

    #[tokio::test]
    async fn test_submit_then_feed_end_to_end() {
        let (server, _state, _dir) = test_server(None);

        let response = server.post("/").json(&sample_submission()).await;
        response.assert_status_ok();
        response.assert_text("ok");

        let response = server.get("/").await;
        response.assert_status_ok();
        let page = response.text();
        assert!(page.contains("<p>hi</p>"));
        assert!(page.contains("<article>"));
        assert!(page.contains("<a href=\"http://x\">T</a>"));
        assert!(page.contains("<em>a</em>"));
    }

    #[tokio::test]
    async fn test_any_path_reaches_the_endpoint() {
        let (server, _state, _dir) = test_server(None);

        let response = server.post("/some/other/path").json(&sample_submission()).await;
        response.assert_status_ok();

        let response = server.get("/feed/anything").await;
        response.assert_status_ok();
        assert!(response.text().contains("<p>hi</p>"));
    }

    #[tokio::test]
    async fn test_responses_allow_any_origin() {
        let (server, _state, _dir) = test_server(None);

        let response = server
            .get("/")
            .add_header("origin", "http://extension.example")
            .await;
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .map(|value| value.to_str().unwrap()),
            Some("*")
        );
    }

    #[tokio::test]
    async fn test_submit_response_is_html() {
        let (server, _state, _dir) = test_server(None);

        let response = server.post("/").json(&sample_submission()).await;
        let content_type = response
            .headers()
            .get("content-type")
            .map(|value| value.to_str().unwrap().to_string())
            .unwrap();
        assert!(content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_write_without_key_is_rejected() {
        let (server, state, _dir) = test_server(Some("sekrit"));

        let response = server.post("/").json(&sample_submission()).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_text("unauthorized");

        // The rejection must not touch the log.
        assert!(state.log.read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_with_wrong_key_is_rejected() {
        let (server, state, _dir) = test_server(Some("sekrit"));

        let response = server
            .post("/")
            .add_header("authentication", "wrong")
            .json(&sample_submission())
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(state.log.read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_with_matching_key_succeeds() {
        let (server, state, _dir) = test_server(Some("sekrit"));

        let response = server
            .post("/")
            .add_header("authentication", "sekrit")
            .json(&sample_submission())
            .await;
        response.assert_status_ok();
        response.assert_text("ok");
        assert_eq!(state.log.read_all().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reads_never_require_the_key() {
        let (server, _state, _dir) = test_server(Some("sekrit"));

        let response = server.get("/").await;
        response.assert_status_ok();
    }

    #[tokio::test]
    async fn test_feed_orders_groups_by_latest_activity() {
        let (server, _state, _dir) = test_server(None);

        for (href, time) in [("http://a", 1), ("http://b", 5), ("http://a", 3)] {
            let response = server
                .post("/")
                .json(&json!({
                    "href": href,
                    "title": href,
                    "time": time,
                    "tags": [],
                    "html": format!("<p>{href} at {time}</p>"),
                }))
                .await;
            response.assert_status_ok();
        }

        let page = server.get("/").await.text();
        let position_b = page.find("href=\"http://b\"").unwrap();
        let position_a = page.find("href=\"http://a\"").unwrap();
        assert!(position_b < position_a);
        assert_eq!(page.matches("class=\"highlight\"").count(), 3);
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_server_error() {
        let (server, _state, _dir) = test_server(None);

        let response = server.post("/").text("this is not json").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_corrupt_log_line_fails_the_feed() {
        let (server, state, _dir) = test_server(None);

        server.post("/").json(&sample_submission()).await.assert_status_ok();
        {
            use std::io::Write as _;
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(state.log.path())
                .unwrap();
            file.write_all(b"{broken\n").unwrap();
        }

        let response = server.get("/").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
