//! Shared test harness for HTTP-level integration tests.
//!
//! Mirrors the router construction in `main.rs` so tests exercise the same
//! middleware stack (request ID, tracing, panic recovery) that production
//! uses — with the AMQP publisher swapped for an in-memory recording double.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use jukebox_api::config::{AuthConfig, ServerConfig};
use jukebox_api::routes;
use jukebox_api::state::AppState;
use jukebox_events::{
    EventPublisher, MessagingError, PgPlaylistSource, PlayOrchestrator, TrackPlayedEvent,
};

/// Publisher double that records every published event in memory.
///
/// With `fail_from` set, publishes at or past that index fail with a
/// transport-style error, emulating a broker outage mid-play.
pub struct RecordingPublisher {
    published: Mutex<Vec<TrackPlayedEvent>>,
    fail_from: Option<usize>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail_from: None,
        }
    }

    pub fn failing_from(index: usize) -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            fail_from: Some(index),
        }
    }

    pub fn published(&self) -> Vec<TrackPlayedEvent> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &TrackPlayedEvent) -> Result<(), MessagingError> {
        let mut published = self.published.lock().unwrap();
        if let Some(fail_from) = self.fail_from {
            if published.len() >= fail_from {
                return Err(MessagingError::Serialization(
                    <serde_json::Error as serde::ser::Error>::custom("broker unavailable"),
                ));
            }
        }
        published.push(event.clone());
        Ok(())
    }

    async fn close(&self) -> Result<(), MessagingError> {
        Ok(())
    }
}

/// Build a test `ServerConfig` with auth disabled.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        auth: AuthConfig {
            enabled: false,
            issuer_url: "http://localhost:8180".to_string(),
            realm: "jukebox".to_string(),
        },
    }
}

/// Build the full application router using the given pool and publisher.
pub fn build_test_app(pool: PgPool, publisher: Arc<RecordingPublisher>) -> Router {
    let orchestrator = Arc::new(PlayOrchestrator::new(
        Arc::new(PgPlaylistSource::new(pool.clone())),
        publisher as Arc<dyn EventPublisher>,
    ));

    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        orchestrator,
    };

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .merge(routes::playlist_routes())
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}

/// Send a GET request to the app.
pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a POST request with a JSON body to the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Send a bodyless POST request to the app.
pub async fn post(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
