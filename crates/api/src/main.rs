use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderName;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jukebox_api::auth;
use jukebox_api::config::ServerConfig;
use jukebox_api::{routes, state::AppState};
use jukebox_events::{
    AmqpEventConsumer, AmqpEventPublisher, BrokerConfig, ConsumerSupervisor, EventConsumer,
    EventPublisher, PgPlaylistSource, PlayOrchestrator, PlayRecorder,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jukebox_api=debug,jukebox_events=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = jukebox_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    jukebox_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    jukebox_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Messaging ---
    let broker_config = BrokerConfig::from_env();

    let publisher = Arc::new(
        AmqpEventPublisher::connect(broker_config.clone())
            .await
            .expect("Failed to connect event publisher"),
    );
    let consumer = Arc::new(
        AmqpEventConsumer::connect(broker_config)
            .await
            .expect("Failed to connect event consumer"),
    );

    // --- Consumer supervisor ---
    let recorder = Arc::new(PlayRecorder::new(pool.clone()));
    let supervisor = ConsumerSupervisor::new(
        Arc::clone(&consumer) as Arc<dyn EventConsumer>,
        recorder,
    );

    let shutdown_token = CancellationToken::new();
    if let Err(e) = supervisor.start(shutdown_token.clone()).await {
        tracing::error!(error = %e, "Failed to start consumer supervisor");
    }

    // --- Play orchestrator ---
    let orchestrator = Arc::new(PlayOrchestrator::new(
        Arc::new(PgPlaylistSource::new(pool.clone())),
        Arc::clone(&publisher) as Arc<dyn EventPublisher>,
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        orchestrator,
    };

    // --- Playlist routes, with auth when enabled ---
    let mut playlist_routes = routes::playlist_routes();
    if config.auth.enabled {
        let keys = auth::jwt::KeyStore::fetch(&config.auth.issuer_url, &config.auth.realm)
            .await
            .expect("Failed to load identity provider signing keys");
        playlist_routes = playlist_routes.layer(axum::middleware::from_fn_with_state(
            Arc::new(keys),
            auth::require_bearer,
        ));
        tracing::info!(realm = %config.auth.realm, "Bearer authentication enabled");
    }

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        // Health check stays outside the auth layer.
        .merge(routes::health::router())
        .merge(playlist_routes)
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500.
        .layer(CatchPanicLayer::new())
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // Shared state.
        .with_state(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop pulling new messages, then drain the consumer.
    shutdown_token.cancel();
    supervisor.stop().await;

    if let Err(e) = publisher.close().await {
        tracing::warn!(error = %e, "Failed to close event publisher");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
