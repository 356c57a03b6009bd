//! Salto server binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::Span;

use salto_server::ai::{AiGateway, AzureOpenAiClient, CannedGateway};
use salto_server::config::AppConfig;
use salto_server::db::{DocumentStore, PgDocumentStore, create_pool};
use salto_server::middleware::session_layer;
use salto_server::routes;
use salto_server::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present, then configuration from the environment
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "salto_server=info,tower_http=debug".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Initialize the database connection pool and the document store schema
    let pool = create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    let store = PgDocumentStore::new(pool.clone());
    store
        .ensure_schema()
        .await
        .expect("Failed to ensure document store schema");

    // Session layer (PostgreSQL-backed)
    let session_store = PostgresStore::new(pool);
    session_store
        .migrate()
        .await
        .expect("Failed to migrate session store");
    let sessions = session_layer(session_store);

    // Wire the AI gateway: the real client when credentials are configured,
    // the canned gateway otherwise
    let gateway: Arc<dyn AiGateway> = match &config.ai {
        Some(ai_config) => {
            tracing::info!(deployment = %ai_config.deployment, "Azure OpenAI gateway configured");
            Arc::new(AzureOpenAiClient::new(ai_config))
        }
        None => {
            tracing::info!("no AI credentials configured, using canned gateway");
            Arc::new(CannedGateway::new())
        }
    };

    let store: Arc<dyn DocumentStore> = Arc::new(store);
    let state = AppState::new(config.clone(), store, gateway);

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(sessions)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("salto listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies store connectivity before returning OK.
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
