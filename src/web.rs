// src/web.rs

pub mod mfa;
pub mod signature;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::config::ServerConfig;
use crate::mfa_service::MfaService;

/// Состояние приложения
pub type AppState = Arc<MfaService>;

/// 404 для неизвестных путей и для неверного метода на известных
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route(
            "/api/verify-signature",
            post(signature::verify_signature).fallback(not_found),
        )
        // старый путь без префикса /api
        .route(
            "/verify-signature",
            post(signature::verify_signature).fallback(not_found),
        )
        .route("/api/mfa/status", post(mfa::status).fallback(not_found))
        .route("/api/mfa/setup", post(mfa::setup).fallback(not_found))
        .route(
            "/api/mfa/verify-setup",
            post(mfa::verify_setup).fallback(not_found),
        )
        .route("/api/mfa/verify", post(mfa::verify).fallback(not_found))
        .route("/api/mfa/disable", post(mfa::disable).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Роутер с ограничением размера тела из конфигурации
pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    create_router(state).layer(DefaultBodyLimit::max(config.max_request_size))
}

pub async fn run_web_server(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let app = create_app(state, config);

    let listener = tokio::net::TcpListener::bind(&config.address).await?;
    info!(address = %listener.local_addr()?, "🌐 Web API запущен");
    info!("MFA endpoints: /api/mfa/{{status,setup,verify-setup,verify,disable}}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
