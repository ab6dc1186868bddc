use std::net::SocketAddr;

use anyhow::Context;
use axum::{Router, http::HeaderName};
use directory::{AppState, build_router};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// The directory router wrapped in the transport layers: request ids are
/// assigned before tracing so every span carries one.
pub fn app(state: AppState) -> Router {
    let header_name = HeaderName::from_static(REQUEST_ID_HEADER);
    build_router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(header_name))
            .layer(TraceLayer::new_for_http()),
    )
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(%addr, "directory listening");
    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request};
    use directory::auth::AuthConfig;
    use http_body_util::BodyExt;
    use sea_orm::Database;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let auth = AuthConfig {
            jwt_secret: "test".into(),
            session_ttl_minutes: 5,
            secure_cookies: false,
        };
        let router = app(AppState::new(Arc::new(db), Arc::new(auth)));

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&body).contains("Employee Directory"));
    }
}
