//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::middleware;
use super::openapi::openapi_json;
use super::routes::{health, identity};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::SqliteService;
use crate::domain::IdentityService;

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Full router: health, OpenAPI document and identity endpoints
    pub fn router(database: Arc<SqliteService>, identity: IdentityService) -> Router {
        Router::new()
            .route("/api/v1/health", get(health::health))
            .with_state(database)
            .route("/api/openapi.json", get(openapi_json))
            .nest("/api/v1", identity::routes(identity))
            .fallback(middleware::handle_404)
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
    }

    /// Serve until shutdown is triggered. Returns CoreApp for graceful shutdown.
    pub async fn start(self) -> Result<CoreApp> {
        let app = self.app;
        let shutdown = app.shutdown.clone();

        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);
        let router = Self::router(app.database.clone(), app.identity.clone());

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "API server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    async fn router() -> Router {
        let db = Arc::new(SqliteService::in_memory().await.unwrap());
        ApiServer::router(db.clone(), IdentityService::new(db))
    }

    async fn get_status(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_and_openapi_mounted() {
        let (status, body) = get_status(router().await, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "ok");

        let (status, body) = get_status(router().await, "/api/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/groups/describe"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = get_status(router().await, "/api/v1/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    }
}
