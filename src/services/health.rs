use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use crate::database::{connection::DatabaseManager, models::{Episode, Title}};
use chrono::{DateTime, Utc};

/// Body of `/health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub catalog: CatalogStats,
}

/// Row counts read while answering `/health`; also proves the database responds.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    pub titles: i64,
    pub episodes: i64,
    pub query_ms: u64,
}

#[derive(Clone)]
struct HealthState {
    db: Arc<DatabaseManager>,
    started: DateTime<Utc>,
}

/// Builds the status router served next to the bot.
pub fn router(db: Arc<DatabaseManager>) -> Router {
    let state = HealthState {
        db,
        started: Utc::now(),
    };

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route("/health/live", get(|| async { Json("alive") }))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn health(State(state): State<HealthState>) -> Result<Json<HealthResponse>, StatusCode> {
    let catalog = catalog_stats(&state.db).await.map_err(|e| {
        tracing::warn!("Health check could not read the catalog: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    let uptime_seconds = Utc::now()
        .signed_duration_since(state.started)
        .num_seconds()
        .max(0) as u64;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        catalog,
    }))
}

async fn ready(State(state): State<HealthState>) -> Result<Json<&'static str>, StatusCode> {
    match Title::count(&state.db.pool).await {
        Ok(_) => Ok(Json("ready")),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn catalog_stats(db: &DatabaseManager) -> Result<CatalogStats, sqlx::Error> {
    let start = Instant::now();
    let titles = Title::count(&db.pool).await?;
    let episodes = Episode::count(&db.pool).await?;
    Ok(CatalogStats {
        titles,
        episodes,
        query_ms: start.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use tempfile::TempDir;

    async fn create_test_router() -> (Router, Arc<DatabaseManager>, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let db = Arc::new(
            DatabaseManager::new(&db_url)
                .await
                .expect("Failed to create test database")
        );
        db.run_migrations().await.expect("Failed to run migrations");

        (router(db.clone()), db, temp_dir)
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_catalog() {
        let (app, db, _temp_dir) = create_test_router().await;
        let title_id = Title::create(&db.pool, "Berserk", 1)
            .await
            .expect("Failed to create title")
            .expect("Title should be new");
        Episode::create(&db.pool, title_id, "ep1", "https://x.test/1", 1)
            .await
            .expect("Failed to create episode");

        let server = TestServer::new(app).expect("Failed to create test server");
        let response = server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::OK);

        let health_response: HealthResponse = response.json();
        assert_eq!(health_response.status, "healthy");
        assert_eq!(health_response.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(health_response.catalog.titles, 1);
        assert_eq!(health_response.catalog.episodes, 1);
    }

    #[tokio::test]
    async fn test_readiness_endpoint() {
        let (app, _db, _temp_dir) = create_test_router().await;
        let server = TestServer::new(app).expect("Failed to create test server");

        let response = server.get("/health/ready").await;

        assert_eq!(response.status_code(), StatusCode::OK);

        let ready_response: String = response.json();
        assert_eq!(ready_response, "ready");
    }

    #[tokio::test]
    async fn test_liveness_endpoint() {
        let (app, _db, _temp_dir) = create_test_router().await;
        let server = TestServer::new(app).expect("Failed to create test server");

        let response = server.get("/health/live").await;

        assert_eq!(response.status_code(), StatusCode::OK);

        let alive_response: String = response.json();
        assert_eq!(alive_response, "alive");
    }
}
