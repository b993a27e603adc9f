use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::server::AppState;
use crate::server::dto::{DbStatusResponse, HealthResponse, StatusResponse};
use crate::server::response::{ApiError, StoreResultExt};

/// Plain liveness probe mounted outside `/api`.
pub async fn health() -> &'static str {
    "OK"
}

pub async fn api_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now(),
    })
}

pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let env = state.config.environment.clone();

    match state.store.ping() {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "online",
                database_connected: true,
                env,
                message: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Database ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse {
                    status: "error",
                    database_connected: false,
                    env,
                    message: Some(e.to_string()),
                }),
            )
        }
    }
}

pub async fn db_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state
        .store
        .schema_report()
        .api_err("Failed to inspect database schema")?;
    let capabilities = state
        .store
        .capabilities()
        .api_err("Failed to inspect database schema")?;

    Ok::<_, ApiError>(Json(DbStatusResponse {
        database_connected: true,
        tables: report.tables,
        template_columns: report.template_columns,
        color_columns: report.color_columns,
        completion_type_columns: report.completion_type_columns,
        capabilities,
    }))
}
