//! Health check endpoint

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use vrworld_core::MetadataResolver;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Check provider connectivity and return server health status
pub async fn check(State(resolver): State<MetadataResolver>) -> impl IntoResponse {
    let probe = tokio::time::timeout(resolver.timeout(), resolver.caller().is_connected()).await;

    match probe {
        Ok(Ok(())) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                reason: None,
            }),
        ),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Health check provider probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    reason: Some(format!("Provider unreachable: {}", e)),
                }),
            )
        }
        Err(_) => {
            tracing::error!("Health check provider probe timed out");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    reason: Some(format!(
                        "Provider probe timed out after {:?}",
                        resolver.timeout()
                    )),
                }),
            )
        }
    }
}
