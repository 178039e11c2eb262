//! Location metadata handler
//!
//! Resolution failures are reported in the body as `{"error": ...}` with
//! status 200, matching the behavior existing clients rely on.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::PathRejection},
};
use vrworld_core::{LocationId, LocationResponse, MetadataResolver, ResolutionResult};

use crate::middleware::request_id::RequestId;

/// GET /world/{location_id} - Resolve a location's on-chain metadata
pub async fn get(
    State(resolver): State<MetadataResolver>,
    request_id: Option<Extension<RequestId>>,
    path: Result<Path<String>, PathRejection>,
) -> Json<LocationResponse> {
    let request_id = request_id.map(|Extension(id)| id).unwrap_or_default();
    match path {
        Ok(Path(location_id)) => {
            resolve(resolver, LocationId::from(location_id), request_id).await
        }
        Err(rejection) => {
            tracing::warn!(
                request_id = %request_id.0,
                error = %rejection,
                "Rejected location path"
            );
            let result = ResolutionResult::Failure(rejection.body_text());
            Json(result.into_response(LocationId::default()))
        }
    }
}

/// GET /world/ - Empty identifier, forwarded like any other
pub async fn get_empty(
    State(resolver): State<MetadataResolver>,
    request_id: Option<Extension<RequestId>>,
) -> Json<LocationResponse> {
    let request_id = request_id.map(|Extension(id)| id).unwrap_or_default();
    resolve(resolver, LocationId::default(), request_id).await
}

async fn resolve(
    resolver: MetadataResolver,
    location_id: LocationId,
    request_id: RequestId,
) -> Json<LocationResponse> {
    // Run on its own task so a panic below the resolver still yields an error body
    let id = location_id.clone();
    let result = tokio::spawn(async move { resolver.resolve(&id).await })
        .await
        .unwrap_or_else(|e| {
            tracing::error!(
                request_id = %request_id.0,
                location_id = %location_id,
                error = %e,
                "Resolution task failed"
            );
            ResolutionResult::Failure(format!("internal error: {}", e))
        });

    if let ResolutionResult::Failure(error) = &result {
        tracing::info!(
            request_id = %request_id.0,
            location_id = %location_id,
            error = %error,
            "Location lookup returned an error body"
        );
    }

    Json(result.into_response(location_id))
}
