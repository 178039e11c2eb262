pub mod health;
pub mod metrics;
mod world;

use axum::{Router, routing::get};
use vrworld_core::MetadataResolver;

/// Build location routes
pub fn world_routes() -> Router<MetadataResolver> {
    Router::new()
        .route("/world/", get(world::get_empty))
        .route("/world/{location_id}", get(world::get))
}
