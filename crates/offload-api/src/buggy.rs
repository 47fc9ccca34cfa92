// Diagnostic route that answers after a random delay

use std::time::Duration;

use axum::{routing::get, Json, Router};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BuggyResponse {
    #[schema(example = "Response reached")]
    pub message: String,
}

pub fn routes() -> Router {
    Router::new().route("/buggy-endpoint", get(buggy_endpoint))
}

/// GET /buggy-endpoint - Respond after 0-100ms
#[utoipa::path(
    get,
    path = "/api/buggy-endpoint",
    responses(
        (status = 200, description = "Response reached", body = BuggyResponse)
    ),
    tag = "diagnostics"
)]
pub async fn buggy_endpoint() -> Json<BuggyResponse> {
    tracing::info!("Start request");

    let delay_ms = rand::thread_rng().gen_range(0..100u64);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    tracing::info!(delay_ms, "Timeout executed");
    Json(BuggyResponse {
        message: "Response reached".to_string(),
    })
}
