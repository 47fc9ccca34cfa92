// Heavy task HTTP routes
//
// Offloads the sqrt-sum unit to the worker pool. The handler does not inspect
// `number`; the unit's input type and its count bound decide what is valid,
// at dispatch.

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use offload_core::SqrtSumUnit;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::context::AppContext;
use crate::error::{ApiError, ErrorResponse};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HeavyTaskRequest {
    /// Non-negative integer count, at most `WORKER_POOL_SQRT_SUM_MAX_COUNT`.
    /// `0` is accepted and yields `0.0`; fractional, negative and non-numeric
    /// values are rejected with 400.
    #[schema(value_type = u64, example = 5)]
    pub number: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HeavyTaskResponse {
    /// Sum of the square roots of 0..number.
    #[schema(example = 6.146264369941973)]
    pub result: f64,
}

pub fn routes(state: AppContext) -> Router {
    Router::new()
        .route("/heavy-task", post(heavy_task))
        .with_state(state)
}

/// POST /heavy-task - Run the sqrt-sum unit on a worker thread
#[utoipa::path(
    post,
    path = "/api/heavy-task",
    request_body = HeavyTaskRequest,
    responses(
        (status = 200, description = "Task successfully processed", body = HeavyTaskResponse),
        (status = 400, description = "Missing, non-integer, negative or oversized number", body = ErrorResponse),
        (status = 500, description = "Task failed", body = ErrorResponse),
        (status = 503, description = "Worker pool saturated", body = ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn heavy_task(
    State(state): State<AppContext>,
    payload: Result<Json<HeavyTaskRequest>, JsonRejection>,
) -> Result<Json<HeavyTaskResponse>, ApiError> {
    let Json(req) = payload?;
    let number = req
        .number
        .ok_or_else(|| ApiError::bad_request("Invalid input: missing 'number'"))?;

    let handle = state.pool.execute_value::<f64>(SqrtSumUnit::NAME, number)?;
    tracing::debug!(task_id = %handle.task_id(), "Heavy task dispatched");

    let result = handle.await?;

    Ok(Json(HeavyTaskResponse { result }))
}
