// Calculation HTTP routes

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use offload_core::{parse_operand, ArithmeticStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::context::AppContext;
use crate::error::{ApiError, ErrorResponse};

/// Request for a two-operand calculation.
/// The strategy may be given as `strategy` or `operation`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalculateRequest {
    /// Strategy key ("sum" or "multiply").
    #[schema(example = "sum")]
    pub strategy: Option<String>,
    /// Alias of `strategy`.
    #[schema(example = "sum")]
    pub operation: Option<String>,
    #[schema(value_type = f64, example = 2)]
    pub a: Option<Value>,
    #[schema(value_type = f64, example = 4)]
    pub b: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalculateResponse {
    #[schema(example = 6)]
    pub result: f64,
}

pub fn routes(state: AppContext) -> Router {
    Router::new()
        .route("/calculate", post(calculate))
        .with_state(state)
}

/// POST /calculate - Apply an arithmetic strategy to two operands
#[utoipa::path(
    post,
    path = "/api/calculate",
    request_body = CalculateRequest,
    responses(
        (status = 200, description = "Calculation result", body = CalculateResponse),
        (status = 400, description = "Missing parameters, invalid operation or non-numeric operands", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "calculator"
)]
pub async fn calculate(
    State(state): State<AppContext>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let Json(req) = payload?;

    let (Some(a), Some(b), Some(key)) = (req.a, req.b, req.strategy.or(req.operation)) else {
        return Err(ApiError::bad_request("Missing parameters"));
    };

    let strategy: ArithmeticStrategy = key.parse()?;
    let a = parse_operand(&a)?;
    let b = parse_operand(&b)?;

    let result = state.calculator.calculate(Some(strategy), a, b)?;

    Ok(Json(CalculateResponse { result }))
}
