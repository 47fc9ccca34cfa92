// Offload API server
// Decision: Dependencies are registered by name once at startup, then resolved into a typed AppContext
// Decision: Heavy computation never runs on the async runtime; it is offloaded to the worker pool

mod buggy;
mod calculate;
mod config;
mod context;
mod error;
mod heavy_task;

use anyhow::{Context, Result};
use axum::http::{header, Method};
use axum::{extract::State, routing::get, Json, Router};
use offload_core::{ArithmeticStrategy, CalculatorService};
use offload_worker::{PoolStats, WorkerPool, WorkerPoolConfig};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ServerConfig;
use crate::context::{AppContext, ServiceRegistry, CALCULATOR_SERVICE, WORKER_POOL};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    units: Vec<&'static str>,
    pool: PoolStats,
}

async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        units: ctx.pool.units(),
        pool: ctx.pool.stats(),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        calculate::calculate,
        heavy_task::heavy_task,
        buggy::buggy_endpoint,
    ),
    components(
        schemas(
            calculate::CalculateRequest,
            calculate::CalculateResponse,
            heavy_task::HeavyTaskRequest,
            heavy_task::HeavyTaskResponse,
            buggy::BuggyResponse,
            error::ErrorResponse,
            ArithmeticStrategy,
        )
    ),
    tags(
        (name = "calculator", description = "Arithmetic strategy endpoints"),
        (name = "tasks", description = "Worker pool offload endpoints"),
        (name = "diagnostics", description = "Diagnostic endpoints")
    ),
    info(
        title = "Offload API",
        version = "0.1.0",
        description = "Minimal compute service that offloads heavy work to a worker pool",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "offload_api=debug,offload_worker=debug,offload_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("offload-api starting...");

    let server_config = ServerConfig::from_env().context("Invalid server configuration")?;
    let pool_config = WorkerPoolConfig::from_env().context("Invalid worker pool configuration")?;

    // Register dependencies by name, then resolve them once
    let mut registry = ServiceRegistry::new();
    registry.register(CALCULATOR_SERVICE, CalculatorService::new());
    registry.register(WORKER_POOL, WorkerPool::with_defaults(pool_config));

    let ctx = AppContext::from_registry(&registry).context("Failed to resolve dependencies")?;

    if server_config.api_prefix.is_empty() {
        tracing::info!("API routes served at the root");
    } else {
        tracing::info!(prefix = %server_config.api_prefix, "API prefix configured");
    }

    if server_config.cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?server_config.cors_origins, "CORS origins configured");
    }

    let app = build_app(ctx, &server_config);

    let listener = tokio::net::TcpListener::bind(server_config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", server_config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Assemble the full application router
fn build_app(ctx: AppContext, config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .merge(calculate::routes(ctx.clone()))
        .merge(heavy_task::routes(ctx.clone()))
        .merge(buggy::routes());

    let app = Router::new()
        .route("/health", get(health).with_state(ctx))
        .merge(build_router_with_prefix(api_routes, &config.api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !config.cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.cors_origins.clone()))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN]),
        )
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http())
}

/// Build router with optional API prefix (extracted for testing)
fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}
