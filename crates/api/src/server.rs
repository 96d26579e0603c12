//! # API server
//!
//! Assembles the axum router, mounts Swagger UI, configures CORS and binds the
//! listener. Owned and started by `crates/app`; tests call `build_router` directly.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use koban_core::common::time::TimeProvider;
use koban_core::config::AppConfig;
use koban_scanner::ScannerService;

use crate::routes::{alerts, health, monitoring, notify, prices};

// ============================================================
//  Shared state
// ============================================================

/// State injected into every handler via axum's `State` extractor.
///
/// # Invariants
/// - Built once by the binary before serving; lives as long as the process.
#[derive(Clone)]
pub struct AppState {
    /// Scan loop lifecycle and, through it, the scanner and its ports
    pub service: Arc<ScannerService>,
    pub config: Arc<AppConfig>,
    /// Same clock the engine reads; response timestamps come from it
    pub clock: Arc<dyn TimeProvider>,
}

// ============================================================
//  OpenAPI document
// ============================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Koban alert API",
        version = "0.1.0",
        description = "Control surface of the Koban market alert service: status, alert history, statistics and monitoring control.",
        license(name = "MIT")
    ),
    tags(
        (name = "Status", description = "Health and latest prices"),
        (name = "Alerts", description = "Alert history, statistics and housekeeping"),
        (name = "Monitoring", description = "Scan loop control and channel test")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the static bearer token scheme used by control routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Value of `server.api_token`, without the 'Bearer ' prefix"))
                    .build(),
            ),
        );
    }
}

// ============================================================
//  Router and server
// ============================================================

/// # Summary
/// Builds the full route tree with Swagger UI and CORS.
///
/// # Logic
/// 1. Read-only routes are public.
/// 2. Control routes sit behind the bearer token guard.
/// 3. Merge both, collect the OpenAPI document and mount Swagger UI.
pub fn build_router(state: AppState) -> Router {
    let public_router = OpenApiRouter::new()
        .routes(routes!(health::health))
        .routes(routes!(prices::list_prices))
        .routes(routes!(alerts::history))
        .routes(routes!(alerts::stats));

    let control_router = OpenApiRouter::new()
        .routes(routes!(alerts::cleanup))
        .routes(routes!(alerts::reset_stats))
        .routes(routes!(monitoring::start))
        .routes(routes!(monitoring::stop))
        .routes(routes!(notify::test_notify))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::require_token,
        ));

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(public_router)
        .merge(control_router)
        .with_state(state)
        .split_for_parts();

    // dashboard may be served from anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(cors)
}

/// # Summary
/// Binds `bind_addr` and serves until the future is dropped or fails.
///
/// # Arguments
/// * `state`: shared state built by the binary.
/// * `bind_addr`: e.g. `"0.0.0.0:8000"`.
pub async fn start_server(
    state: AppState,
    bind_addr: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(state);

    tracing::info!("Koban API listening on {}", bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
