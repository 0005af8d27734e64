//! HTTP API Layer
//!
//! This crate provides the REST API of the fund registry using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for funds, reports and health
//! - **Middleware**: Request logging, tracing and `x-request-id` propagation
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses with field-keyed validation errors
//!
//! # Routes
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET, POST | `/api/fundos` | list (filters `cnpj`, `classe`, `estrategia`, `relatorio`, `search`), create |
//! | GET | `/api/fundos/classes` | distinct classes |
//! | GET | `/api/fundos/estrategias` | distinct strategies |
//! | GET, PUT, PATCH, DELETE | `/api/fundos/:id` | retrieve, update, partial update, delete |
//! | GET | `/api/fundos/:id/relatorios` | linked reports |
//! | GET | `/api/relatorios` | active reports (filter `nome`) |
//! | GET | `/api/relatorios/:id` | one active report |
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(service);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use axum::{
    Router,
    routing::get,
    middleware as axum_middleware,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use domain_fundo::FundoService;

use crate::middleware::request_log_middleware;
use crate::handlers::{fundo, relatorio, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: FundoService,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - Fund service wired to its storage adapters
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(service: FundoService) -> Router {
    let state = AppState { service };

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let fundo_routes = Router::new()
        .route("/", get(fundo::list_fundos).post(fundo::create_fundo))
        .route("/classes", get(fundo::list_classes))
        .route("/estrategias", get(fundo::list_estrategias))
        .route(
            "/:id",
            get(fundo::get_fundo)
                .put(fundo::update_fundo)
                .patch(fundo::patch_fundo)
                .delete(fundo::delete_fundo),
        )
        .route("/:id/relatorios", get(fundo::list_fundo_relatorios));

    let relatorio_routes = Router::new()
        .route("/", get(relatorio::list_relatorios))
        .route("/:id", get(relatorio::get_relatorio));

    let api_routes = Router::new()
        .nest("/fundos", fundo_routes)
        .nest("/relatorios", relatorio_routes)
        .layer(axum_middleware::from_fn(request_log_middleware));

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
