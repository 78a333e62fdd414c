//! HTTP API Layer
//!
//! This crate provides the REST API for customer onboarding using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for customers and health
//! - **Extractors**: `ValidatedJson` runs field-level DTO rules before the
//!   business rule engine sees a request
//! - **Middleware**: Request ids, tracing, audit logging
//! - **Error Handling**: Problem details responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(port, clock, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use axum::{
    middleware as axum_middleware,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use core_kernel::Clock;
use domain_customer::{CustomerPort, CustomerService};

use crate::config::ApiConfig;
use crate::handlers::{customer, health};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
///
/// Handlers read the request deadline and listing page sizes from `config`.
#[derive(Clone)]
pub struct AppState {
    pub service: CustomerService,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(port: Arc<dyn CustomerPort>, clock: Arc<dyn Clock>, config: ApiConfig) -> Self {
        Self {
            service: CustomerService::new(port, clock),
            config,
        }
    }
}

/// Creates the main API router
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Customer routes
    let customer_routes = Router::new()
        .route(
            "/individual",
            get(customer::list_individual).post(customer::create_individual),
        )
        .route(
            "/corporate",
            get(customer::list_corporate).post(customer::create_corporate),
        )
        .route(
            "/:id",
            get(customer::get_customer).delete(customer::delete_customer),
        )
        .route("/:id/contact", put(customer::update_contact));

    let api_routes = Router::new()
        .nest("/customers", customer_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
