mod admin;
mod assignments;
mod error;
mod manager;
mod parking;
mod test_data;
mod validation;

pub use error::{ApiError, ErrorCode, ErrorResponse};

use axum::{
    http::HeaderValue,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "valetd is running",
    })
}

async fn endpoint_not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Invalid cors_origin '{}', allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/stats/:site_id", get(admin::get_site_stats))
        .route("/sites", get(admin::list_sites))
        .route("/approvals", get(admin::list_approvals))
        .route("/approvals/pending", get(admin::list_pending_approvals))
        .route("/approvals/:id/approve", patch(admin::approve_approval))
        .route("/approvals/:id/reject", patch(admin::reject_approval))
        .route("/reset-database", post(admin::reset_database));

    let assignment_routes = Router::new()
        .route("/", post(assignments::create_assignment))
        .route("/driver/:driver_id", get(assignments::list_driver_assignments))
        .route("/:id/accept", patch(assignments::accept_assignment))
        .route("/:id/complete", patch(assignments::complete_assignment))
        .route("/stats/:driver_id", get(assignments::get_driver_stats));

    let manager_routes = Router::new()
        .route("/sessions", get(manager::list_sessions))
        .route("/sessions/:id/reassign-valet", patch(manager::reassign_valet))
        .route("/valets/:site_id", get(manager::list_site_valets));

    let parking_routes = Router::new()
        .route("/sessions", post(parking::create_session))
        .route("/sessions/:id", patch(parking::update_session))
        .route("/sessions/user/:user_id", get(parking::list_user_sessions))
        .route("/sessions/ticket/:ticket_id", get(parking::get_session_by_ticket));

    let mut api_routes = Router::new()
        .route("/health", get(health_check))
        .nest("/admin", admin_routes)
        .nest("/assignments", assignment_routes)
        .nest("/manager", manager_routes)
        .nest("/parking", parking_routes);

    // Development-only convenience routes
    if state.config.is_development() {
        let test_routes = Router::new()
            .route("/test-user", get(test_data::get_test_user))
            .route("/test-driver", get(test_data::get_test_driver))
            .route("/test-admin", get(test_data::get_test_admin))
            .route("/user/:user_id/vehicles", get(test_data::list_user_vehicles))
            .route("/sites", get(test_data::list_sites));
        api_routes = api_routes.nest("/test", test_routes);
    }

    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .nest("/api", api_routes.fallback(endpoint_not_found))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
