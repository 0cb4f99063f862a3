//! Development-only convenience endpoints: fixture account lookup, a user's
//! vehicles, and the site list. Mounted only when the environment is
//! development or test.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::db::{Site, SiteResponse, UserResponse, Vehicle, VehicleResponse};
use crate::AppState;

use super::error::ApiError;
use super::validation::validate_uuid;

async fn first_user_by_role(state: &AppState, role: &str) -> Result<UserResponse, ApiError> {
    let user: UserResponse = sqlx::query_as(
        "SELECT id, email, name, role FROM users WHERE role = ? ORDER BY email ASC LIMIT 1",
    )
    .bind(role)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found(format!("No {} account seeded", role)))?;
    Ok(user)
}

/// GET /api/test/test-user
pub async fn get_test_user(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(first_user_by_role(&state, "user").await?))
}

/// GET /api/test/test-driver
pub async fn get_test_driver(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(first_user_by_role(&state, "driver").await?))
}

/// GET /api/test/test-admin
pub async fn get_test_admin(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(first_user_by_role(&state, "admin").await?))
}

/// GET /api/test/user/:user_id/vehicles
pub async fn list_user_vehicles(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<VehicleResponse>>, ApiError> {
    if let Err(e) = validate_uuid(&user_id, "user_id") {
        return Err(ApiError::validation_field("userId", e));
    }

    let vehicles: Vec<Vehicle> = sqlx::query_as(
        "SELECT * FROM vehicles WHERE user_id = ? AND is_active = 1 ORDER BY created_at ASC",
    )
    .bind(&user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(vehicles.into_iter().map(VehicleResponse::from).collect()))
}

/// GET /api/test/sites
pub async fn list_sites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SiteResponse>>, ApiError> {
    let sites: Vec<Site> = sqlx::query_as("SELECT * FROM sites ORDER BY name ASC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(sites.into_iter().map(SiteResponse::from).collect()))
}
