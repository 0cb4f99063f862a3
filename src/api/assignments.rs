//! Assignment API endpoints: driver task lists, dispatch, and the
//! accept/complete lifecycle.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    Assignment, AssignmentDetailRow, AssignmentResponse, AssignmentStatus, AssignmentType,
    CreateAssignmentRequest, DriverStats, ParkingSession, User, UserRole, ASSIGNMENT_DETAIL_SQL,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_assignment_type, validate_uuid};

/// Flat payout per completed assignment; earnings are derived, not stored.
const EARNINGS_PER_COMPLETION: f64 = 200.0;

async fn fetch_assignment_detail(
    state: &AppState,
    id: &str,
) -> Result<AssignmentResponse, ApiError> {
    let sql = format!("{} WHERE a.id = ?", ASSIGNMENT_DETAIL_SQL);
    let row: AssignmentDetailRow = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment not found"))?;
    Ok(AssignmentResponse::from(row))
}

async fn require_driver(state: &AppState, driver_id: &str) -> Result<User, ApiError> {
    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(driver_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Driver not found"))?;

    if user.role_enum() != UserRole::Driver {
        return Err(ApiError::bad_request("User is not a driver"));
    }
    Ok(user)
}

/// GET /api/assignments/driver/:driver_id
pub async fn list_driver_assignments(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    if let Err(e) = validate_uuid(&driver_id, "driver_id") {
        return Err(ApiError::validation_field("driverId", e));
    }

    let sql = format!(
        "{} WHERE a.driver_id = ? ORDER BY a.assigned_at DESC",
        ASSIGNMENT_DETAIL_SQL
    );
    let rows: Vec<AssignmentDetailRow> = sqlx::query_as(&sql)
        .bind(&driver_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(AssignmentResponse::from).collect()))
}

/// POST /api/assignments
///
/// Dispatches a park/retrieve task. The session is authoritative for vehicle
/// and site context, so the body only carries driver, session, and type.
pub async fn create_assignment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_uuid(&request.driver_id, "driver_id") {
        errors.add("driverId", e);
    }
    if let Err(e) = validate_uuid(&request.session_id, "session_id") {
        errors.add("sessionId", e);
    }
    if let Err(e) = validate_assignment_type(&request.kind) {
        errors.add("type", e);
    }
    errors.finish()?;

    require_driver(&state, &request.driver_id).await?;

    let session: Option<ParkingSession> =
        sqlx::query_as("SELECT * FROM parking_sessions WHERE id = ?")
            .bind(&request.session_id)
            .fetch_optional(&state.db)
            .await?;
    if session.is_none() {
        return Err(ApiError::not_found("Parking session not found"));
    }

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO assignments
            (id, driver_id, session_id, type, status, customer_name,
             assigned_at, created_at, updated_at)
         VALUES (?, ?, ?, ?, 'pending', ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&request.driver_id)
    .bind(&request.session_id)
    .bind(request.kind.to_lowercase())
    .bind(&request.customer_name)
    .bind(&now)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    tracing::info!(assignment_id = %id, driver_id = %request.driver_id, "Assignment created");

    let assignment = fetch_assignment_detail(&state, &id).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn transition_assignment(
    state: &AppState,
    id: &str,
    next: AssignmentStatus,
) -> Result<AssignmentResponse, ApiError> {
    if let Err(e) = validate_uuid(id, "assignment_id") {
        return Err(ApiError::validation_field("id", e));
    }

    let assignment: Assignment = sqlx::query_as("SELECT * FROM assignments WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Assignment not found"))?;

    let current = assignment
        .status_enum()
        .ok_or_else(|| ApiError::internal("Assignment has an unknown status"))?;
    let next = current.transition_to(next)?;

    let now = Utc::now().to_rfc3339();
    let completed_at = (next == AssignmentStatus::Completed).then(|| now.clone());
    sqlx::query(
        "UPDATE assignments SET status = ?, completed_at = ?, updated_at = ? WHERE id = ?",
    )
    .bind(next.to_string())
    .bind(completed_at)
    .bind(&now)
    .bind(id)
    .execute(&state.db)
    .await?;

    tracing::info!(assignment_id = %id, status = %next, "Assignment transitioned");
    fetch_assignment_detail(state, id).await
}

/// PATCH /api/assignments/:id/accept
pub async fn accept_assignment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let assignment = transition_assignment(&state, &id, AssignmentStatus::Accepted).await?;
    Ok(Json(assignment))
}

/// PATCH /api/assignments/:id/complete
pub async fn complete_assignment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let assignment = transition_assignment(&state, &id, AssignmentStatus::Completed).await?;
    Ok(Json(assignment))
}

/// GET /api/assignments/stats/:driver_id
pub async fn get_driver_stats(
    State(state): State<Arc<AppState>>,
    Path(driver_id): Path<String>,
) -> Result<Json<DriverStats>, ApiError> {
    if let Err(e) = validate_uuid(&driver_id, "driver_id") {
        return Err(ApiError::validation_field("driverId", e));
    }

    let assignments: Vec<Assignment> =
        sqlx::query_as("SELECT * FROM assignments WHERE driver_id = ?")
            .bind(&driver_id)
            .fetch_all(&state.db)
            .await?;

    let mut stats = DriverStats {
        total_parkings: 0,
        total_retrievals: 0,
        currently_parked: 0,
        total_earnings: 0.0,
    };

    for assignment in &assignments {
        let status = assignment.status_enum();
        let kind = assignment.type_enum();
        match (status, kind) {
            (Some(AssignmentStatus::Completed), Some(AssignmentType::Park)) => {
                stats.total_parkings += 1;
            }
            (Some(AssignmentStatus::Completed), Some(AssignmentType::Retrieve)) => {
                stats.total_retrievals += 1;
            }
            (
                Some(AssignmentStatus::Pending) | Some(AssignmentStatus::Accepted),
                Some(AssignmentType::Park),
            ) => {
                stats.currently_parked += 1;
            }
            _ => {}
        }
    }
    stats.total_earnings =
        (stats.total_parkings + stats.total_retrievals) as f64 * EARNINGS_PER_COMPLETION;

    Ok(Json(stats))
}
