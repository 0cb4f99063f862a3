//! Admin API endpoints: per-site stats, site listing, driver approval review,
//! and the fixture reset.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::db::{
    ApprovalResponse, ApprovalStatus, DriverApproval, ParkingSession, ReviewApprovalRequest,
    SessionStatus, Site, SiteResponse, SiteStats,
};
use crate::AppState;

use super::error::ApiError;
use super::validation::validate_uuid;

/// True when an RFC 3339 timestamp falls on the current UTC date.
fn is_today(timestamp: &str) -> bool {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&Utc).date_naive() == Utc::now().date_naive())
        .unwrap_or(false)
}

/// GET /api/admin/stats/:site_id
pub async fn get_site_stats(
    State(state): State<Arc<AppState>>,
    Path(site_id): Path<String>,
) -> Result<Json<SiteStats>, ApiError> {
    if let Err(e) = validate_uuid(&site_id, "site_id") {
        return Err(ApiError::validation_field("siteId", e));
    }

    let site: Option<Site> = sqlx::query_as("SELECT * FROM sites WHERE id = ?")
        .bind(&site_id)
        .fetch_optional(&state.db)
        .await?;
    if site.is_none() {
        return Err(ApiError::not_found("Site not found"));
    }

    let sessions: Vec<ParkingSession> =
        sqlx::query_as("SELECT * FROM parking_sessions WHERE site_id = ?")
            .bind(&site_id)
            .fetch_all(&state.db)
            .await?;

    let mut stats = SiteStats {
        active_cars: 0,
        retrieving: 0,
        total_today: 0,
        revenue: 0.0,
        total_tickets: sessions.len() as i64,
        total_collection: 0.0,
        active_parking: 0,
        activevalets: 0,
        totalsessions: sessions.len() as i64,
    };

    for session in &sessions {
        let status = session.status_enum();
        if status != Some(SessionStatus::Retrieved) {
            stats.active_cars += 1;
        }
        if status == Some(SessionStatus::InProgress) {
            stats.retrieving += 1;
        }
        let today = is_today(&session.entry_time);
        if today {
            stats.total_today += 1;
        }
        if session.is_paid {
            stats.total_collection += session.amount;
            if today {
                stats.revenue += session.amount;
            }
        }
    }
    stats.active_parking = stats.active_cars;
    // Placeholder heuristic until valet shift data exists
    stats.activevalets = (stats.active_cars + 1) / 2;

    Ok(Json(stats))
}

/// GET /api/admin/sites
pub async fn list_sites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SiteResponse>>, ApiError> {
    let sites: Vec<Site> = sqlx::query_as("SELECT * FROM sites ORDER BY name ASC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(sites.into_iter().map(SiteResponse::from).collect()))
}

/// GET /api/admin/approvals
pub async fn list_approvals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ApprovalResponse>>, ApiError> {
    let approvals: Vec<DriverApproval> =
        sqlx::query_as("SELECT * FROM driver_approvals ORDER BY submitted_at DESC")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(
        approvals.into_iter().map(ApprovalResponse::from).collect(),
    ))
}

/// GET /api/admin/approvals/pending
pub async fn list_pending_approvals(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ApprovalResponse>>, ApiError> {
    let approvals: Vec<DriverApproval> = sqlx::query_as(
        "SELECT * FROM driver_approvals WHERE status = 'pending' ORDER BY submitted_at DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(
        approvals.into_iter().map(ApprovalResponse::from).collect(),
    ))
}

async fn review_approval(
    state: &AppState,
    id: &str,
    request: &ReviewApprovalRequest,
    outcome: ApprovalStatus,
) -> Result<ApprovalResponse, ApiError> {
    if let Err(e) = validate_uuid(id, "approval_id") {
        return Err(ApiError::validation_field("id", e));
    }
    if let Err(e) = validate_uuid(&request.admin_id, "admin_id") {
        return Err(ApiError::validation_field("adminId", e));
    }

    let approval: DriverApproval = sqlx::query_as("SELECT * FROM driver_approvals WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Approval not found"))?;

    let current = approval
        .status_enum()
        .ok_or_else(|| ApiError::internal("Approval has an unknown status"))?;
    let next = current.transition_to(outcome)?;

    let now = Utc::now().to_rfc3339();
    // approved_at records the approval moment; a rejection leaves it null
    let approved_at = (next == ApprovalStatus::Approved).then(|| now.clone());
    sqlx::query(
        "UPDATE driver_approvals
         SET status = ?, approved_at = ?, reviewed_by = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(next.to_string())
    .bind(approved_at)
    .bind(&request.admin_id)
    .bind(&now)
    .bind(id)
    .execute(&state.db)
    .await?;

    let updated: DriverApproval = sqlx::query_as("SELECT * FROM driver_approvals WHERE id = ?")
        .bind(id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(approval_id = %id, outcome = %next, "Approval reviewed");
    Ok(ApprovalResponse::from(updated))
}

/// PATCH /api/admin/approvals/:id/approve
pub async fn approve_approval(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ReviewApprovalRequest>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let approval = review_approval(&state, &id, &request, ApprovalStatus::Approved).await?;
    Ok(Json(approval))
}

/// PATCH /api/admin/approvals/:id/reject
pub async fn reject_approval(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ReviewApprovalRequest>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let approval = review_approval(&state, &id, &request, ApprovalStatus::Rejected).await?;
    Ok(Json(approval))
}

#[derive(Serialize)]
pub struct ResetResponse {
    pub message: String,
    #[serde(rename = "testUsers")]
    pub test_users: crate::db::seeders::SeededUsers,
}

/// POST /api/admin/reset-database
pub async fn reset_database(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ResetResponse>), ApiError> {
    let test_users = crate::db::seeders::reset_and_seed(&state.db)
        .await
        .map_err(|e| {
            tracing::error!("Database reset failed: {:#}", e);
            ApiError::database("Database reset failed")
        })?;

    Ok((
        StatusCode::OK,
        Json(ResetResponse {
            message: "Database reset to fixture state".to_string(),
            test_users,
        }),
    ))
}
