//! Manager API endpoints: filtered session listing, valet reassignment, and
//! per-site valet rosters.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{
    SessionDetailRow, SessionResponse, Valet, ValetResponse, SESSION_DETAIL_SQL,
};
use crate::AppState;

use super::error::ApiError;
use super::validation::{validate_session_status, validate_uuid};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListQuery {
    pub status: Option<String>,
    pub site_id: Option<String>,
    pub search: Option<String>,
}

/// GET /api/manager/sessions?status&siteId&search
///
/// Status and site filters are pushed into SQL; the free-text search is
/// applied in-process against the joined plate number and owner name.
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    if let Some(ref status) = query.status {
        if let Err(e) = validate_session_status(status) {
            return Err(ApiError::validation_field("status", e));
        }
    }
    if let Some(ref site_id) = query.site_id {
        if let Err(e) = validate_uuid(site_id, "site_id") {
            return Err(ApiError::validation_field("siteId", e));
        }
    }

    let sql = format!(
        "{} WHERE (? IS NULL OR s.status = ?)
           AND (? IS NULL OR s.site_id = ?)
         ORDER BY s.entry_time DESC",
        SESSION_DETAIL_SQL
    );
    let rows: Vec<SessionDetailRow> = sqlx::query_as(&sql)
        .bind(&query.status)
        .bind(&query.status)
        .bind(&query.site_id)
        .bind(&query.site_id)
        .fetch_all(&state.db)
        .await?;

    let rows = match query.search.as_deref().map(str::trim) {
        Some(needle) if !needle.is_empty() => {
            let needle = needle.to_lowercase();
            rows.into_iter()
                .filter(|row| {
                    row.vehicle_number.to_lowercase().contains(&needle)
                        || row.owner_name.to_lowercase().contains(&needle)
                })
                .collect()
        }
        _ => rows,
    };

    Ok(Json(rows.into_iter().map(SessionResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignValetRequest {
    pub valet_id: String,
}

/// PATCH /api/manager/sessions/:id/reassign-valet
pub async fn reassign_valet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ReassignValetRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "session_id") {
        return Err(ApiError::validation_field("id", e));
    }
    if let Err(e) = validate_uuid(&request.valet_id, "valet_id") {
        return Err(ApiError::validation_field("valetId", e));
    }

    let session_site: Option<(String,)> =
        sqlx::query_as("SELECT site_id FROM parking_sessions WHERE id = ?")
            .bind(&id)
            .fetch_optional(&state.db)
            .await?;
    let (site_id,) = session_site.ok_or_else(|| ApiError::not_found("Session not found"))?;

    let valet: Valet = sqlx::query_as("SELECT * FROM valets WHERE id = ?")
        .bind(&request.valet_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Valet not found"))?;

    if valet.site_id != site_id {
        return Err(ApiError::bad_request(
            "Valet does not serve this session's site",
        ));
    }

    sqlx::query("UPDATE parking_sessions SET valet_id = ?, updated_at = ? WHERE id = ?")
        .bind(&request.valet_id)
        .bind(Utc::now().to_rfc3339())
        .bind(&id)
        .execute(&state.db)
        .await?;

    tracing::info!(session_id = %id, valet_id = %request.valet_id, "Valet reassigned");

    let sql = format!("{} WHERE s.id = ?", SESSION_DETAIL_SQL);
    let row: SessionDetailRow = sqlx::query_as(&sql)
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(SessionResponse::from(row)))
}

/// GET /api/manager/valets/:site_id
pub async fn list_site_valets(
    State(state): State<Arc<AppState>>,
    Path(site_id): Path<String>,
) -> Result<Json<Vec<ValetResponse>>, ApiError> {
    if let Err(e) = validate_uuid(&site_id, "site_id") {
        return Err(ApiError::validation_field("siteId", e));
    }

    let valets: Vec<Valet> =
        sqlx::query_as("SELECT * FROM valets WHERE site_id = ? AND is_active = 1 ORDER BY name ASC")
            .bind(&site_id)
            .fetch_all(&state.db)
            .await?;

    Ok(Json(valets.into_iter().map(ValetResponse::from).collect()))
}
