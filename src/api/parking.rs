//! Parking session API endpoints: customer session history, park requests,
//! status updates, and ticket lookup.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    CreateSessionRequest, ParkingSession, SessionDetailRow, SessionResponse, SessionStatus,
    UpdateSessionRequest, SESSION_DETAIL_SQL,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_amount, validate_payment_method, validate_ticket_id, validate_uuid,
};

/// Payment methods that settle at park time; everything else is collected on
/// exit.
const PREPAID_METHODS: [&str; 2] = ["card", "upi"];

/// Generate a customer-facing ticket id: TKT-{unix millis}-{9 alphanumerics}.
fn generate_ticket_id() -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("TKT-{}-{}", Utc::now().timestamp_millis(), suffix)
}

async fn fetch_session_detail(state: &AppState, id: &str) -> Result<SessionResponse, ApiError> {
    let sql = format!("{} WHERE s.id = ?", SESSION_DETAIL_SQL);
    let row: SessionDetailRow = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    Ok(SessionResponse::from(row))
}

/// GET /api/parking/sessions/user/:user_id
pub async fn list_user_sessions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    if let Err(e) = validate_uuid(&user_id, "user_id") {
        return Err(ApiError::validation_field("userId", e));
    }

    let sql = format!(
        "{} WHERE s.user_id = ? ORDER BY s.entry_time DESC",
        SESSION_DETAIL_SQL
    );
    let rows: Vec<SessionDetailRow> = sqlx::query_as(&sql)
        .bind(&user_id)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(SessionResponse::from).collect()))
}

/// POST /api/parking/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_uuid(&request.user_id, "user_id") {
        errors.add("userId", e);
    }
    if let Err(e) = validate_uuid(&request.vehicle_id, "vehicle_id") {
        errors.add("vehicleId", e);
    }
    if let Err(e) = validate_uuid(&request.site_id, "site_id") {
        errors.add("siteId", e);
    }
    if let Some(ref valet_id) = request.valet_id {
        if let Err(e) = validate_uuid(valet_id, "valet_id") {
            errors.add("valetId", e);
        }
    }
    if let Err(e) = validate_amount(request.amount) {
        errors.add("amount", e);
    }
    if let Err(e) = validate_payment_method(&request.payment_method) {
        errors.add("paymentMethod", e);
    }
    errors.finish()?;

    let id = Uuid::new_v4().to_string();
    let ticket_id = generate_ticket_id();
    let now = Utc::now().to_rfc3339();
    let is_paid = request
        .payment_method
        .as_deref()
        .map(|m| PREPAID_METHODS.contains(&m.to_lowercase().as_str()))
        .unwrap_or(false);

    sqlx::query(
        "INSERT INTO parking_sessions
            (id, user_id, vehicle_id, site_id, valet_id, parking_level, entry_time,
             amount, payment_method, ticket_id, status, is_paid, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'parked', ?, ?, ?)",
    )
    .bind(&id)
    .bind(&request.user_id)
    .bind(&request.vehicle_id)
    .bind(&request.site_id)
    .bind(&request.valet_id)
    .bind(&request.parking_level)
    .bind(&now)
    .bind(request.amount)
    .bind(&request.payment_method)
    .bind(&ticket_id)
    .bind(is_paid)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    tracing::info!(session_id = %id, ticket_id = %ticket_id, "Parking session created");

    let session = fetch_session_detail(&state, &id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// PATCH /api/parking/sessions/:id
///
/// Optional status change (guarded by the session transition table) and exit
/// time; moving to retrieved with an exit time derives the duration.
pub async fn update_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSessionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if let Err(e) = validate_uuid(&id, "session_id") {
        return Err(ApiError::validation_field("id", e));
    }

    let session: ParkingSession = sqlx::query_as("SELECT * FROM parking_sessions WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;

    let mut status = session.status.clone();
    if let Some(ref requested) = request.status {
        let next: SessionStatus = requested
            .parse()
            .map_err(|e: String| ApiError::validation_field("status", e))?;
        let current = session
            .status_enum()
            .ok_or_else(|| ApiError::internal("Session has an unknown status"))?;
        status = current.transition_to(next)?.to_string();
    }

    let exit_time = request.exit_time.or(session.exit_time);
    let exit_parsed = match &exit_time {
        Some(exit) => Some(DateTime::parse_from_rfc3339(exit).map_err(|_| {
            ApiError::validation_field("exitTime", "Invalid exitTime format, expected RFC 3339")
        })?),
        None => None,
    };

    let duration_minutes = match (exit_parsed, status.as_str()) {
        (Some(exit), "retrieved") => {
            let entry = DateTime::parse_from_rfc3339(&session.entry_time)
                .map_err(|_| ApiError::internal("Session has an unparseable entry time"))?;
            Some((exit - entry).num_minutes().max(0))
        }
        _ => session.duration_minutes,
    };

    sqlx::query(
        "UPDATE parking_sessions
         SET status = ?, exit_time = ?, duration_minutes = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&status)
    .bind(&exit_time)
    .bind(duration_minutes)
    .bind(Utc::now().to_rfc3339())
    .bind(&id)
    .execute(&state.db)
    .await?;

    tracing::info!(session_id = %id, status = %status, "Parking session updated");

    let session = fetch_session_detail(&state, &id).await?;
    Ok(Json(session))
}

/// GET /api/parking/sessions/ticket/:ticket_id
pub async fn get_session_by_ticket(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    if let Err(e) = validate_ticket_id(&ticket_id) {
        return Err(ApiError::validation_field("ticketId", e));
    }

    let sql = format!("{} WHERE s.ticket_id = ?", SESSION_DETAIL_SQL);
    let row: SessionDetailRow = sqlx::query_as(&sql)
        .bind(&ticket_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Ticket not found"))?;

    Ok(Json(SessionResponse::from(row)))
}
