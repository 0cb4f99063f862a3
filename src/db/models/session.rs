//! Parking session models.
//!
//! A session is one vehicle's parked-to-retrieved lifecycle at a site. The
//! status field is an explicit state machine: `parked` and `in-progress` may
//! advance, `retrieved` is terminal. Invalid transitions are rejected with a
//! [`TransitionError`] rather than written through.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[serde(rename = "parked")]
    Parked,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "retrieved")]
    Retrieved,
}

impl SessionStatus {
    /// Transition table: parked → in-progress → retrieved, with the
    /// parked → retrieved shortcut for direct pickups.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Parked, SessionStatus::InProgress)
                | (SessionStatus::Parked, SessionStatus::Retrieved)
                | (SessionStatus::InProgress, SessionStatus::Retrieved)
        )
    }

    pub fn transition_to(&self, next: SessionStatus) -> Result<SessionStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError::new("session", self, next))
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Retrieved)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Parked => write!(f, "parked"),
            SessionStatus::InProgress => write!(f, "in-progress"),
            SessionStatus::Retrieved => write!(f, "retrieved"),
        }
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parked" => Ok(SessionStatus::Parked),
            "in-progress" => Ok(SessionStatus::InProgress),
            "retrieved" => Ok(SessionStatus::Retrieved),
            _ => Err(format!("Unknown session status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParkingSession {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: String,
    pub site_id: String,
    pub valet_id: Option<String>,
    pub parking_level: Option<String>,
    pub entry_time: String,
    pub exit_time: Option<String>,
    pub duration_minutes: Option<i64>,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub ticket_id: String,
    pub status: String,
    pub is_paid: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ParkingSession {
    pub fn status_enum(&self) -> Option<SessionStatus> {
        self.status.parse().ok()
    }
}

/// Flat row produced by the session enrichment JOIN. Relationship cardinality
/// is resolved here, once: vehicle and site are inner joins, valet and the
/// owning user's name come from LEFT JOINs and are nullable.
#[derive(Debug, Clone, FromRow)]
pub struct SessionDetailRow {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: String,
    pub site_id: String,
    pub valet_id: Option<String>,
    pub parking_level: Option<String>,
    pub entry_time: String,
    pub exit_time: Option<String>,
    pub duration_minutes: Option<i64>,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub ticket_id: String,
    pub status: String,
    pub is_paid: bool,
    pub created_at: String,
    pub updated_at: String,
    // vehicle
    pub vehicle_number: String,
    pub vehicle_model: String,
    pub vehicle_type: String,
    pub vehicle_color: Option<String>,
    pub vehicle_active: bool,
    // site
    pub site_name: String,
    pub site_location: String,
    pub site_city: Option<String>,
    pub site_state: Option<String>,
    pub site_zipcode: Option<String>,
    pub site_total_spots: i64,
    pub site_available_spots: i64,
    pub site_active: bool,
    // valet (nullable)
    pub valet_user_id: Option<String>,
    pub valet_site_id: Option<String>,
    pub valet_name: Option<String>,
    pub valet_phone: Option<String>,
    pub valet_parkings: Option<i64>,
    pub valet_retrievals: Option<i64>,
    pub valet_active: Option<bool>,
    // owning user, for customer-name search
    pub owner_name: String,
}

/// SQL for the session enrichment JOIN; callers append WHERE/ORDER clauses.
pub const SESSION_DETAIL_SQL: &str = r#"
SELECT s.id, s.user_id, s.vehicle_id, s.site_id, s.valet_id, s.parking_level,
       s.entry_time, s.exit_time, s.duration_minutes, s.amount, s.payment_method,
       s.ticket_id, s.status, s.is_paid, s.created_at, s.updated_at,
       v.vehicle_number, v.vehicle_model, v.vehicle_type,
       v.color AS vehicle_color, v.is_active AS vehicle_active,
       st.name AS site_name, st.location AS site_location, st.city AS site_city,
       st.state AS site_state, st.zipcode AS site_zipcode,
       st.total_spots AS site_total_spots, st.available_spots AS site_available_spots,
       st.is_active AS site_active,
       va.user_id AS valet_user_id, va.site_id AS valet_site_id,
       va.name AS valet_name, va.phone AS valet_phone,
       va.parkings_completed AS valet_parkings,
       va.retrievals_completed AS valet_retrievals,
       va.is_active AS valet_active,
       u.name AS owner_name
FROM parking_sessions s
INNER JOIN vehicles v ON v.id = s.vehicle_id
INNER JOIN sites st ON st.id = s.site_id
INNER JOIN users u ON u.id = s.user_id
LEFT JOIN valets va ON va.id = s.valet_id
"#;

/// Nested vehicle on a session response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionVehicle {
    pub id: String,
    pub userid: String,
    pub vehiclenumber: String,
    pub vehiclemodel: String,
    pub vehicletype: String,
    pub color: Option<String>,
    pub isactive: bool,
}

/// Nested site on a session response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSite {
    pub id: String,
    pub name: String,
    pub location: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub totalspots: i64,
    pub availablespots: i64,
    pub isactive: bool,
}

/// Nested valet on a session response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionValet {
    pub id: String,
    pub userid: String,
    pub siteid: String,
    pub name: String,
    pub phone: String,
    pub parkingscompleted: i64,
    pub retrievalscompleted: i64,
    pub isactive: bool,
}

/// Wire shape for a parking session. Scalar field names match the frontend
/// contract (lowercase concatenated); absent relations serialize as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: String,
    pub userid: String,
    pub vehicleid: String,
    pub siteid: String,
    pub valetid: Option<String>,
    pub parkinglevel: Option<String>,
    pub entrytime: String,
    pub exittime: Option<String>,
    pub durationminutes: Option<i64>,
    pub amount: f64,
    pub paymentmethod: Option<String>,
    pub ticketid: String,
    pub status: String,
    pub ispaid: bool,
    pub createdat: String,
    pub updatedat: String,
    pub vehicle: Option<SessionVehicle>,
    pub site: Option<SessionSite>,
    pub valet: Option<SessionValet>,
}

impl From<SessionDetailRow> for SessionResponse {
    fn from(row: SessionDetailRow) -> Self {
        let vehicle = Some(SessionVehicle {
            id: row.vehicle_id.clone(),
            userid: row.user_id.clone(),
            vehiclenumber: row.vehicle_number,
            vehiclemodel: row.vehicle_model,
            vehicletype: row.vehicle_type,
            color: row.vehicle_color,
            isactive: row.vehicle_active,
        });
        let site = Some(SessionSite {
            id: row.site_id.clone(),
            name: row.site_name,
            location: row.site_location,
            city: row.site_city,
            state: row.site_state,
            zipcode: row.site_zipcode,
            totalspots: row.site_total_spots,
            availablespots: row.site_available_spots,
            isactive: row.site_active,
        });
        let valet = match (&row.valet_id, row.valet_name) {
            (Some(id), Some(name)) => Some(SessionValet {
                id: id.clone(),
                userid: row.valet_user_id.unwrap_or_default(),
                siteid: row.valet_site_id.unwrap_or_default(),
                name,
                phone: row.valet_phone.unwrap_or_default(),
                parkingscompleted: row.valet_parkings.unwrap_or(0),
                retrievalscompleted: row.valet_retrievals.unwrap_or(0),
                isactive: row.valet_active.unwrap_or(false),
            }),
            _ => None,
        };

        Self {
            id: row.id,
            userid: row.user_id,
            vehicleid: row.vehicle_id,
            siteid: row.site_id,
            valetid: row.valet_id,
            parkinglevel: row.parking_level,
            entrytime: row.entry_time,
            exittime: row.exit_time,
            durationminutes: row.duration_minutes,
            amount: row.amount,
            paymentmethod: row.payment_method,
            ticketid: row.ticket_id,
            status: row.status,
            ispaid: row.is_paid,
            createdat: row.created_at,
            updatedat: row.updated_at,
            vehicle,
            site,
            valet,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub user_id: String,
    pub vehicle_id: String,
    pub site_id: String,
    pub valet_id: Option<String>,
    pub parking_level: Option<String>,
    pub amount: f64,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub status: Option<String>,
    pub exit_time: Option<String>,
}
