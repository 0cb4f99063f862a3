//! Assignment models.
//!
//! An assignment dispatches a park or retrieve task to a driver. Every
//! assignment carries a `session_id`; enrichment joins on it, so the response
//! always reflects the linked parking session's ticket and status.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Completed,
}

impl AssignmentStatus {
    /// Transition table: pending → accepted → completed, nothing else.
    pub fn can_transition_to(&self, next: AssignmentStatus) -> bool {
        matches!(
            (self, next),
            (AssignmentStatus::Pending, AssignmentStatus::Accepted)
                | (AssignmentStatus::Accepted, AssignmentStatus::Completed)
        )
    }

    pub fn transition_to(
        &self,
        next: AssignmentStatus,
    ) -> Result<AssignmentStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError::new("assignment", self, next))
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Pending => write!(f, "pending"),
            AssignmentStatus::Accepted => write!(f, "accepted"),
            AssignmentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AssignmentStatus::Pending),
            "accepted" => Ok(AssignmentStatus::Accepted),
            "completed" => Ok(AssignmentStatus::Completed),
            _ => Err(format!("Unknown assignment status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    Park,
    Retrieve,
}

impl std::fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentType::Park => write!(f, "park"),
            AssignmentType::Retrieve => write!(f, "retrieve"),
        }
    }
}

impl std::str::FromStr for AssignmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "park" => Ok(AssignmentType::Park),
            "retrieve" => Ok(AssignmentType::Retrieve),
            _ => Err(format!("Unknown assignment type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assignment {
    pub id: String,
    pub driver_id: String,
    pub session_id: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub status: String,
    pub customer_name: Option<String>,
    pub assigned_at: String,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Assignment {
    pub fn status_enum(&self) -> Option<AssignmentStatus> {
        self.status.parse().ok()
    }

    pub fn type_enum(&self) -> Option<AssignmentType> {
        self.kind.parse().ok()
    }
}

/// Flat row from the assignment enrichment JOIN (assignment → session →
/// vehicle → site, all inner joins since session_id is NOT NULL).
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentDetailRow {
    pub id: String,
    pub driver_id: String,
    pub session_id: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub status: String,
    pub customer_name: Option<String>,
    pub assigned_at: String,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub ticket_id: String,
    pub session_status: String,
    pub vehicle_number: String,
    pub vehicle_model: String,
    pub site_name: String,
    pub site_location: String,
}

/// SQL for the assignment enrichment JOIN; callers append WHERE/ORDER clauses.
pub const ASSIGNMENT_DETAIL_SQL: &str = r#"
SELECT a.id, a.driver_id, a.session_id, a.type, a.status, a.customer_name,
       a.assigned_at, a.completed_at, a.created_at, a.updated_at,
       s.ticket_id, s.status AS session_status,
       v.vehicle_number, v.vehicle_model,
       st.name AS site_name, st.location AS site_location
FROM assignments a
INNER JOIN parking_sessions s ON s.id = a.session_id
INNER JOIN vehicles v ON v.id = s.vehicle_id
INNER JOIN sites st ON st.id = s.site_id
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentVehicle {
    pub number: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentSite {
    pub name: String,
    pub location: String,
}

/// Nested session summary on an assignment response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSession {
    pub id: String,
    pub ticket_id: String,
    pub status: String,
    pub vehicle: AssignmentVehicle,
    pub site: AssignmentSite,
}

/// Wire shape for an assignment (camelCase, per the frontend contract).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    pub id: String,
    pub driver_id: String,
    pub session_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub customer_name: Option<String>,
    pub assigned_at: String,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub parking_session: AssignmentSession,
}

impl From<AssignmentDetailRow> for AssignmentResponse {
    fn from(row: AssignmentDetailRow) -> Self {
        Self {
            id: row.id,
            driver_id: row.driver_id,
            session_id: row.session_id.clone(),
            kind: row.kind,
            status: row.status,
            customer_name: row.customer_name,
            assigned_at: row.assigned_at,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            parking_session: AssignmentSession {
                id: row.session_id,
                ticket_id: row.ticket_id,
                status: row.session_status,
                vehicle: AssignmentVehicle {
                    number: row.vehicle_number,
                    model: row.vehicle_model,
                },
                site: AssignmentSite {
                    name: row.site_name,
                    location: row.site_location,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    pub driver_id: String,
    pub session_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub customer_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        assert!(AssignmentStatus::Pending.can_transition_to(AssignmentStatus::Accepted));
        assert!(AssignmentStatus::Accepted.can_transition_to(AssignmentStatus::Completed));
    }

    #[test]
    fn test_complete_requires_accept() {
        assert!(!AssignmentStatus::Pending.can_transition_to(AssignmentStatus::Completed));
        let err = AssignmentStatus::Pending
            .transition_to(AssignmentStatus::Completed)
            .unwrap_err();
        assert_eq!(err.from, "pending");
        assert_eq!(err.to, "completed");
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(!AssignmentStatus::Completed.can_transition_to(AssignmentStatus::Pending));
        assert!(!AssignmentStatus::Completed.can_transition_to(AssignmentStatus::Accepted));
    }
}
