//! Driver approval models: the onboarding review record.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::TransitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Transition table: pending → approved | rejected; both outcomes terminal.
    pub fn can_transition_to(&self, next: ApprovalStatus) -> bool {
        matches!(
            (self, next),
            (ApprovalStatus::Pending, ApprovalStatus::Approved)
                | (ApprovalStatus::Pending, ApprovalStatus::Rejected)
        )
    }

    pub fn transition_to(&self, next: ApprovalStatus) -> Result<ApprovalStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError::new("approval", self, next))
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalStatus::Pending => write!(f, "pending"),
            ApprovalStatus::Approved => write!(f, "approved"),
            ApprovalStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            _ => Err(format!("Unknown approval status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DriverApproval {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    pub experience: String,
    pub status: String,
    pub submitted_at: String,
    pub approved_at: Option<String>,
    pub reviewed_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl DriverApproval {
    pub fn status_enum(&self) -> Option<ApprovalStatus> {
        self.status.parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub licensenumber: String,
    pub experience: String,
    pub status: String,
    pub submittedat: String,
    pub approvedat: Option<String>,
    pub reviewedby: Option<String>,
    pub createdat: String,
    pub updatedat: String,
}

impl From<DriverApproval> for ApprovalResponse {
    fn from(a: DriverApproval) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            phone: a.phone,
            licensenumber: a.license_number,
            experience: a.experience,
            status: a.status,
            submittedat: a.submitted_at,
            approvedat: a.approved_at,
            reviewedby: a.reviewed_by,
            createdat: a.created_at,
            updatedat: a.updated_at,
        }
    }
}

/// Body for approve/reject: the reviewing admin's id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewApprovalRequest {
    pub admin_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_branches() {
        assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Approved));
        assert!(ApprovalStatus::Pending.can_transition_to(ApprovalStatus::Rejected));
    }

    #[test]
    fn test_outcomes_are_terminal() {
        assert!(!ApprovalStatus::Approved.can_transition_to(ApprovalStatus::Rejected));
        assert!(!ApprovalStatus::Rejected.can_transition_to(ApprovalStatus::Approved));
        assert!(!ApprovalStatus::Approved.can_transition_to(ApprovalStatus::Pending));
    }
}
