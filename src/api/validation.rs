//! Input validation for API requests.
//!
//! Request data is checked before any query runs; failures are collected with
//! the `ValidationErrorBuilder` from the `error` module and returned as one
//! 400 response.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating email addresses (pragmatic, not RFC-complete)
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();

    /// Regex for validating customer-facing ticket ids
    static ref TICKET_ID_REGEX: Regex = Regex::new(r"^TKT-\d+-[a-z0-9]+$").unwrap();
}

/// Validate a UUID string.
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}

/// Validate an email address.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a ticket id.
pub fn validate_ticket_id(ticket_id: &str) -> Result<(), String> {
    if ticket_id.is_empty() {
        return Err("Ticket id is required".to_string());
    }

    if !TICKET_ID_REGEX.is_match(ticket_id) {
        return Err("Invalid ticket id format".to_string());
    }

    Ok(())
}

/// Validate a monetary amount.
pub fn validate_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() {
        return Err("Amount must be a finite number".to_string());
    }

    if amount < 0.0 {
        return Err("Amount must not be negative".to_string());
    }

    Ok(())
}

/// Valid payment methods (optional field; None means unpaid cash-on-exit)
const VALID_PAYMENT_METHODS: [&str; 4] = ["card", "upi", "netbanking", "cash"];

/// Validate a payment method value.
pub fn validate_payment_method(method: &Option<String>) -> Result<(), String> {
    if let Some(m) = method {
        if m.is_empty() {
            return Ok(());
        }

        if !VALID_PAYMENT_METHODS.contains(&m.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid payment method. Must be one of: {}",
                VALID_PAYMENT_METHODS.join(", ")
            ));
        }
    }

    Ok(())
}

/// Validate an assignment type value.
pub fn validate_assignment_type(kind: &str) -> Result<(), String> {
    kind.parse::<crate::db::AssignmentType>()
        .map(|_| ())
        .map_err(|_| "Invalid type. Must be one of: park, retrieve".to_string())
}

/// Validate a session status value.
pub fn validate_session_status(status: &str) -> Result<(), String> {
    status
        .parse::<crate::db::SessionStatus>()
        .map(|_| ())
        .map_err(|_| "Invalid status. Must be one of: parked, in-progress, retrieved".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "user_id").is_ok());
        assert!(validate_uuid("", "user_id").is_err());
        assert!(validate_uuid("not-a-uuid", "user_id").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user1@test.com").is_ok());
        assert!(validate_email("driver.one+demo@example.co.in").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("user@nodot").is_err());
    }

    #[test]
    fn test_validate_ticket_id() {
        assert!(validate_ticket_id("TKT-1724578912345-a1b2c3d4e").is_ok());
        assert!(validate_ticket_id("TKT-1724578912345-001").is_ok());

        assert!(validate_ticket_id("").is_err());
        assert!(validate_ticket_id("TICKET-123").is_err());
        assert!(validate_ticket_id("TKT-abc-def").is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0.0).is_ok());
        assert!(validate_amount(45.5).is_ok());

        assert!(validate_amount(-1.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_payment_method() {
        assert!(validate_payment_method(&Some("card".to_string())).is_ok());
        assert!(validate_payment_method(&Some("UPI".to_string())).is_ok());
        assert!(validate_payment_method(&None).is_ok());
        assert!(validate_payment_method(&Some("".to_string())).is_ok());

        assert!(validate_payment_method(&Some("bitcoin".to_string())).is_err());
    }

    #[test]
    fn test_validate_assignment_type() {
        assert!(validate_assignment_type("park").is_ok());
        assert!(validate_assignment_type("retrieve").is_ok());
        assert!(validate_assignment_type("deliver").is_err());
    }

    #[test]
    fn test_validate_session_status() {
        assert!(validate_session_status("parked").is_ok());
        assert!(validate_session_status("in-progress").is_ok());
        assert!(validate_session_status("retrieved").is_ok());
        assert!(validate_session_status("towed").is_err());
    }
}
