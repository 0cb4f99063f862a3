//! Vehicle models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: String,
    pub user_id: String,
    pub vehicle_number: String,
    pub vehicle_model: String,
    pub vehicle_type: String,
    pub color: Option<String>,
    pub registration_number: Option<String>,
    pub registration_expiry: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Wire shape for a vehicle. Field names match the frontend contract
/// (lowercase concatenated).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleResponse {
    pub id: String,
    pub userid: String,
    pub vehiclenumber: String,
    pub vehiclemodel: String,
    pub vehicletype: String,
    pub color: Option<String>,
    pub registrationnumber: Option<String>,
    pub registrationexpiry: Option<String>,
    pub isactive: bool,
    pub createdat: String,
    pub updatedat: String,
}

impl From<Vehicle> for VehicleResponse {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            userid: v.user_id,
            vehiclenumber: v.vehicle_number,
            vehiclemodel: v.vehicle_model,
            vehicletype: v.vehicle_type,
            color: v.color,
            registrationnumber: v.registration_number,
            registrationexpiry: v.registration_expiry,
            isactive: v.is_active,
            createdat: v.created_at,
            updatedat: v.updated_at,
        }
    }
}
