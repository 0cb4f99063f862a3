//! Parking site models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub location: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub total_spots: i64,
    pub available_spots: i64,
    pub manager_user_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteResponse {
    pub id: String,
    pub name: String,
    pub location: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub totalspots: i64,
    pub availablespots: i64,
    pub isactive: bool,
    pub createdat: String,
    pub updatedat: String,
}

impl From<Site> for SiteResponse {
    fn from(s: Site) -> Self {
        Self {
            id: s.id,
            name: s.name,
            location: s.location,
            city: s.city,
            state: s.state,
            zipcode: s.zipcode,
            totalspots: s.total_spots,
            availablespots: s.available_spots,
            isactive: s.is_active,
            createdat: s.created_at,
            updatedat: s.updated_at,
        }
    }
}
