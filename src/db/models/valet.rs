//! Valet models. A valet row links a driver-role user to the site they serve.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Valet {
    pub id: String,
    pub user_id: String,
    pub site_id: String,
    pub name: String,
    pub phone: String,
    pub parkings_completed: i64,
    pub retrievals_completed: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValetResponse {
    pub id: String,
    pub userid: String,
    pub siteid: String,
    pub name: String,
    pub phone: String,
    pub parkingscompleted: i64,
    pub retrievalscompleted: i64,
    pub isactive: bool,
    pub createdat: String,
    pub updatedat: String,
}

impl From<Valet> for ValetResponse {
    fn from(v: Valet) -> Self {
        Self {
            id: v.id,
            userid: v.user_id,
            siteid: v.site_id,
            name: v.name,
            phone: v.phone,
            parkingscompleted: v.parkings_completed,
            retrievalscompleted: v.retrievals_completed,
            isactive: v.is_active,
            createdat: v.created_at,
            updatedat: v.updated_at,
        }
    }
}
