//! Aggregated dashboard statistics.

use serde::{Deserialize, Serialize};

/// Per-site dashboard stats for the admin view. Field casing is part of the
/// frontend contract and intentionally mixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteStats {
    /// Sessions not yet retrieved.
    #[serde(rename = "activeCars")]
    pub active_cars: i64,
    /// Sessions currently in-progress (retrieval underway).
    pub retrieving: i64,
    /// Sessions that entered today (UTC).
    #[serde(rename = "totalToday")]
    pub total_today: i64,
    /// Sum of amounts for sessions that are paid and entered today.
    pub revenue: f64,
    #[serde(rename = "totalTickets")]
    pub total_tickets: i64,
    /// All-time sum of amounts over paid sessions.
    #[serde(rename = "totalCollection")]
    pub total_collection: f64,
    #[serde(rename = "activeParking")]
    pub active_parking: i64,
    /// Placeholder heuristic: ceil(active_cars / 2).
    pub activevalets: i64,
    pub totalsessions: i64,
}

/// Per-driver stats for the driver dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStats {
    pub total_parkings: i64,
    pub total_retrievals: i64,
    pub currently_parked: i64,
    pub total_earnings: f64,
}
