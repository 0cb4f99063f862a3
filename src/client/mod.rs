//! Typed HTTP client for the valetd REST API.
//!
//! One method per backend route; no retry, no caching. Non-2xx responses are
//! decoded from the error envelope into the returned error message.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::api::ErrorResponse;
use crate::db::{
    ApprovalResponse, AssignmentResponse, DriverStats, SessionResponse, SiteResponse, SiteStats,
    UserResponse, ValetResponse, VehicleResponse,
};

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetResponse {
    pub message: String,
    #[serde(rename = "testUsers")]
    pub test_users: SeededUsersResponse,
}

/// Client-side mirror of the seeded test account ids.
#[derive(Debug, Deserialize)]
pub struct SeededUsersResponse {
    #[serde(rename = "user1Id")]
    pub user1_id: String,
    #[serde(rename = "user2Id")]
    pub user2_id: String,
    #[serde(rename = "user3Id")]
    pub user3_id: String,
    #[serde(rename = "user4Id")]
    pub user4_id: String,
    #[serde(rename = "driver1Id")]
    pub driver1_id: String,
    #[serde(rename = "driver2Id")]
    pub driver2_id: String,
    #[serde(rename = "driver3Id")]
    pub driver3_id: String,
}

pub struct ValetClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl ValetClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(ref token) = self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.context("Failed to parse response");
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        anyhow::bail!("Server returned {}: {}", status, message)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .request(reqwest::Method::GET, path)
            .send()
            .await
            .with_context(|| format!("Request failed: GET {}", path))?;
        Self::decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request failed: POST {}", path))?;
        Self::decode(response).await
    }

    async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .request(reqwest::Method::PATCH, path)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request failed: PATCH {}", path))?;
        Self::decode(response).await
    }

    // ---- health ---------------------------------------------------------

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/api/health").await
    }

    // ---- admin ----------------------------------------------------------

    pub async fn site_stats(&self, site_id: &str) -> Result<SiteStats> {
        self.get(&format!("/api/admin/stats/{}", site_id)).await
    }

    pub async fn sites(&self) -> Result<Vec<SiteResponse>> {
        self.get("/api/admin/sites").await
    }

    pub async fn approvals(&self) -> Result<Vec<ApprovalResponse>> {
        self.get("/api/admin/approvals").await
    }

    pub async fn pending_approvals(&self) -> Result<Vec<ApprovalResponse>> {
        self.get("/api/admin/approvals/pending").await
    }

    pub async fn approve_approval(&self, id: &str, admin_id: &str) -> Result<ApprovalResponse> {
        self.patch(
            &format!("/api/admin/approvals/{}/approve", id),
            &json!({ "adminId": admin_id }),
        )
        .await
    }

    pub async fn reject_approval(&self, id: &str, admin_id: &str) -> Result<ApprovalResponse> {
        self.patch(
            &format!("/api/admin/approvals/{}/reject", id),
            &json!({ "adminId": admin_id }),
        )
        .await
    }

    pub async fn reset_database(&self) -> Result<ResetResponse> {
        self.post("/api/admin/reset-database", &json!({})).await
    }

    // ---- assignments ----------------------------------------------------

    pub async fn driver_assignments(&self, driver_id: &str) -> Result<Vec<AssignmentResponse>> {
        self.get(&format!("/api/assignments/driver/{}", driver_id))
            .await
    }

    pub async fn create_assignment(
        &self,
        driver_id: &str,
        session_id: &str,
        kind: &str,
        customer_name: Option<&str>,
    ) -> Result<AssignmentResponse> {
        self.post(
            "/api/assignments",
            &json!({
                "driverId": driver_id,
                "sessionId": session_id,
                "type": kind,
                "customerName": customer_name,
            }),
        )
        .await
    }

    pub async fn accept_assignment(&self, id: &str) -> Result<AssignmentResponse> {
        self.patch(&format!("/api/assignments/{}/accept", id), &json!({}))
            .await
    }

    pub async fn complete_assignment(&self, id: &str) -> Result<AssignmentResponse> {
        self.patch(&format!("/api/assignments/{}/complete", id), &json!({}))
            .await
    }

    pub async fn driver_stats(&self, driver_id: &str) -> Result<DriverStats> {
        self.get(&format!("/api/assignments/stats/{}", driver_id))
            .await
    }

    // ---- manager --------------------------------------------------------

    pub async fn manager_sessions(
        &self,
        status: Option<&str>,
        site_id: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<SessionResponse>> {
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(status) = status {
            query.push(("status", status));
        }
        if let Some(site_id) = site_id {
            query.push(("siteId", site_id));
        }
        if let Some(search) = search {
            query.push(("search", search));
        }

        let response = self
            .request(reqwest::Method::GET, "/api/manager/sessions")
            .query(&query)
            .send()
            .await
            .context("Request failed: GET /api/manager/sessions")?;
        Self::decode(response).await
    }

    pub async fn reassign_valet(&self, session_id: &str, valet_id: &str) -> Result<SessionResponse> {
        self.patch(
            &format!("/api/manager/sessions/{}/reassign-valet", session_id),
            &json!({ "valetId": valet_id }),
        )
        .await
    }

    pub async fn site_valets(&self, site_id: &str) -> Result<Vec<ValetResponse>> {
        self.get(&format!("/api/manager/valets/{}", site_id)).await
    }

    // ---- parking --------------------------------------------------------

    pub async fn user_sessions(&self, user_id: &str) -> Result<Vec<SessionResponse>> {
        self.get(&format!("/api/parking/sessions/user/{}", user_id))
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_session(
        &self,
        user_id: &str,
        vehicle_id: &str,
        site_id: &str,
        valet_id: Option<&str>,
        parking_level: Option<&str>,
        amount: f64,
        payment_method: Option<&str>,
    ) -> Result<SessionResponse> {
        self.post(
            "/api/parking/sessions",
            &json!({
                "userId": user_id,
                "vehicleId": vehicle_id,
                "siteId": site_id,
                "valetId": valet_id,
                "parkingLevel": parking_level,
                "amount": amount,
                "paymentMethod": payment_method,
            }),
        )
        .await
    }

    pub async fn update_session(
        &self,
        id: &str,
        status: Option<&str>,
        exit_time: Option<&str>,
    ) -> Result<SessionResponse> {
        self.patch(
            &format!("/api/parking/sessions/{}", id),
            &json!({ "status": status, "exitTime": exit_time }),
        )
        .await
    }

    pub async fn session_by_ticket(&self, ticket_id: &str) -> Result<SessionResponse> {
        self.get(&format!("/api/parking/sessions/ticket/{}", ticket_id))
            .await
    }

    // ---- development ----------------------------------------------------

    pub async fn test_user(&self) -> Result<UserResponse> {
        self.get("/api/test/test-user").await
    }

    pub async fn test_driver(&self) -> Result<UserResponse> {
        self.get("/api/test/test-driver").await
    }

    pub async fn test_admin(&self) -> Result<UserResponse> {
        self.get("/api/test/test-admin").await
    }

    pub async fn user_vehicles(&self, user_id: &str) -> Result<Vec<VehicleResponse>> {
        self.get(&format!("/api/test/user/{}/vehicles", user_id))
            .await
    }

    pub async fn test_sites(&self) -> Result<Vec<SiteResponse>> {
        self.get("/api/test/sites").await
    }
}
