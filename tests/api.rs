//! Black-box contract tests: the full router over an in-memory database,
//! exercised with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;

use valetd::config::Config;
use valetd::AppState;

async fn test_app() -> Router {
    let pool = valetd::db::init_in_memory().await.unwrap();
    // Default config has environment = development, so test routes mount
    let config = Config::default();
    valetd::api::create_router(Arc::new(AppState::new(config, pool)))
}

async fn send(app: &Router, method: Method, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, path: &str) -> (StatusCode, Value) {
    send(app, Method::GET, path, None).await
}

async fn reset(app: &Router) -> Value {
    let (status, body) = send(app, Method::POST, "/api/admin/reset-database", None).await;
    assert_eq!(status, StatusCode::OK, "reset failed: {}", body);
    body
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or("")
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "valetd is running");
}

#[tokio::test]
async fn test_unknown_api_route_returns_envelope() {
    let app = test_app().await;
    let (status, body) = get(&app, "/api/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "not_found");
    assert_eq!(body["error"]["message"], "Endpoint not found");
}

#[tokio::test]
async fn test_reset_seeds_fixture_counts_and_converges() {
    let app = test_app().await;

    for run in 0..2 {
        let body = reset(&app).await;
        assert!(body["testUsers"]["user1Id"].as_str().is_some());
        assert!(body["testUsers"]["driver3Id"].as_str().is_some());

        let (_, sites) = get(&app, "/api/admin/sites").await;
        assert_eq!(sites.as_array().unwrap().len(), 4, "run {}", run);

        let (_, approvals) = get(&app, "/api/admin/approvals").await;
        assert_eq!(approvals.as_array().unwrap().len(), 4, "run {}", run);

        let (_, pending) = get(&app, "/api/admin/approvals/pending").await;
        assert_eq!(pending.as_array().unwrap().len(), 2, "run {}", run);

        let (_, sessions) = get(&app, "/api/manager/sessions").await;
        assert_eq!(sessions.as_array().unwrap().len(), 5, "run {}", run);

        let mut assignments = 0;
        for driver in ["driver1Id", "driver2Id", "driver3Id"] {
            let driver_id = body["testUsers"][driver].as_str().unwrap();
            let (_, list) = get(&app, &format!("/api/assignments/driver/{}", driver_id)).await;
            assignments += list.as_array().unwrap().len();
        }
        assert_eq!(assignments, 6, "run {}", run);
    }
}

#[tokio::test]
async fn test_seeded_tickets_are_unique_and_nonempty() {
    let app = test_app().await;
    reset(&app).await;

    let (_, sessions) = get(&app, "/api/manager/sessions").await;
    let sessions = sessions.as_array().unwrap().clone();
    let tickets: Vec<&str> = sessions
        .iter()
        .map(|s| s["ticketid"].as_str().unwrap())
        .collect();

    assert!(tickets.iter().all(|t| !t.is_empty()));
    let unique: HashSet<_> = tickets.iter().collect();
    assert_eq!(unique.len(), tickets.len());
}

#[tokio::test]
async fn test_create_session_round_trip() {
    let app = test_app().await;
    let seeded = reset(&app).await;
    let user_id = seeded["testUsers"]["user1Id"].as_str().unwrap();

    let (_, vehicles) = get(&app, &format!("/api/test/user/{}/vehicles", user_id)).await;
    let vehicle_id = vehicles[0]["id"].as_str().unwrap();
    let (_, sites) = get(&app, "/api/test/sites").await;
    let site_id = sites[0]["id"].as_str().unwrap();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/parking/sessions",
        Some(json!({
            "userId": user_id,
            "vehicleId": vehicle_id,
            "siteId": site_id,
            "parkingLevel": "Level 2 - F15",
            "amount": 55.0,
            "paymentMethod": "card",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", created);

    let ticket = created["ticketid"].as_str().unwrap();
    assert!(ticket.starts_with("TKT-"));
    assert_eq!(created["status"], "parked");
    assert_eq!(created["ispaid"], true, "card payments settle at park time");
    assert_eq!(created["vehicle"]["id"], vehicle_id);
    assert_eq!(created["site"]["id"], site_id);
    assert!(created["valet"].is_null());

    let (status, fetched) = get(&app, &format!("/api/parking/sessions/ticket/{}", ticket)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["ticketid"], ticket);
    assert_eq!(fetched["amount"], 55.0);
    assert_eq!(fetched["status"], "parked");
}

#[tokio::test]
async fn test_create_session_rejects_invalid_input() {
    let app = test_app().await;
    reset(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/parking/sessions",
        Some(json!({
            "userId": "not-a-uuid",
            "vehicleId": "also-not-a-uuid",
            "siteId": "nope",
            "amount": -5.0,
            "paymentMethod": "bitcoin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
    let details = body["error"]["details"].as_object().unwrap();
    assert!(details.contains_key("userId"));
    assert!(details.contains_key("amount"));
    assert!(details.contains_key("paymentMethod"));
}

#[tokio::test]
async fn test_session_update_guards_status_and_derives_duration() {
    let app = test_app().await;
    let seeded = reset(&app).await;
    let user_id = seeded["testUsers"]["user2Id"].as_str().unwrap();

    let (_, vehicles) = get(&app, &format!("/api/test/user/{}/vehicles", user_id)).await;
    let (_, sites) = get(&app, "/api/test/sites").await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/parking/sessions",
        Some(json!({
            "userId": user_id,
            "vehicleId": vehicles[0]["id"],
            "siteId": sites[1]["id"],
            "amount": 40.0,
            "paymentMethod": "cash",
        })),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    // parked -> in-progress
    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/parking/sessions/{}", id),
        Some(json!({ "status": "in-progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "in-progress");

    // in-progress -> parked is rejected
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/parking/sessions/{}", id),
        Some(json!({ "status": "parked" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "invalid_transition");

    // in-progress -> retrieved with exit time derives the duration
    let exit = Utc::now().to_rfc3339();
    let (status, done) = send(
        &app,
        Method::PATCH,
        &format!("/api/parking/sessions/{}", id),
        Some(json!({ "status": "retrieved", "exitTime": exit })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "retrieved");
    assert!(done["durationminutes"].is_i64());

    // retrieved is terminal
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/parking/sessions/{}", id),
        Some(json!({ "status": "in-progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "invalid_transition");
}

#[tokio::test]
async fn test_assignment_lifecycle_with_guard() {
    let app = test_app().await;
    let seeded = reset(&app).await;
    let driver_id = seeded["testUsers"]["driver1Id"].as_str().unwrap();

    let (status, assignments) = get(&app, &format!("/api/assignments/driver/{}", driver_id)).await;
    assert_eq!(status, StatusCode::OK);
    let assignments = assignments.as_array().unwrap().clone();
    assert!(!assignments.is_empty());
    let assignment = &assignments[0];
    assert_eq!(assignment["status"], "pending");
    assert!(assignment["parkingSession"]["ticketId"].as_str().is_some());
    let id = assignment["id"].as_str().unwrap();

    // completing before accepting is rejected
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/assignments/{}/complete", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "invalid_transition");

    let (status, accepted) = send(
        &app,
        Method::PATCH,
        &format!("/api/assignments/{}/accept", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accepted["status"], "accepted");

    // accepting twice is rejected
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/assignments/{}/accept", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, completed) = send(
        &app,
        Method::PATCH,
        &format!("/api/assignments/{}/complete", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");
    assert!(completed["completedAt"].as_str().is_some());
}

#[tokio::test]
async fn test_create_assignment_requires_driver_role() {
    let app = test_app().await;
    let seeded = reset(&app).await;
    let user_id = seeded["testUsers"]["user1Id"].as_str().unwrap();
    let driver_id = seeded["testUsers"]["driver2Id"].as_str().unwrap();

    let (_, sessions) = get(&app, &format!("/api/parking/sessions/user/{}", user_id)).await;
    let session_id = sessions[0]["id"].as_str().unwrap();

    // a customer id in the driver slot is rejected
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/assignments",
        Some(json!({
            "driverId": user_id,
            "sessionId": session_id,
            "type": "retrieve",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "bad_request");

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/assignments",
        Some(json!({
            "driverId": driver_id,
            "sessionId": session_id,
            "type": "retrieve",
            "customerName": "John Doe",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["sessionId"], session_id);
    assert_eq!(created["parkingSession"]["id"], session_id);
}

#[tokio::test]
async fn test_driver_stats_counts_completions() {
    let app = test_app().await;
    let seeded = reset(&app).await;
    let driver_id = seeded["testUsers"]["driver1Id"].as_str().unwrap();

    let (_, assignments) = get(&app, &format!("/api/assignments/driver/{}", driver_id)).await;
    let assignments = assignments.as_array().unwrap().clone();
    // complete every park assignment for this driver
    let mut completed_parks = 0;
    for assignment in &assignments {
        if assignment["type"] == "park" {
            let id = assignment["id"].as_str().unwrap();
            send(&app, Method::PATCH, &format!("/api/assignments/{}/accept", id), None).await;
            send(&app, Method::PATCH, &format!("/api/assignments/{}/complete", id), None).await;
            completed_parks += 1;
        }
    }
    assert!(completed_parks > 0);

    let (status, stats) = get(&app, &format!("/api/assignments/stats/{}", driver_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalParkings"], completed_parks);
    assert_eq!(stats["totalRetrievals"], 0);
    assert_eq!(
        stats["totalEarnings"].as_f64().unwrap(),
        completed_parks as f64 * 200.0
    );
}

#[tokio::test]
async fn test_site_stats_match_session_data() {
    let app = test_app().await;
    reset(&app).await;

    let (_, sites) = get(&app, "/api/admin/sites").await;
    let today = Utc::now().date_naive();

    for site in sites.as_array().unwrap() {
        let site_id = site["id"].as_str().unwrap();
        let (_, sessions) =
            get(&app, &format!("/api/manager/sessions?siteId={}", site_id)).await;
        let sessions = sessions.as_array().unwrap().clone();

        let expected_active = sessions
            .iter()
            .filter(|s| s["status"] != "retrieved")
            .count() as i64;
        let expected_revenue: f64 = sessions
            .iter()
            .filter(|s| {
                s["ispaid"] == true
                    && DateTime::parse_from_rfc3339(s["entrytime"].as_str().unwrap())
                        .map(|t| t.with_timezone(&Utc).date_naive() == today)
                        .unwrap_or(false)
            })
            .map(|s| s["amount"].as_f64().unwrap())
            .sum();

        let (status, stats) = get(&app, &format!("/api/admin/stats/{}", site_id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["activeCars"].as_i64().unwrap(), expected_active);
        assert_eq!(stats["activeParking"].as_i64().unwrap(), expected_active);
        assert!((stats["revenue"].as_f64().unwrap() - expected_revenue).abs() < 1e-9);
        assert_eq!(
            stats["totalsessions"].as_i64().unwrap(),
            sessions.len() as i64
        );
        assert_eq!(
            stats["activevalets"].as_i64().unwrap(),
            (expected_active + 1) / 2
        );
    }
}

#[tokio::test]
async fn test_site_stats_unknown_site() {
    let app = test_app().await;
    reset(&app).await;
    let (status, body) = get(
        &app,
        "/api/admin/stats/00000000-0000-4000-8000-000000000000",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "not_found");
}

#[tokio::test]
async fn test_manager_sessions_status_and_search_filters() {
    let app = test_app().await;
    reset(&app).await;

    let (status, parked) = get(&app, "/api/manager/sessions?status=parked").await;
    assert_eq!(status, StatusCode::OK);
    let parked = parked.as_array().unwrap().clone();
    assert!(!parked.is_empty());
    assert!(parked.iter().all(|s| s["status"] == "parked"));

    // case-insensitive plate search narrows further
    let (_, matched) = get(&app, "/api/manager/sessions?status=parked&search=mh01").await;
    let matched = matched.as_array().unwrap().clone();
    assert!(!matched.is_empty());
    for session in &matched {
        assert_eq!(session["status"], "parked");
        let plate = session["vehicle"]["vehiclenumber"].as_str().unwrap();
        assert!(plate.to_lowercase().contains("mh01"));
    }

    let (_, none) = get(&app, "/api/manager/sessions?search=zzz-no-match").await;
    assert!(none.as_array().unwrap().is_empty());

    let (status, body) = get(&app, "/api/manager/sessions?status=towed").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
}

#[tokio::test]
async fn test_reassign_valet_checks_site() {
    let app = test_app().await;
    reset(&app).await;

    let (_, sessions) = get(&app, "/api/manager/sessions").await;
    let session = sessions
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["status"] == "parked")
        .cloned()
        .unwrap();
    let session_id = session["id"].as_str().unwrap();
    let site_id = session["siteid"].as_str().unwrap();

    let (_, valets) = get(&app, &format!("/api/manager/valets/{}", site_id)).await;
    let valets = valets.as_array().unwrap().clone();
    assert_eq!(valets.len(), 2, "two valets seeded per site");
    let valet_id = valets[0]["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/manager/sessions/{}/reassign-valet", session_id),
        Some(json!({ "valetId": valet_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["valetid"], valet_id);
    assert_eq!(updated["valet"]["id"], valet_id);

    // a valet from a different site is rejected
    let (_, sites) = get(&app, "/api/admin/sites").await;
    let other_site = sites
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["id"] != site_id)
        .cloned()
        .unwrap();
    let (_, other_valets) =
        get(&app, &format!("/api/manager/valets/{}", other_site["id"].as_str().unwrap())).await;
    let other_valet_id = other_valets[0]["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/manager/sessions/{}/reassign-valet", session_id),
        Some(json!({ "valetId": other_valet_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "bad_request");
}

#[tokio::test]
async fn test_approval_review_flow() {
    let app = test_app().await;
    reset(&app).await;

    // look up the seeded admin account
    let (_, admin) = get(&app, "/api/test/test-admin").await;
    let admin_id = admin["id"].as_str().unwrap();

    let (_, pending) = get(&app, "/api/admin/approvals/pending").await;
    let pending = pending.as_array().unwrap().clone();
    assert_eq!(pending.len(), 2);

    let first = pending[0]["id"].as_str().unwrap();
    let second = pending[1]["id"].as_str().unwrap();

    let (status, approved) = send(
        &app,
        Method::PATCH,
        &format!("/api/admin/approvals/{}/approve", first),
        Some(json!({ "adminId": admin_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["reviewedby"], admin_id);
    assert!(approved["approvedat"].as_str().is_some());

    let (status, rejected) = send(
        &app,
        Method::PATCH,
        &format!("/api/admin/approvals/{}/reject", second),
        Some(json!({ "adminId": admin_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["status"], "rejected");
    assert!(rejected["approvedat"].is_null());

    // outcomes are terminal
    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/admin/approvals/{}/reject", first),
        Some(json!({ "adminId": admin_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "invalid_transition");

    let (_, pending_after) = get(&app, "/api/admin/approvals/pending").await;
    assert!(pending_after.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_seeded_scenario_user_sessions() {
    let app = test_app().await;
    let seeded = reset(&app).await;

    let (status, user) = get(&app, "/api/test/test-user").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "user1@test.com");
    assert_eq!(user["id"], seeded["testUsers"]["user1Id"]);
    assert!(user.get("password_hash").is_none());

    let user_id = user["id"].as_str().unwrap();
    let (status, sessions) = get(&app, &format!("/api/parking/sessions/user/{}", user_id)).await;
    assert_eq!(status, StatusCode::OK);
    let sessions = sessions.as_array().unwrap().clone();
    assert_eq!(sessions.len(), 2);

    // newest first
    let first = sessions[0]["entrytime"].as_str().unwrap();
    let second = sessions[1]["entrytime"].as_str().unwrap();
    assert!(first >= second);
}

#[tokio::test]
async fn test_invalid_uuid_is_rejected_before_query() {
    let app = test_app().await;
    let (status, body) = get(&app, "/api/parking/sessions/user/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_error");
}

#[tokio::test]
async fn test_test_routes_absent_in_production() {
    let pool = valetd::db::init_in_memory().await.unwrap();
    let config: Config = toml::from_str(
        r#"
        [environment]
        name = "production"
        "#,
    )
    .unwrap();
    let app = valetd::api::create_router(Arc::new(AppState::new(config, pool)));

    let (status, body) = get(&app, "/api/test/test-user").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "not_found");
}
