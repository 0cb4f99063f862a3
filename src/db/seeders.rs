//! Database seeders for the demo fixture dataset.
//!
//! `reset_and_seed` wipes every table and re-inserts the fixtures inside one
//! transaction, so a partial failure rolls back instead of leaving a mixed
//! state. Repeated runs converge to the same row counts.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Ids of the seeded test accounts, returned by the reset endpoint so demo
/// clients can log straight into a role view.
#[derive(Debug, Clone, Serialize)]
pub struct SeededUsers {
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

/// Hash a password using Argon2.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Delete all rows (children first) and insert the fixture dataset.
pub async fn reset_and_seed(pool: &SqlitePool) -> Result<SeededUsers> {
    info!("Resetting database to fixture state");

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    for table in [
        "assignments",
        "parking_sessions",
        "driver_approvals",
        "valets",
        "vehicles",
        "sites",
        "users",
    ] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to clear table {}", table))?;
    }

    let now = Utc::now();
    let ts = now.to_rfc3339();
    // All demo accounts share one throwaway password
    let password_hash = hash_password("pwd")?;

    // ---- users ----------------------------------------------------------
    let users: Vec<(&str, &str, &str, &str)> = vec![
        ("user1@test.com", "John Doe", "+91-9000000001", "user"),
        ("user2@test.com", "Jane Smith", "+91-9000000002", "user"),
        ("user3@test.com", "Bob Johnson", "+91-9000000003", "user"),
        ("user4@test.com", "Alice Brown", "+91-9000000004", "user"),
        ("driver1@test.com", "Driver One", "+91-9000000011", "driver"),
        ("driver2@test.com", "Driver Two", "+91-9000000012", "driver"),
        ("driver3@test.com", "Driver Three", "+91-9000000013", "driver"),
        ("admin@test.com", "Admin User", "+91-9000000099", "admin"),
    ];
    let mut user_ids = Vec::new();
    for (email, name, phone, role) in &users {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, phone, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind(&password_hash)
        .bind(name)
        .bind(phone)
        .bind(role)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await?;
        user_ids.push(id);
    }
    let driver_ids = &user_ids[4..7];

    // ---- sites ----------------------------------------------------------
    let sites: Vec<(&str, &str, &str, &str, i64)> = vec![
        ("Inorbit Mall", "Kukatpally", "Hyderabad", "Telangana", 100),
        ("Phoenix Courtyard", "Necklace Road", "Hyderabad", "Telangana", 85),
        ("Prestige Tech Park", "HITEC City", "Hyderabad", "Telangana", 120),
        ("Forum Bengaluru", "Koramangala", "Bangalore", "Karnataka", 95),
    ];
    let mut site_ids = Vec::new();
    for (name, location, city, state, spots) in &sites {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO sites (id, name, location, city, state, total_spots, available_spots, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(location)
        .bind(city)
        .bind(state)
        .bind(spots)
        .bind(spots)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await?;
        site_ids.push(id);
    }

    // ---- vehicles -------------------------------------------------------
    // (owner index, plate, model, type)
    let vehicles: Vec<(usize, &str, &str, &str)> = vec![
        (0, "MH01AB1234", "Toyota Camry", "Sedan"),
        (1, "MH02CD5678", "Honda City", "Sedan"),
        (2, "MH03EF9012", "Maruti Swift", "Hatchback"),
        (0, "MH04GH3456", "Hyundai Creta", "SUV"),
        (3, "MH05IJ7890", "Ford EcoSport", "SUV"),
        (1, "MH06KL2345", "Tata Nexon", "SUV"),
    ];
    let mut vehicle_ids = Vec::new();
    for (owner, plate, model, kind) in &vehicles {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO vehicles (id, user_id, vehicle_number, vehicle_model, vehicle_type, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&user_ids[*owner])
        .bind(plate)
        .bind(model)
        .bind(kind)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await?;
        vehicle_ids.push(id);
    }

    // ---- valets (two per site) ------------------------------------------
    let valets: Vec<(usize, &str, &str)> = vec![
        (0, "John Smith", "+91-9100000001"),
        (0, "Maria Garcia", "+91-9100000002"),
        (1, "David Chen", "+91-9100000003"),
        (1, "Sarah Johnson", "+91-9100000004"),
        (2, "Rajesh Kumar", "+91-9100000005"),
        (2, "Priya Patel", "+91-9100000006"),
        (3, "James Wilson", "+91-9100000007"),
        (3, "Amit Sharma", "+91-9100000008"),
    ];
    let mut valet_ids = Vec::new();
    for (i, (site, name, phone)) in valets.iter().enumerate() {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO valets (id, user_id, site_id, name, phone, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&driver_ids[i % driver_ids.len()])
        .bind(&site_ids[*site])
        .bind(name)
        .bind(phone)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await?;
        valet_ids.push(id);
    }

    // ---- parking sessions -----------------------------------------------
    // (user, vehicle, site, valet slot, status, level, amount, method, hours ago)
    struct SessionFixture {
        user: usize,
        vehicle: usize,
        site: usize,
        valet: Option<usize>,
        status: &'static str,
        level: &'static str,
        amount: f64,
        method: &'static str,
        hours_ago: i64,
    }
    let sessions = [
        SessionFixture { user: 0, vehicle: 0, site: 0, valet: Some(0), status: "parked", level: "Level 1 - A12", amount: 45.0, method: "card", hours_ago: 4 },
        SessionFixture { user: 1, vehicle: 1, site: 1, valet: Some(2), status: "in-progress", level: "Level 2 - B07", amount: 35.0, method: "upi", hours_ago: 3 },
        SessionFixture { user: 2, vehicle: 2, site: 0, valet: Some(1), status: "retrieved", level: "Level 1 - C03", amount: 85.0, method: "card", hours_ago: 2 },
        SessionFixture { user: 0, vehicle: 3, site: 2, valet: None, status: "parked", level: "Level 3 - D21", amount: 65.0, method: "netbanking", hours_ago: 1 },
        SessionFixture { user: 3, vehicle: 4, site: 3, valet: None, status: "in-progress", level: "Level 1 - E09", amount: 25.0, method: "cash", hours_ago: 0 },
    ];
    let millis = now.timestamp_millis();
    let mut session_ids = Vec::new();
    for (i, s) in sessions.iter().enumerate() {
        let id = Uuid::new_v4().to_string();
        let ticket = format!("TKT-{}-00{}", millis, i + 1);
        let entry = (now - Duration::hours(s.hours_ago)).to_rfc3339();
        let is_paid = matches!(s.method, "card" | "upi");
        let (exit_time, duration) = if s.status == "retrieved" {
            ((now - Duration::minutes(30)).to_rfc3339().into(), Some(90i64))
        } else {
            (None::<String>, None)
        };
        sqlx::query(
            "INSERT INTO parking_sessions
                (id, user_id, vehicle_id, site_id, valet_id, parking_level, entry_time,
                 exit_time, duration_minutes, amount, payment_method, ticket_id, status,
                 is_paid, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&user_ids[s.user])
        .bind(&vehicle_ids[s.vehicle])
        .bind(&site_ids[s.site])
        .bind(s.valet.map(|v| valet_ids[v].clone()))
        .bind(s.level)
        .bind(&entry)
        .bind(exit_time)
        .bind(duration)
        .bind(s.amount)
        .bind(s.method)
        .bind(&ticket)
        .bind(s.status)
        .bind(is_paid)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await?;
        session_ids.push(id);
    }

    // ---- driver approvals -----------------------------------------------
    // (name, email, phone, license, experience, status, days ago)
    let approvals: Vec<(&str, &str, &str, &str, &str, &str, i64)> = vec![
        ("Alex Rodriguez", "alex.r@test.com", "+91-9200000001", "DL-2024-001", "5 years", "approved", 30),
        ("Jessica Williams", "jessica.w@test.com", "+91-9200000002", "DL-2024-002", "3 years", "approved", 20),
        ("Marcus Johnson", "marcus.j@test.com", "+91-9200000003", "DL-2024-003", "7 years", "pending", 5),
        ("Sarah Davis", "sarah.d@test.com", "+91-9200000004", "DL-2024-004", "4 years", "pending", 2),
    ];
    let admin_id = &user_ids[7];
    for (name, email, phone, license, experience, status, days_ago) in &approvals {
        let id = Uuid::new_v4().to_string();
        let submitted = (now - Duration::days(*days_ago)).to_rfc3339();
        let (approved_at, reviewed_by) = if *status == "approved" {
            (Some((now - Duration::days(days_ago - 1)).to_rfc3339()), Some(admin_id.clone()))
        } else {
            (None, None)
        };
        sqlx::query(
            "INSERT INTO driver_approvals
                (id, name, email, phone, license_number, experience, status,
                 submitted_at, approved_at, reviewed_by, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(license)
        .bind(experience)
        .bind(status)
        .bind(&submitted)
        .bind(approved_at)
        .bind(reviewed_by)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await?;
    }

    // ---- assignments (all pending) --------------------------------------
    // (driver, session, type, customer name)
    let assignments: Vec<(usize, usize, &str, &str)> = vec![
        (0, 0, "park", "James Wilson"),
        (1, 1, "retrieve", "Emily Davis"),
        (2, 2, "park", "Michael Brown"),
        (0, 3, "retrieve", "Sarah Connor"),
        (1, 4, "park", "Robert Taylor"),
        (2, 1, "retrieve", "Lisa Anderson"),
    ];
    for (i, (driver, session, kind, customer)) in assignments.iter().enumerate() {
        let id = Uuid::new_v4().to_string();
        let assigned = (now - Duration::minutes(10 * (assignments.len() - i) as i64)).to_rfc3339();
        sqlx::query(
            "INSERT INTO assignments
                (id, driver_id, session_id, type, status, customer_name,
                 assigned_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, 'pending', ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&driver_ids[*driver])
        .bind(&session_ids[*session])
        .bind(kind)
        .bind(customer)
        .bind(&assigned)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await.context("Failed to commit seed transaction")?;

    info!("Fixture dataset seeded");

    Ok(SeededUsers {
        user1_id: user_ids[0].clone(),
        user2_id: user_ids[1].clone(),
        user3_id: user_ids[2].clone(),
        user4_id: user_ids[3].clone(),
        driver1_id: user_ids[4].clone(),
        driver2_id: user_ids[5].clone(),
        driver3_id: user_ids[6].clone(),
    })
}
