//! Startup seeding.
//!
//! Ensures exactly one administrator account exists. Idempotent: run on
//! every boot, it creates the admin only when no admin-role profile is
//! present and never overwrites an existing one.

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::crypto::password::hash_password;
use crate::db::repository::profile;
use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::Profile;

pub fn seed_admin(
    conn: &Connection,
    email: &str,
    password: &str,
) -> Result<bool, DatabaseError> {
    if profile::any_admin_exists(conn)? {
        return Ok(false);
    }

    let password_hash = hash_password(password)
        .map_err(|e| DatabaseError::Corrupted(format!("admin password hash: {e}")))?;

    let now = Utc::now();
    let admin = Profile {
        id: Uuid::new_v4(),
        email: email.trim().to_lowercase(),
        password_hash,
        full_name: "Administrator".to_string(),
        role: Role::Admin,
        phone: None,
        national_id: None,
        insurance_id: None,
        created_at: now,
        updated_at: now,
    };
    profile::insert_profile(conn, &admin)?;
    tracing::info!(email = %admin.email, "seeded administrator account");
    Ok(true)
}
