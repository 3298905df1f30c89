use rusqlite::{params, Connection, OptionalExtension, Row};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{enum_col, insurance, opt_id, uuid_col, uuid_col_opt};
use crate::db::DatabaseError;
use crate::models::{Profile, ProfileSummary, ProfileView};

const COLS: &str = "id, email, password_hash, full_name, role, phone, national_id, insurance_id, \
                    created_at, updated_at";

fn read_profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: uuid_col(row, 0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        role: enum_col(row, 4)?,
        phone: row.get(5)?,
        national_id: row.get(6)?,
        insurance_id: uuid_col_opt(row, 7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub fn insert_profile(conn: &Connection, profile: &Profile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO profiles (id, email, password_hash, full_name, role, phone, national_id,
         insurance_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            profile.id.to_string(),
            profile.email,
            profile.password_hash,
            profile.full_name,
            profile.role.as_str(),
            profile.phone,
            profile.national_id,
            opt_id(profile.insurance_id),
            profile.created_at,
            profile.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_profile(conn: &Connection, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM profiles WHERE id = ?1"),
        params![id.to_string()],
        read_profile,
    )
    .optional()
    .map_err(Into::into)
}

/// Case-insensitive lookup; the caller passes a trimmed email.
pub fn get_profile_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<Profile>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM profiles WHERE email = ?1 COLLATE NOCASE"),
        params![email],
        read_profile,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_profiles(conn: &Connection) -> Result<Vec<Profile>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {COLS} FROM profiles ORDER BY created_at DESC"))?;
    let rows = stmt.query_map([], read_profile)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn any_admin_exists(conn: &Connection) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM profiles WHERE role = 'admin'",
        [],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn update_profile(
    conn: &Connection,
    profile: &Profile,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE profiles SET full_name = ?2, phone = ?3, national_id = ?4, insurance_id = ?5,
         updated_at = ?6 WHERE id = ?1",
        params![
            profile.id.to_string(),
            profile.full_name,
            profile.phone,
            profile.national_id,
            opt_id(profile.insurance_id),
            now,
        ],
    )?;
    Ok(())
}

pub fn delete_profile(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM profiles WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(affected > 0)
}

pub fn get_profile_summary(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<ProfileSummary>, DatabaseError> {
    Ok(get_profile(conn, id)?.map(|p| ProfileSummary::from(&p)))
}

/// Profile with its insurance expanded.
pub fn get_profile_view(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<ProfileView>, DatabaseError> {
    let Some(profile) = get_profile(conn, id)? else {
        return Ok(None);
    };
    let insurance = match profile.insurance_id {
        Some(ins_id) => insurance::get_insurance(conn, ins_id)?,
        None => None,
    };
    Ok(Some(ProfileView { profile, insurance }))
}
