use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{opt_id, uuid_col, uuid_col_opt};
use crate::db::DatabaseError;
use crate::models::{Hospital, HospitalSummary};

const COLS: &str = "id, name, location, phone, email, description, consultation_fee, \
                    lab_user_id, created_at, updated_at";

fn read_hospital(row: &Row<'_>) -> rusqlite::Result<Hospital> {
    Ok(Hospital {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        description: row.get(5)?,
        consultation_fee: row.get(6)?,
        lab_user_id: uuid_col_opt(row, 7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub fn insert_hospital(conn: &Connection, hospital: &Hospital) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO hospitals (id, name, location, phone, email, description, consultation_fee,
         lab_user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            hospital.id.to_string(),
            hospital.name,
            hospital.location,
            hospital.phone,
            hospital.email,
            hospital.description,
            hospital.consultation_fee,
            opt_id(hospital.lab_user_id),
            hospital.created_at,
            hospital.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_hospital(conn: &Connection, id: Uuid) -> Result<Option<Hospital>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM hospitals WHERE id = ?1"),
        params![id.to_string()],
        read_hospital,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_hospitals(conn: &Connection) -> Result<Vec<Hospital>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLS} FROM hospitals ORDER BY name"))?;
    let rows = stmt.query_map([], read_hospital)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Hospitals that registered this account as their lab staff. Drives
/// the lab technician visibility scope.
pub fn list_hospital_ids_by_lab_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Vec<Uuid>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id FROM hospitals WHERE lab_user_id = ?1")?;
    let rows = stmt.query_map(params![user_id.to_string()], |row| uuid_col(row, 0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn update_hospital(
    conn: &Connection,
    hospital: &Hospital,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE hospitals SET name = ?2, location = ?3, phone = ?4, email = ?5, description = ?6,
         consultation_fee = ?7, lab_user_id = ?8, updated_at = ?9 WHERE id = ?1",
        params![
            hospital.id.to_string(),
            hospital.name,
            hospital.location,
            hospital.phone,
            hospital.email,
            hospital.description,
            hospital.consultation_fee,
            opt_id(hospital.lab_user_id),
            now,
        ],
    )?;
    Ok(())
}

pub fn delete_hospital(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM hospitals WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(affected > 0)
}

pub fn get_hospital_summary(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<HospitalSummary>, DatabaseError> {
    Ok(get_hospital(conn, id)?.map(|h| HospitalSummary::from(&h)))
}
