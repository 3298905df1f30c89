use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{profile, uuid_col};
use crate::db::DatabaseError;
use crate::models::{Nurse, NurseView};

const COLS: &str = "id, user_id, license_number, created_at, updated_at";

fn read_nurse(row: &Row<'_>) -> rusqlite::Result<Nurse> {
    Ok(Nurse {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        license_number: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

pub fn insert_nurse(conn: &Connection, nurse: &Nurse) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO nurses (id, user_id, license_number, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            nurse.id.to_string(),
            nurse.user_id.to_string(),
            nurse.license_number,
            nurse.created_at,
            nurse.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_nurse(conn: &Connection, id: Uuid) -> Result<Option<Nurse>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM nurses WHERE id = ?1"),
        params![id.to_string()],
        read_nurse,
    )
    .optional()
    .map_err(Into::into)
}

pub fn get_nurse_by_user(conn: &Connection, user_id: Uuid) -> Result<Option<Nurse>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM nurses WHERE user_id = ?1"),
        params![user_id.to_string()],
        read_nurse,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_nurses(conn: &Connection) -> Result<Vec<Nurse>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLS} FROM nurses ORDER BY created_at"))?;
    let rows = stmt.query_map([], read_nurse)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn update_nurse(
    conn: &Connection,
    nurse: &Nurse,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE nurses SET license_number = ?2, updated_at = ?3 WHERE id = ?1",
        params![nurse.id.to_string(), nurse.license_number, now],
    )?;
    Ok(())
}

pub fn delete_nurse(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute("DELETE FROM nurses WHERE id = ?1", params![id.to_string()])?;
    Ok(affected > 0)
}

pub fn to_view(conn: &Connection, nurse: Nurse) -> Result<NurseView, DatabaseError> {
    let user = profile::get_profile_summary(conn, nurse.user_id)?;
    Ok(NurseView { nurse, user })
}
