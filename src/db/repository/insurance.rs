use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::uuid_col;
use crate::db::DatabaseError;
use crate::models::Insurance;

const COLS: &str = "id, name, coverage_percentage, description, created_at, updated_at";

fn read_insurance(row: &Row<'_>) -> rusqlite::Result<Insurance> {
    Ok(Insurance {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        coverage_percentage: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

pub fn insert_insurance(conn: &Connection, ins: &Insurance) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO insurances (id, name, coverage_percentage, description, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            ins.id.to_string(),
            ins.name,
            ins.coverage_percentage,
            ins.description,
            ins.created_at,
            ins.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_insurance(conn: &Connection, id: Uuid) -> Result<Option<Insurance>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM insurances WHERE id = ?1"),
        params![id.to_string()],
        read_insurance,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_insurances(conn: &Connection) -> Result<Vec<Insurance>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLS} FROM insurances ORDER BY name"))?;
    let rows = stmt.query_map([], read_insurance)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn update_insurance(
    conn: &Connection,
    ins: &Insurance,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE insurances SET name = ?2, coverage_percentage = ?3, description = ?4,
         updated_at = ?5 WHERE id = ?1",
        params![
            ins.id.to_string(),
            ins.name,
            ins.coverage_percentage,
            ins.description,
            now,
        ],
    )?;
    Ok(())
}

pub fn delete_insurance(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM insurances WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(affected > 0)
}
