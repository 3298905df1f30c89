use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::uuid_col;
use crate::db::DatabaseError;
use crate::models::Department;

const COLS: &str = "id, name, description, created_at, updated_at";

fn read_department(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

pub fn insert_department(conn: &Connection, dept: &Department) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO departments (id, name, description, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            dept.id.to_string(),
            dept.name,
            dept.description,
            dept.created_at,
            dept.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_department(conn: &Connection, id: Uuid) -> Result<Option<Department>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM departments WHERE id = ?1"),
        params![id.to_string()],
        read_department,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_departments(conn: &Connection) -> Result<Vec<Department>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLS} FROM departments ORDER BY name"))?;
    let rows = stmt.query_map([], read_department)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn update_department(
    conn: &Connection,
    dept: &Department,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE departments SET name = ?2, description = ?3, updated_at = ?4 WHERE id = ?1",
        params![dept.id.to_string(), dept.name, dept.description, now],
    )?;
    Ok(())
}

pub fn delete_department(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM departments WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(affected > 0)
}
