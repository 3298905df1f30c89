use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::uuid_col;
use crate::db::DatabaseError;
use crate::models::{Medication, MedicationSummary};

const COLS: &str = "id, name, description, category, unit_price, stock_quantity, \
                    requires_prescription, created_at, updated_at";

fn read_medication(row: &Row<'_>) -> rusqlite::Result<Medication> {
    Ok(Medication {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        unit_price: row.get(4)?,
        stock_quantity: row.get(5)?,
        requires_prescription: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, name, description, category, unit_price, stock_quantity,
         requires_prescription, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            med.id.to_string(),
            med.name,
            med.description,
            med.category,
            med.unit_price,
            med.stock_quantity,
            med.requires_prescription,
            med.created_at,
            med.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_medication(conn: &Connection, id: Uuid) -> Result<Option<Medication>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM medications WHERE id = ?1"),
        params![id.to_string()],
        read_medication,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_medications(conn: &Connection) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLS} FROM medications ORDER BY name"))?;
    let rows = stmt.query_map([], read_medication)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn update_medication(
    conn: &Connection,
    med: &Medication,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE medications SET name = ?2, description = ?3, category = ?4, unit_price = ?5,
         stock_quantity = ?6, requires_prescription = ?7, updated_at = ?8 WHERE id = ?1",
        params![
            med.id.to_string(),
            med.name,
            med.description,
            med.category,
            med.unit_price,
            med.stock_quantity,
            med.requires_prescription,
            now,
        ],
    )?;
    Ok(())
}

pub fn delete_medication(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM medications WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(affected > 0)
}

pub fn get_medication_summary(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<MedicationSummary>, DatabaseError> {
    Ok(get_medication(conn, id)?.map(|m| MedicationSummary::from(&m)))
}
