use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{opt_id, uuid_col, uuid_col_opt};
use crate::db::DatabaseError;
use crate::models::{Pharmacy, PharmacySummary};

const COLS: &str = "id, name, location, phone, email, latitude, longitude, pharmacist_id, \
                    created_at, updated_at";

fn read_pharmacy(row: &Row<'_>) -> rusqlite::Result<Pharmacy> {
    Ok(Pharmacy {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        pharmacist_id: uuid_col_opt(row, 7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub fn insert_pharmacy(conn: &Connection, pharmacy: &Pharmacy) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pharmacies (id, name, location, phone, email, latitude, longitude,
         pharmacist_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            pharmacy.id.to_string(),
            pharmacy.name,
            pharmacy.location,
            pharmacy.phone,
            pharmacy.email,
            pharmacy.latitude,
            pharmacy.longitude,
            opt_id(pharmacy.pharmacist_id),
            pharmacy.created_at,
            pharmacy.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_pharmacy(conn: &Connection, id: Uuid) -> Result<Option<Pharmacy>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM pharmacies WHERE id = ?1"),
        params![id.to_string()],
        read_pharmacy,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_pharmacies(conn: &Connection) -> Result<Vec<Pharmacy>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {COLS} FROM pharmacies ORDER BY name"))?;
    let rows = stmt.query_map([], read_pharmacy)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Pharmacies staffed by this pharmacist account. Drives the pharmacist
/// visibility scope.
pub fn list_pharmacy_ids_by_pharmacist(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Vec<Uuid>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id FROM pharmacies WHERE pharmacist_id = ?1")?;
    let rows = stmt.query_map(params![user_id.to_string()], |row| uuid_col(row, 0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn update_pharmacy(
    conn: &Connection,
    pharmacy: &Pharmacy,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE pharmacies SET name = ?2, location = ?3, phone = ?4, email = ?5, latitude = ?6,
         longitude = ?7, pharmacist_id = ?8, updated_at = ?9 WHERE id = ?1",
        params![
            pharmacy.id.to_string(),
            pharmacy.name,
            pharmacy.location,
            pharmacy.phone,
            pharmacy.email,
            pharmacy.latitude,
            pharmacy.longitude,
            opt_id(pharmacy.pharmacist_id),
            now,
        ],
    )?;
    Ok(())
}

pub fn delete_pharmacy(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM pharmacies WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(affected > 0)
}

pub fn get_pharmacy_summary(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<PharmacySummary>, DatabaseError> {
    Ok(get_pharmacy(conn, id)?.map(|p| PharmacySummary::from(&p)))
}
