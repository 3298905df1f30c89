use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{profile, uuid_col};
use crate::db::DatabaseError;
use crate::models::{Vital, VitalView};
use crate::scope::ScopeFilter;

const COLS: &str = "id, patient_id, nurse_id, blood_pressure, heart_rate, temperature, weight, \
                    height, notes, created_at, updated_at";

fn read_vital(row: &Row<'_>) -> rusqlite::Result<Vital> {
    Ok(Vital {
        id: uuid_col(row, 0)?,
        patient_id: uuid_col(row, 1)?,
        nurse_id: uuid_col(row, 2)?,
        blood_pressure: row.get(3)?,
        heart_rate: row.get(4)?,
        temperature: row.get(5)?,
        weight: row.get(6)?,
        height: row.get(7)?,
        notes: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub fn insert_vital(conn: &Connection, vital: &Vital) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO vitals (id, patient_id, nurse_id, blood_pressure, heart_rate, temperature,
         weight, height, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            vital.id.to_string(),
            vital.patient_id.to_string(),
            vital.nurse_id.to_string(),
            vital.blood_pressure,
            vital.heart_rate,
            vital.temperature,
            vital.weight,
            vital.height,
            vital.notes,
            vital.created_at,
            vital.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_vital(conn: &Connection, id: Uuid) -> Result<Option<Vital>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM vitals WHERE id = ?1"),
        params![id.to_string()],
        read_vital,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_vitals(conn: &Connection, scope: &ScopeFilter) -> Result<Vec<Vital>, DatabaseError> {
    let sql = format!(
        "SELECT {COLS} FROM vitals WHERE {} ORDER BY created_at DESC",
        scope.clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(scope.params.iter()), read_vital)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn to_view(conn: &Connection, vital: Vital) -> Result<VitalView, DatabaseError> {
    let patient = profile::get_profile_summary(conn, vital.patient_id)?;
    let nurse = profile::get_profile_summary(conn, vital.nurse_id)?;
    Ok(VitalView {
        vital,
        patient,
        nurse,
    })
}

pub fn list_views(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<VitalView>, DatabaseError> {
    list_vitals(conn, scope)?
        .into_iter()
        .map(|vital| to_view(conn, vital))
        .collect()
}
