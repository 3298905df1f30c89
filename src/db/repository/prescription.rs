use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{doctor, enum_col, medication, opt_id, pharmacy, profile, uuid_col, uuid_col_opt};
use crate::db::DatabaseError;
use crate::models::{Prescription, PrescriptionView};
use crate::scope::ScopeFilter;

const COLS: &str = "id, consultation_id, patient_id, doctor_id, pharmacy_id, status, \
                    medication_id, quantity, dosage, unit_price, total_price, notes, \
                    signature_data, created_at, updated_at";

fn read_prescription(row: &Row<'_>) -> rusqlite::Result<Prescription> {
    Ok(Prescription {
        id: uuid_col(row, 0)?,
        consultation_id: uuid_col(row, 1)?,
        patient_id: uuid_col(row, 2)?,
        doctor_id: uuid_col(row, 3)?,
        pharmacy_id: uuid_col_opt(row, 4)?,
        status: enum_col(row, 5)?,
        medication_id: uuid_col_opt(row, 6)?,
        quantity: row.get(7)?,
        dosage: row.get(8)?,
        unit_price: row.get(9)?,
        total_price: row.get(10)?,
        notes: row.get(11)?,
        signature_data: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

pub fn insert_prescription(conn: &Connection, rx: &Prescription) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, consultation_id, patient_id, doctor_id, pharmacy_id,
         status, medication_id, quantity, dosage, unit_price, total_price, notes,
         signature_data, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            rx.id.to_string(),
            rx.consultation_id.to_string(),
            rx.patient_id.to_string(),
            rx.doctor_id.to_string(),
            opt_id(rx.pharmacy_id),
            rx.status.as_str(),
            opt_id(rx.medication_id),
            rx.quantity,
            rx.dosage,
            rx.unit_price,
            rx.total_price,
            rx.notes,
            rx.signature_data,
            rx.created_at,
            rx.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_prescription(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<Prescription>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM prescriptions WHERE id = ?1"),
        params![id.to_string()],
        read_prescription,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_prescriptions(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<Prescription>, DatabaseError> {
    let sql = format!(
        "SELECT {COLS} FROM prescriptions WHERE {} ORDER BY created_at DESC",
        scope.clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(scope.params.iter()), read_prescription)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Targeted update used by the pharmacy-dispatch operation.
pub fn assign_pharmacy(
    conn: &Connection,
    id: Uuid,
    pharmacy_id: Uuid,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE prescriptions SET pharmacy_id = ?2, notes = COALESCE(?3, notes), updated_at = ?4
         WHERE id = ?1",
        params![id.to_string(), pharmacy_id.to_string(), notes, now],
    )?;
    Ok(())
}

pub fn update_notes(
    conn: &Connection,
    id: Uuid,
    notes: &str,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE prescriptions SET notes = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), notes, now],
    )?;
    Ok(())
}

pub fn to_view(conn: &Connection, rx: Prescription) -> Result<PrescriptionView, DatabaseError> {
    let med = match rx.medication_id {
        Some(mid) => medication::get_medication_summary(conn, mid)?,
        None => None,
    };
    let pharm = match rx.pharmacy_id {
        Some(pid) => pharmacy::get_pharmacy_summary(conn, pid)?,
        None => None,
    };
    let patient = profile::get_profile_summary(conn, rx.patient_id)?;
    let doc = doctor::get_doctor_summary(conn, rx.doctor_id)?;
    Ok(PrescriptionView {
        prescription: rx,
        medication: med,
        pharmacy: pharm,
        patient,
        doctor: doc,
    })
}

pub fn list_views(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<PrescriptionView>, DatabaseError> {
    list_prescriptions(conn, scope)?
        .into_iter()
        .map(|rx| to_view(conn, rx))
        .collect()
}
