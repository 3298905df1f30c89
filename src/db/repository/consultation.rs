use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{appointment, doctor, profile, uuid_col};
use crate::db::DatabaseError;
use crate::models::{Consultation, ConsultationView};
use crate::scope::ScopeFilter;

const COLS: &str = "id, appointment_id, patient_id, doctor_id, diagnosis, notes, \
                    requires_lab_test, requires_prescription, consultation_date, \
                    created_at, updated_at";

fn read_consultation(row: &Row<'_>) -> rusqlite::Result<Consultation> {
    Ok(Consultation {
        id: uuid_col(row, 0)?,
        appointment_id: uuid_col(row, 1)?,
        patient_id: uuid_col(row, 2)?,
        doctor_id: uuid_col(row, 3)?,
        diagnosis: row.get(4)?,
        notes: row.get(5)?,
        requires_lab_test: row.get(6)?,
        requires_prescription: row.get(7)?,
        consultation_date: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// One consultation per appointment — the unique constraint on
/// appointment_id turns a duplicate into Conflict.
pub fn insert_consultation(conn: &Connection, cons: &Consultation) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO consultations (id, appointment_id, patient_id, doctor_id, diagnosis, notes,
         requires_lab_test, requires_prescription, consultation_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            cons.id.to_string(),
            cons.appointment_id.to_string(),
            cons.patient_id.to_string(),
            cons.doctor_id.to_string(),
            cons.diagnosis,
            cons.notes,
            cons.requires_lab_test,
            cons.requires_prescription,
            cons.consultation_date,
            cons.created_at,
            cons.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_consultation(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<Consultation>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM consultations WHERE id = ?1"),
        params![id.to_string()],
        read_consultation,
    )
    .optional()
    .map_err(Into::into)
}

pub fn get_by_appointment(
    conn: &Connection,
    appointment_id: Uuid,
) -> Result<Option<Consultation>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM consultations WHERE appointment_id = ?1"),
        params![appointment_id.to_string()],
        read_consultation,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_consultations(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<Consultation>, DatabaseError> {
    let sql = format!(
        "SELECT {COLS} FROM consultations WHERE {} ORDER BY consultation_date DESC",
        scope.clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(scope.params.iter()), read_consultation)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn to_view(conn: &Connection, cons: Consultation) -> Result<ConsultationView, DatabaseError> {
    let appt = appointment::get_appointment(conn, cons.appointment_id)?;
    let patient = profile::get_profile_summary(conn, cons.patient_id)?;
    let doc = doctor::get_doctor_summary(conn, cons.doctor_id)?;
    Ok(ConsultationView {
        consultation: cons,
        appointment: appt,
        patient,
        doctor: doc,
    })
}

pub fn list_views(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<ConsultationView>, DatabaseError> {
    list_consultations(conn, scope)?
        .into_iter()
        .map(|cons| to_view(conn, cons))
        .collect()
}
