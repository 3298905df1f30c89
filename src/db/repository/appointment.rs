use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{department, doctor, enum_col, hospital, profile, uuid_col};
use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::{Appointment, AppointmentView};
use crate::scope::ScopeFilter;

const COLS: &str = "id, patient_id, doctor_id, hospital_id, department_id, appointment_date, \
                    appointment_time, status, reason, rejection_reason, created_at, updated_at";

fn read_appointment(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: uuid_col(row, 0)?,
        patient_id: uuid_col(row, 1)?,
        doctor_id: uuid_col(row, 2)?,
        hospital_id: uuid_col(row, 3)?,
        department_id: uuid_col(row, 4)?,
        appointment_date: row.get(5)?,
        appointment_time: row.get(6)?,
        status: enum_col(row, 7)?,
        reason: row.get(8)?,
        rejection_reason: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Insert a booking. A second non-released booking of the same
/// (doctor, date, time) violates the partial unique index and surfaces
/// as Conflict — that index, not this function, is the double-booking
/// guard.
pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, hospital_id, department_id,
         appointment_date, appointment_time, status, reason, rejection_reason,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.doctor_id.to_string(),
            appt.hospital_id.to_string(),
            appt.department_id.to_string(),
            appt.appointment_date,
            appt.appointment_time,
            appt.status.as_str(),
            appt.reason,
            appt.rejection_reason,
            appt.created_at,
            appt.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: Uuid) -> Result<Option<Appointment>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM appointments WHERE id = ?1"),
        params![id.to_string()],
        read_appointment,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_appointments(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<Appointment>, DatabaseError> {
    let sql = format!(
        "SELECT {COLS} FROM appointments WHERE {} \
         ORDER BY appointment_date DESC, appointment_time DESC",
        scope.clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(scope.params.iter()), read_appointment)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Times that block a slot for this doctor on this date: pending and
/// approved bookings only.
pub fn blocking_times(
    conn: &Connection,
    doctor_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<NaiveTime>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT appointment_time FROM appointments
         WHERE doctor_id = ?1 AND appointment_date = ?2 AND status IN ('pending', 'approved')",
    )?;
    let rows = stmt.query_map(params![doctor_id.to_string(), date], |row| row.get(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn set_status(
    conn: &Connection,
    id: Uuid,
    status: AppointmentStatus,
    rejection_reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE appointments SET status = ?2, rejection_reason = COALESCE(?3, rejection_reason),
         updated_at = ?4 WHERE id = ?1",
        params![id.to_string(), status.as_str(), rejection_reason, now],
    )?;
    Ok(())
}

pub fn to_view(conn: &Connection, appt: Appointment) -> Result<AppointmentView, DatabaseError> {
    let patient = profile::get_profile_summary(conn, appt.patient_id)?;
    let doc = doctor::get_doctor_summary(conn, appt.doctor_id)?;
    let hosp = hospital::get_hospital_summary(conn, appt.hospital_id)?;
    let dept = department::get_department(conn, appt.department_id)?;
    Ok(AppointmentView {
        appointment: appt,
        patient,
        doctor: doc,
        hospital: hosp,
        department: dept,
    })
}

pub fn list_views(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<AppointmentView>, DatabaseError> {
    list_appointments(conn, scope)?
        .into_iter()
        .map(|appt| to_view(conn, appt))
        .collect()
}
