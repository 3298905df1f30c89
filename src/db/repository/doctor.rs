use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{department, hospital, opt_id, profile, uuid_col, uuid_col_opt};
use crate::db::DatabaseError;
use crate::models::{Doctor, DoctorSummary, DoctorView};

const COLS: &str = "id, user_id, hospital_id, department_id, specialization, license_number, \
                    consultation_fee, signature_data, created_at, updated_at";

fn read_doctor(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        hospital_id: uuid_col_opt(row, 2)?,
        department_id: uuid_col_opt(row, 3)?,
        specialization: row.get(4)?,
        license_number: row.get(5)?,
        consultation_fee: row.get(6)?,
        signature_data: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub fn insert_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (id, user_id, hospital_id, department_id, specialization,
         license_number, consultation_fee, signature_data, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            doctor.id.to_string(),
            doctor.user_id.to_string(),
            opt_id(doctor.hospital_id),
            opt_id(doctor.department_id),
            doctor.specialization,
            doctor.license_number,
            doctor.consultation_fee,
            doctor.signature_data,
            doctor.created_at,
            doctor.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_doctor(conn: &Connection, id: Uuid) -> Result<Option<Doctor>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM doctors WHERE id = ?1"),
        params![id.to_string()],
        read_doctor,
    )
    .optional()
    .map_err(Into::into)
}

/// The one Doctor row for a user account, if any. Ownership checks on
/// clinical records go through this.
pub fn get_doctor_by_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Option<Doctor>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM doctors WHERE user_id = ?1"),
        params![user_id.to_string()],
        read_doctor,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_doctors(
    conn: &Connection,
    hospital_id: Option<Uuid>,
    department_id: Option<Uuid>,
) -> Result<Vec<Doctor>, DatabaseError> {
    let mut clauses = vec!["1=1".to_string()];
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(hid) = hospital_id {
        clauses.push("hospital_id = ?".to_string());
        params_vec.push(hid.to_string());
    }
    if let Some(did) = department_id {
        clauses.push("department_id = ?".to_string());
        params_vec.push(did.to_string());
    }
    let sql = format!(
        "SELECT {COLS} FROM doctors WHERE {} ORDER BY created_at",
        clauses.join(" AND ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec), read_doctor)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn update_doctor(
    conn: &Connection,
    doctor: &Doctor,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE doctors SET hospital_id = ?2, department_id = ?3, specialization = ?4,
         consultation_fee = ?5, signature_data = ?6, updated_at = ?7 WHERE id = ?1",
        params![
            doctor.id.to_string(),
            opt_id(doctor.hospital_id),
            opt_id(doctor.department_id),
            doctor.specialization,
            doctor.consultation_fee,
            doctor.signature_data,
            now,
        ],
    )?;
    Ok(())
}

pub fn delete_doctor(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute("DELETE FROM doctors WHERE id = ?1", params![id.to_string()])?;
    Ok(affected > 0)
}

/// Doctor joined with the account's name, for embedding in populated
/// responses.
pub fn get_doctor_summary(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<DoctorSummary>, DatabaseError> {
    conn.query_row(
        "SELECT d.id, d.user_id, p.full_name, d.specialization, d.license_number,
                d.consultation_fee
         FROM doctors d JOIN profiles p ON p.id = d.user_id
         WHERE d.id = ?1",
        params![id.to_string()],
        |row| {
            Ok(DoctorSummary {
                id: uuid_col(row, 0)?,
                user_id: uuid_col(row, 1)?,
                full_name: row.get(2)?,
                specialization: row.get(3)?,
                license_number: row.get(4)?,
                consultation_fee: row.get(5)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

pub fn to_view(conn: &Connection, doctor: Doctor) -> Result<DoctorView, DatabaseError> {
    let user = profile::get_profile_summary(conn, doctor.user_id)?;
    let hosp = match doctor.hospital_id {
        Some(hid) => hospital::get_hospital_summary(conn, hid)?,
        None => None,
    };
    let dept = match doctor.department_id {
        Some(did) => department::get_department(conn, did)?,
        None => None,
    };
    Ok(DoctorView {
        doctor,
        user,
        hospital: hosp,
        department: dept,
    })
}
