use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{department, hospital, uuid_col};
use crate::db::DatabaseError;
use crate::models::{HospitalDepartment, HospitalDepartmentView};

const COLS: &str = "id, hospital_id, department_id, consultation_fee, created_at, updated_at";

fn read_link(row: &Row<'_>) -> rusqlite::Result<HospitalDepartment> {
    Ok(HospitalDepartment {
        id: uuid_col(row, 0)?,
        hospital_id: uuid_col(row, 1)?,
        department_id: uuid_col(row, 2)?,
        consultation_fee: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// The (hospital, department) pair is unique; a duplicate insert
/// surfaces as Conflict.
pub fn insert_hospital_department(
    conn: &Connection,
    link: &HospitalDepartment,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO hospital_departments (id, hospital_id, department_id, consultation_fee,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            link.id.to_string(),
            link.hospital_id.to_string(),
            link.department_id.to_string(),
            link.consultation_fee,
            link.created_at,
            link.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_hospital_department(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<HospitalDepartment>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM hospital_departments WHERE id = ?1"),
        params![id.to_string()],
        read_link,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_hospital_departments(
    conn: &Connection,
    hospital_id: Option<Uuid>,
) -> Result<Vec<HospitalDepartment>, DatabaseError> {
    match hospital_id {
        Some(hid) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLS} FROM hospital_departments WHERE hospital_id = ?1 ORDER BY created_at"
            ))?;
            let rows = stmt.query_map(params![hid.to_string()], read_link)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLS} FROM hospital_departments ORDER BY created_at"
            ))?;
            let rows = stmt.query_map([], read_link)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        }
    }
}

pub fn update_fee(
    conn: &Connection,
    id: Uuid,
    consultation_fee: f64,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE hospital_departments SET consultation_fee = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), consultation_fee, now],
    )?;
    Ok(())
}

pub fn delete_hospital_department(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM hospital_departments WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(affected > 0)
}

pub fn to_view(
    conn: &Connection,
    link: HospitalDepartment,
) -> Result<HospitalDepartmentView, DatabaseError> {
    let hospital = hospital::get_hospital_summary(conn, link.hospital_id)?;
    let dept = department::get_department(conn, link.department_id)?;
    Ok(HospitalDepartmentView {
        link,
        hospital,
        department: dept,
    })
}
