use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{doctor, enum_col, hospital, opt_id, profile, uuid_col, uuid_col_opt};
use crate::db::DatabaseError;
use crate::models::enums::LabRequestStatus;
use crate::models::{
    LabTestRequest, LabTestRequestView, LabTestResult, LabTestResultView, LabTestTemplate,
};
use crate::scope::ScopeFilter;

// ── Templates ───────────────────────────────────────────────

const TEMPLATE_COLS: &str = "id, name, description, price, category, created_at, updated_at";

fn read_template(row: &Row<'_>) -> rusqlite::Result<LabTestTemplate> {
    Ok(LabTestTemplate {
        id: uuid_col(row, 0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn insert_template(conn: &Connection, tpl: &LabTestTemplate) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO lab_test_templates (id, name, description, price, category,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            tpl.id.to_string(),
            tpl.name,
            tpl.description,
            tpl.price,
            tpl.category,
            tpl.created_at,
            tpl.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_template(conn: &Connection, id: Uuid) -> Result<Option<LabTestTemplate>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {TEMPLATE_COLS} FROM lab_test_templates WHERE id = ?1"),
        params![id.to_string()],
        read_template,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_templates(conn: &Connection) -> Result<Vec<LabTestTemplate>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEMPLATE_COLS} FROM lab_test_templates ORDER BY name"
    ))?;
    let rows = stmt.query_map([], read_template)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn update_template(
    conn: &Connection,
    tpl: &LabTestTemplate,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE lab_test_templates SET name = ?2, description = ?3, price = ?4, category = ?5,
         updated_at = ?6 WHERE id = ?1",
        params![
            tpl.id.to_string(),
            tpl.name,
            tpl.description,
            tpl.price,
            tpl.category,
            now,
        ],
    )?;
    Ok(())
}

pub fn delete_template(conn: &Connection, id: Uuid) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM lab_test_templates WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(affected > 0)
}

// ── Requests ────────────────────────────────────────────────

const REQUEST_COLS: &str = "id, consultation_id, patient_id, doctor_id, lab_test_template_id, \
                            hospital_id, status, total_price, created_at, updated_at";

fn read_request(row: &Row<'_>) -> rusqlite::Result<LabTestRequest> {
    Ok(LabTestRequest {
        id: uuid_col(row, 0)?,
        consultation_id: uuid_col(row, 1)?,
        patient_id: uuid_col(row, 2)?,
        doctor_id: uuid_col(row, 3)?,
        lab_test_template_id: uuid_col(row, 4)?,
        hospital_id: uuid_col_opt(row, 5)?,
        status: enum_col(row, 6)?,
        total_price: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub fn insert_request(conn: &Connection, req: &LabTestRequest) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO lab_test_requests (id, consultation_id, patient_id, doctor_id,
         lab_test_template_id, hospital_id, status, total_price, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            req.id.to_string(),
            req.consultation_id.to_string(),
            req.patient_id.to_string(),
            req.doctor_id.to_string(),
            req.lab_test_template_id.to_string(),
            opt_id(req.hospital_id),
            req.status.as_str(),
            req.total_price,
            req.created_at,
            req.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_request(conn: &Connection, id: Uuid) -> Result<Option<LabTestRequest>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {REQUEST_COLS} FROM lab_test_requests WHERE id = ?1"),
        params![id.to_string()],
        read_request,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_requests(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<LabTestRequest>, DatabaseError> {
    let sql = format!(
        "SELECT {REQUEST_COLS} FROM lab_test_requests WHERE {} ORDER BY created_at DESC",
        scope.clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(scope.params.iter()), read_request)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn set_request_status(
    conn: &Connection,
    id: Uuid,
    status: LabRequestStatus,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE lab_test_requests SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), status.as_str(), now],
    )?;
    Ok(())
}

pub fn request_to_view(
    conn: &Connection,
    req: LabTestRequest,
) -> Result<LabTestRequestView, DatabaseError> {
    let template = get_template(conn, req.lab_test_template_id)?;
    let patient = profile::get_profile_summary(conn, req.patient_id)?;
    let doc = doctor::get_doctor_summary(conn, req.doctor_id)?;
    let hosp = match req.hospital_id {
        Some(hid) => hospital::get_hospital_summary(conn, hid)?,
        None => None,
    };
    Ok(LabTestRequestView {
        request: req,
        template,
        patient,
        doctor: doc,
        hospital: hosp,
    })
}

pub fn list_request_views(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<LabTestRequestView>, DatabaseError> {
    list_requests(conn, scope)?
        .into_iter()
        .map(|req| request_to_view(conn, req))
        .collect()
}

// ── Results ─────────────────────────────────────────────────

const RESULT_COLS: &str = "id, lab_test_request_id, technician_id, result_status, result_data, \
                           notes, completed_at, created_at, updated_at";

fn read_result(row: &Row<'_>) -> rusqlite::Result<LabTestResult> {
    Ok(LabTestResult {
        id: uuid_col(row, 0)?,
        lab_test_request_id: uuid_col(row, 1)?,
        technician_id: uuid_col(row, 2)?,
        result_status: enum_col(row, 3)?,
        result_data: row.get(4)?,
        notes: row.get(5)?,
        completed_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// One result per request — a second insert for the same request hits
/// the unique constraint and surfaces as Conflict.
pub fn insert_result(conn: &Connection, result: &LabTestResult) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO lab_test_results (id, lab_test_request_id, technician_id, result_status,
         result_data, notes, completed_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            result.id.to_string(),
            result.lab_test_request_id.to_string(),
            result.technician_id.to_string(),
            result.result_status.as_str(),
            result.result_data,
            result.notes,
            result.completed_at,
            result.created_at,
            result.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_result(conn: &Connection, id: Uuid) -> Result<Option<LabTestResult>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {RESULT_COLS} FROM lab_test_results WHERE id = ?1"),
        params![id.to_string()],
        read_result,
    )
    .optional()
    .map_err(Into::into)
}

pub fn get_result_by_request(
    conn: &Connection,
    request_id: Uuid,
) -> Result<Option<LabTestResult>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {RESULT_COLS} FROM lab_test_results WHERE lab_test_request_id = ?1"),
        params![request_id.to_string()],
        read_result,
    )
    .optional()
    .map_err(Into::into)
}

pub fn result_to_view(
    conn: &Connection,
    result: LabTestResult,
) -> Result<LabTestResultView, DatabaseError> {
    let request = get_request(conn, result.lab_test_request_id)?;
    let technician = profile::get_profile_summary(conn, result.technician_id)?;
    Ok(LabTestResultView {
        result,
        request,
        technician,
    })
}
