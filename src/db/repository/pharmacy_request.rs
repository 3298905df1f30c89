use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, pharmacy, prescription, profile, uuid_col};
use crate::db::DatabaseError;
use crate::models::enums::PharmacyRequestStatus;
use crate::models::{PharmacyRequest, PharmacyRequestView};
use crate::scope::ScopeFilter;

const COLS: &str = "id, prescription_id, patient_id, pharmacy_id, status, rejection_reason, \
                    created_at, updated_at";

fn read_request(row: &Row<'_>) -> rusqlite::Result<PharmacyRequest> {
    Ok(PharmacyRequest {
        id: uuid_col(row, 0)?,
        prescription_id: uuid_col(row, 1)?,
        patient_id: uuid_col(row, 2)?,
        pharmacy_id: uuid_col(row, 3)?,
        status: enum_col(row, 4)?,
        rejection_reason: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub fn insert_request(conn: &Connection, req: &PharmacyRequest) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO pharmacy_requests (id, prescription_id, patient_id, pharmacy_id, status,
         rejection_reason, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            req.id.to_string(),
            req.prescription_id.to_string(),
            req.patient_id.to_string(),
            req.pharmacy_id.to_string(),
            req.status.as_str(),
            req.rejection_reason,
            req.created_at,
            req.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_request(conn: &Connection, id: Uuid) -> Result<Option<PharmacyRequest>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM pharmacy_requests WHERE id = ?1"),
        params![id.to_string()],
        read_request,
    )
    .optional()
    .map_err(Into::into)
}

/// Lookup backing the idempotence rule: one request per
/// (prescription, pharmacy) pair.
pub fn find_by_pair(
    conn: &Connection,
    prescription_id: Uuid,
    pharmacy_id: Uuid,
) -> Result<Option<PharmacyRequest>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM pharmacy_requests WHERE prescription_id = ?1 AND pharmacy_id = ?2"),
        params![prescription_id.to_string(), pharmacy_id.to_string()],
        read_request,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_requests(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<PharmacyRequest>, DatabaseError> {
    let sql = format!(
        "SELECT {COLS} FROM pharmacy_requests WHERE {} ORDER BY created_at DESC",
        scope.clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(scope.params.iter()), read_request)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn set_status(
    conn: &Connection,
    id: Uuid,
    status: PharmacyRequestStatus,
    rejection_reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE pharmacy_requests SET status = ?2,
         rejection_reason = COALESCE(?3, rejection_reason), updated_at = ?4 WHERE id = ?1",
        params![id.to_string(), status.as_str(), rejection_reason, now],
    )?;
    Ok(())
}

pub fn to_view(
    conn: &Connection,
    req: PharmacyRequest,
) -> Result<PharmacyRequestView, DatabaseError> {
    let rx = prescription::get_prescription(conn, req.prescription_id)?;
    let pharm = pharmacy::get_pharmacy_summary(conn, req.pharmacy_id)?;
    let patient = profile::get_profile_summary(conn, req.patient_id)?;
    Ok(PharmacyRequestView {
        request: req,
        prescription: rx,
        pharmacy: pharm,
        patient,
    })
}

pub fn list_views(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<PharmacyRequestView>, DatabaseError> {
    list_requests(conn, scope)?
        .into_iter()
        .map(|req| to_view(conn, req))
        .collect()
}
