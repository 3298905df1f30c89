//! Per-entity data access. Free functions over `&Connection`, so callers
//! can pass either a plain connection or an open transaction.
//!
//! UUIDs are stored as TEXT; dates, times and timestamps ride on
//! rusqlite's chrono integration. Reference expansion ("populate") is
//! done by explicit per-aggregate `*_view` loaders, not ad hoc joins in
//! route code.

pub mod appointment;
pub mod auth_token;
pub mod consultation;
pub mod department;
pub mod doctor;
pub mod hospital;
pub mod hospital_department;
pub mod insurance;
pub mod lab_test;
pub mod medication;
pub mod notification;
pub mod nurse;
pub mod payment;
pub mod pharmacy;
pub mod pharmacy_request;
pub mod prescription;
pub mod profile;
pub mod vital;

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use super::DatabaseError;

/// Read a TEXT column as a UUID.
pub(crate) fn uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a nullable TEXT column as an optional UUID.
pub(crate) fn uuid_col_opt(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| {
            Uuid::parse_str(&s).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        })
        .transpose()
}

/// Read a TEXT column as a status enum.
pub(crate) fn enum_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = DatabaseError>,
{
    let s: String = row.get(idx)?;
    T::from_str(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// TEXT form of an optional UUID, for binding.
pub(crate) fn opt_id(id: Option<Uuid>) -> Option<String> {
    id.map(|v| v.to_string())
}
