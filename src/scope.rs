//! Visibility scopes — the role-dependent query predicate restricting
//! which records a list operation returns.
//!
//! Each entity family gets one function here, so the role branching is
//! written (and tested) once instead of being re-derived per route. The
//! returned filter is compiled into the lookup query's WHERE clause by
//! the repositories — a pre-filter, never a post-filter.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{doctor, hospital, pharmacy};
use crate::db::DatabaseError;
use crate::models::enums::Role;

/// A WHERE-clause fragment plus its positional parameters.
///
/// All scope parameters are UUID strings, which keeps binding uniform.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    pub clause: String,
    pub params: Vec<String>,
}

impl ScopeFilter {
    pub fn all() -> Self {
        Self {
            clause: "1=1".to_string(),
            params: Vec::new(),
        }
    }

    /// Matches nothing. Roles with no stake in a family get an empty
    /// list, not an error.
    pub fn none() -> Self {
        Self {
            clause: "1=0".to_string(),
            params: Vec::new(),
        }
    }

    pub fn eq(column: &str, id: Uuid) -> Self {
        Self {
            clause: format!("{column} = ?"),
            params: vec![id.to_string()],
        }
    }

    pub fn any_of(column: &str, ids: &[Uuid]) -> Self {
        if ids.is_empty() {
            return Self::none();
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        Self {
            clause: format!("{column} IN ({placeholders})"),
            params: ids.iter().map(Uuid::to_string).collect(),
        }
    }
}

/// Appointments: patients their own, doctors their own, nurses and
/// admins everything (both act on pending appointments).
pub fn appointments(
    conn: &Connection,
    role: Role,
    user_id: Uuid,
) -> Result<ScopeFilter, DatabaseError> {
    Ok(match role {
        Role::Admin | Role::Nurse => ScopeFilter::all(),
        Role::Patient => ScopeFilter::eq("appointments.patient_id", user_id),
        Role::Doctor => match doctor::get_doctor_by_user(conn, user_id)? {
            Some(doc) => ScopeFilter::eq("appointments.doctor_id", doc.id),
            None => ScopeFilter::none(),
        },
        _ => ScopeFilter::none(),
    })
}

pub fn consultations(
    conn: &Connection,
    role: Role,
    user_id: Uuid,
) -> Result<ScopeFilter, DatabaseError> {
    Ok(match role {
        Role::Admin => ScopeFilter::all(),
        Role::Patient => ScopeFilter::eq("consultations.patient_id", user_id),
        Role::Doctor => match doctor::get_doctor_by_user(conn, user_id)? {
            Some(doc) => ScopeFilter::eq("consultations.doctor_id", doc.id),
            None => ScopeFilter::none(),
        },
        _ => ScopeFilter::none(),
    })
}

/// Lab requests: a technician sees the hospitals that registered their
/// account as lab staff; zero such hospitals means an empty list.
pub fn lab_requests(
    conn: &Connection,
    role: Role,
    user_id: Uuid,
) -> Result<ScopeFilter, DatabaseError> {
    Ok(match role {
        Role::Admin => ScopeFilter::all(),
        Role::Patient => ScopeFilter::eq("lab_test_requests.patient_id", user_id),
        Role::Doctor => match doctor::get_doctor_by_user(conn, user_id)? {
            Some(doc) => ScopeFilter::eq("lab_test_requests.doctor_id", doc.id),
            None => ScopeFilter::none(),
        },
        Role::LabTechnician => {
            let hospitals = hospital::list_hospital_ids_by_lab_user(conn, user_id)?;
            ScopeFilter::any_of("lab_test_requests.hospital_id", &hospitals)
        }
        _ => ScopeFilter::none(),
    })
}

pub fn prescriptions(
    conn: &Connection,
    role: Role,
    user_id: Uuid,
) -> Result<ScopeFilter, DatabaseError> {
    Ok(match role {
        Role::Admin => ScopeFilter::all(),
        Role::Patient => ScopeFilter::eq("prescriptions.patient_id", user_id),
        Role::Doctor => match doctor::get_doctor_by_user(conn, user_id)? {
            Some(doc) => ScopeFilter::eq("prescriptions.doctor_id", doc.id),
            None => ScopeFilter::none(),
        },
        Role::Pharmacist => {
            let pharmacies = pharmacy::list_pharmacy_ids_by_pharmacist(conn, user_id)?;
            ScopeFilter::any_of("prescriptions.pharmacy_id", &pharmacies)
        }
        _ => ScopeFilter::none(),
    })
}

pub fn pharmacy_requests(
    conn: &Connection,
    role: Role,
    user_id: Uuid,
) -> Result<ScopeFilter, DatabaseError> {
    Ok(match role {
        Role::Admin => ScopeFilter::all(),
        Role::Patient => ScopeFilter::eq("pharmacy_requests.patient_id", user_id),
        Role::Pharmacist => {
            let pharmacies = pharmacy::list_pharmacy_ids_by_pharmacist(conn, user_id)?;
            ScopeFilter::any_of("pharmacy_requests.pharmacy_id", &pharmacies)
        }
        _ => ScopeFilter::none(),
    })
}

pub fn payments(role: Role, user_id: Uuid) -> ScopeFilter {
    match role {
        Role::Admin => ScopeFilter::all(),
        Role::Patient => ScopeFilter::eq("payments.patient_id", user_id),
        _ => ScopeFilter::none(),
    }
}

/// Vitals: patients their own readings, nurses the readings they took.
pub fn vitals(role: Role, user_id: Uuid) -> ScopeFilter {
    match role {
        Role::Admin => ScopeFilter::all(),
        Role::Patient => ScopeFilter::eq("vitals.patient_id", user_id),
        Role::Nurse => ScopeFilter::eq("vitals.nurse_id", user_id),
        _ => ScopeFilter::none(),
    }
}
