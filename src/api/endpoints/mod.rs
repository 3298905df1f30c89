pub mod appointments;
pub mod auth;
pub mod consultations;
pub mod departments;
pub mod doctors;
pub mod health;
pub mod hospital_departments;
pub mod hospitals;
pub mod insurances;
pub mod medications;
pub mod notifications;
pub mod nurses;
pub mod payments;
pub mod pharmacies;
pub mod pharmacy_requests;
pub mod prescriptions;
pub mod profiles;
pub mod vitals;

use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}

/// Parse a path or body id, turning garbage into InvalidInput rather
/// than a framework rejection.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidInput(format!("invalid {what} id")))
}

pub(crate) fn non_blank(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::InvalidInput(format!("{field} must not be blank")))
    } else {
        Ok(())
    }
}
