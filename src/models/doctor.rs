use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::hospital::{Department, HospitalSummary};
use super::profile::ProfileSummary;

/// Role profile extending a `Profile` with clinical attributes.
/// One Doctor per user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hospital_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub specialization: Option<String>,
    pub license_number: String,
    pub consultation_fee: f64,
    pub signature_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Doctor joined with the account's display fields, for embedding in
/// populated responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub specialization: Option<String>,
    pub license_number: String,
    pub consultation_fee: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorView {
    pub doctor: Doctor,
    pub user: Option<ProfileSummary>,
    pub hospital: Option<HospitalSummary>,
    pub department: Option<Department>,
}
