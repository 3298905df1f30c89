use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub consultation_fee: f64,
    /// Lab staff account; gates a lab technician's visible requests.
    pub lab_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalSummary {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
}

impl From<&Hospital> for HospitalSummary {
    fn from(h: &Hospital) -> Self {
        Self {
            id: h.id,
            name: h.name.clone(),
            location: h.location.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-hospital department listing with its own consultation fee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalDepartment {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub department_id: Uuid,
    pub consultation_fee: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HospitalDepartmentView {
    pub link: HospitalDepartment,
    pub hospital: Option<HospitalSummary>,
    pub department: Option<Department>,
}
