use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::ProfileSummary;

/// A nurse's vital-signs capture for a patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vital {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub nurse_id: Uuid,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<f64>,
    pub temperature: Option<f64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VitalView {
    pub vital: Vital,
    pub patient: Option<ProfileSummary>,
    pub nurse: Option<ProfileSummary>,
}
