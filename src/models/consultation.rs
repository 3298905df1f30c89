use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::appointment::Appointment;
use super::doctor::DoctorSummary;
use super::profile::ProfileSummary;

/// Clinical record of a completed visit. 1:1 with its appointment;
/// patient and doctor references are copied from the appointment at
/// creation, never taken from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub requires_lab_test: bool,
    pub requires_prescription: bool,
    pub consultation_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsultationView {
    pub consultation: Consultation,
    pub appointment: Option<Appointment>,
    pub patient: Option<ProfileSummary>,
    pub doctor: Option<DoctorSummary>,
}
