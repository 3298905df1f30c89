use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::doctor::DoctorSummary;
use super::enums::AppointmentStatus;
use super::hospital::{Department, HospitalSummary};
use super::profile::ProfileSummary;

/// A booked (or requested) slot with a doctor.
///
/// At most one non-cancelled, non-rejected appointment may exist per
/// (doctor, date, time) — enforced by a partial unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub hospital_id: Uuid,
    pub department_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    pub appointment: Appointment,
    pub patient: Option<ProfileSummary>,
    pub doctor: Option<DoctorSummary>,
    pub hospital: Option<HospitalSummary>,
    pub department: Option<Department>,
}
