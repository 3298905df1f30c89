use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::doctor::DoctorSummary;
use super::enums::{PharmacyRequestStatus, PrescriptionStatus};
use super::medication::MedicationSummary;
use super::pharmacy::PharmacySummary;
use super::profile::ProfileSummary;

/// One medication line. A multi-item prescribe call fans out into one
/// row per item; total_price is always unit_price × quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub consultation_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub pharmacy_id: Option<Uuid>,
    pub status: PrescriptionStatus,
    pub medication_id: Option<Uuid>,
    pub quantity: i64,
    pub dosage: String,
    pub unit_price: f64,
    pub total_price: f64,
    pub notes: Option<String>,
    pub signature_data: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionView {
    pub prescription: Prescription,
    pub medication: Option<MedicationSummary>,
    pub pharmacy: Option<PharmacySummary>,
    pub patient: Option<ProfileSummary>,
    pub doctor: Option<DoctorSummary>,
}

/// Dispatch of a prescription to a pharmacy. Unique per
/// (prescription, pharmacy) pair so repeated assignment is idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacyRequest {
    pub id: Uuid,
    pub prescription_id: Uuid,
    pub patient_id: Uuid,
    pub pharmacy_id: Uuid,
    pub status: PharmacyRequestStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PharmacyRequestView {
    pub request: PharmacyRequest,
    pub prescription: Option<Prescription>,
    pub pharmacy: Option<PharmacySummary>,
    pub patient: Option<ProfileSummary>,
}
