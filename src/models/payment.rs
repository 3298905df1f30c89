use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{PaymentStatus, PaymentType};

/// A recording of a payment against a consultation, lab test or
/// medication. Amounts are caller-supplied and not cross-checked against
/// the referenced entity's price; creation completes the payment — there
/// is no gateway settlement behind this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub payment_type: PaymentType,
    /// Id of the consultation, lab test request or prescription paid for.
    pub reference_id: Uuid,
    pub amount: f64,
    pub insurance_coverage: f64,
    pub patient_pays: f64,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
