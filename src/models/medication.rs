use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: f64,
    pub stock_quantity: i64,
    pub requires_prescription: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationSummary {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit_price: f64,
}

impl From<&Medication> for MedicationSummary {
    fn from(m: &Medication) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            category: m.category.clone(),
            unit_price: m.unit_price,
        }
    }
}
