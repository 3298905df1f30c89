use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pharmacy {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pharmacist_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacySummary {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
}

impl From<&Pharmacy> for PharmacySummary {
    fn from(p: &Pharmacy) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            location: p.location.clone(),
        }
    }
}
