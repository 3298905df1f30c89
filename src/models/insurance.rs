use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insurance {
    pub id: Uuid,
    pub name: String,
    /// Percentage of any amount the insurer covers, in [0, 100].
    pub coverage_percentage: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
