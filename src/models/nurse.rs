use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::ProfileSummary;

/// Role profile for nursing staff. One Nurse per user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nurse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub license_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NurseView {
    pub nurse: Nurse,
    pub user: Option<ProfileSummary>,
}
