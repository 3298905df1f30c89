//! Vital-signs capture by nurses.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::{profile, vital};
use crate::models::enums::Role;
use crate::models::{Vital, VitalView};
use crate::scope;

#[derive(Deserialize)]
pub struct CreateVitalRequest {
    pub patient_id: String,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<f64>,
    pub temperature: Option<f64>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub notes: Option<String>,
}

/// `POST /api/vitals` (nurse)
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<CreateVitalRequest>,
) -> Result<Json<VitalView>, ApiError> {
    user.require_role(&[Role::Nurse])?;
    let patient_id = parse_id(&body.patient_id, "patient")?;

    let conn = ctx.conn()?;
    let patient = profile::get_profile(&conn, patient_id)?
        .ok_or_else(|| ApiError::NotFound("patient not found".into()))?;
    if patient.role != Role::Patient {
        return Err(ApiError::InvalidInput(
            "patient_id must reference a patient account".into(),
        ));
    }

    let now = Utc::now();
    let reading = Vital {
        id: Uuid::new_v4(),
        patient_id,
        nurse_id: user.id,
        blood_pressure: body.blood_pressure,
        heart_rate: body.heart_rate,
        temperature: body.temperature,
        weight: body.weight,
        height: body.height,
        notes: body.notes,
        created_at: now,
        updated_at: now,
    };
    vital::insert_vital(&conn, &reading)?;

    let view = vital::to_view(&conn, reading)?;
    Ok(Json(view))
}

/// `GET /api/vitals` — patients see their own readings, nurses the ones
/// they took, admins all.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<VitalView>>, ApiError> {
    let conn = ctx.conn()?;
    let filter = scope::vitals(user.role, user.id);
    Ok(Json(vital::list_views(&conn, &filter)?))
}

/// `GET /api/vitals/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<VitalView>, ApiError> {
    let vital_id = parse_id(&id, "vital")?;
    let conn = ctx.conn()?;
    let reading = vital::get_vital(&conn, vital_id)?
        .ok_or_else(|| ApiError::NotFound("vital not found".into()))?;

    let allowed = user.is_admin()
        || reading.patient_id == user.id
        || (user.role == Role::Nurse && reading.nurse_id == user.id);
    if !allowed {
        return Err(ApiError::AccessDenied);
    }

    let view = vital::to_view(&conn, reading)?;
    Ok(Json(view))
}
