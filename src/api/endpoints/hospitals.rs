//! Hospital catalog. Mutation is admin-only; assigning `lab_user_id`
//! here is what grants a lab technician their visible request set.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{non_blank, parse_id, DeleteResponse};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::{hospital, profile};
use crate::models::enums::Role;
use crate::models::Hospital;

#[derive(Deserialize)]
pub struct HospitalRequest {
    pub name: String,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub consultation_fee: Option<f64>,
    pub lab_user_id: Option<String>,
}

fn resolve_lab_user(
    conn: &rusqlite::Connection,
    raw: Option<&str>,
) -> Result<Option<Uuid>, ApiError> {
    let Some(raw) = raw else { return Ok(None) };
    let user_id = parse_id(raw, "lab user")?;
    let account = profile::get_profile(conn, user_id)?
        .ok_or_else(|| ApiError::InvalidInput("unknown lab user".into()))?;
    if account.role != Role::LabTechnician {
        return Err(ApiError::InvalidInput(
            "lab_user_id must reference a lab technician account".into(),
        ));
    }
    Ok(Some(user_id))
}

/// `POST /api/hospitals` (admin)
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<HospitalRequest>,
) -> Result<Json<Hospital>, ApiError> {
    user.require_role(&[Role::Admin])?;
    non_blank(&body.name, "name")?;
    let fee = body.consultation_fee.unwrap_or(0.0);
    if fee < 0.0 {
        return Err(ApiError::InvalidInput(
            "consultation_fee must not be negative".into(),
        ));
    }

    let conn = ctx.conn()?;
    let lab_user_id = resolve_lab_user(&conn, body.lab_user_id.as_deref())?;

    let now = Utc::now();
    let hosp = Hospital {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        location: body.location,
        phone: body.phone,
        email: body.email,
        description: body.description,
        consultation_fee: fee,
        lab_user_id,
        created_at: now,
        updated_at: now,
    };
    hospital::insert_hospital(&conn, &hosp)?;
    Ok(Json(hosp))
}

/// `GET /api/hospitals`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
) -> Result<Json<Vec<Hospital>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(hospital::list_hospitals(&conn)?))
}

/// `GET /api/hospitals/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Hospital>, ApiError> {
    let hospital_id = parse_id(&id, "hospital")?;
    let conn = ctx.conn()?;
    let hosp = hospital::get_hospital(&conn, hospital_id)?
        .ok_or_else(|| ApiError::NotFound("hospital not found".into()))?;
    Ok(Json(hosp))
}

/// `PUT /api/hospitals/:id` (admin)
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<HospitalRequest>,
) -> Result<Json<Hospital>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let hospital_id = parse_id(&id, "hospital")?;
    non_blank(&body.name, "name")?;

    let conn = ctx.conn()?;
    let mut existing = hospital::get_hospital(&conn, hospital_id)?
        .ok_or_else(|| ApiError::NotFound("hospital not found".into()))?;

    existing.name = body.name.trim().to_string();
    existing.location = body.location.or(existing.location);
    existing.phone = body.phone.or(existing.phone);
    existing.email = body.email.or(existing.email);
    existing.description = body.description.or(existing.description);
    if let Some(fee) = body.consultation_fee {
        if fee < 0.0 {
            return Err(ApiError::InvalidInput(
                "consultation_fee must not be negative".into(),
            ));
        }
        existing.consultation_fee = fee;
    }
    if body.lab_user_id.is_some() {
        existing.lab_user_id = resolve_lab_user(&conn, body.lab_user_id.as_deref())?;
    }

    let now = Utc::now();
    hospital::update_hospital(&conn, &existing, now)?;
    existing.updated_at = now;
    Ok(Json(existing))
}

/// `DELETE /api/hospitals/:id` (admin)
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let hospital_id = parse_id(&id, "hospital")?;

    let conn = ctx.conn()?;
    if !hospital::delete_hospital(&conn, hospital_id)? {
        return Err(ApiError::NotFound("hospital not found".into()));
    }
    Ok(Json(DeleteResponse {
        message: "hospital deleted",
    }))
}
