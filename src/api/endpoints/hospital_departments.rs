//! Hospital↔department links carrying the per-department consultation
//! fee. The (hospital, department) pair is unique.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_id, DeleteResponse};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::{department, hospital, hospital_department};
use crate::models::enums::Role;
use crate::models::{HospitalDepartment, HospitalDepartmentView};

#[derive(Deserialize)]
pub struct CreateLinkRequest {
    pub hospital_id: String,
    pub department_id: String,
    pub consultation_fee: Option<f64>,
}

/// `POST /api/hospital-departments` (admin)
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<CreateLinkRequest>,
) -> Result<Json<HospitalDepartmentView>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let hospital_id = parse_id(&body.hospital_id, "hospital")?;
    let department_id = parse_id(&body.department_id, "department")?;

    let conn = ctx.conn()?;
    if hospital::get_hospital(&conn, hospital_id)?.is_none() {
        return Err(ApiError::NotFound("hospital not found".into()));
    }
    if department::get_department(&conn, department_id)?.is_none() {
        return Err(ApiError::NotFound("department not found".into()));
    }

    let now = Utc::now();
    let link = HospitalDepartment {
        id: Uuid::new_v4(),
        hospital_id,
        department_id,
        consultation_fee: body.consultation_fee.unwrap_or(0.0),
        created_at: now,
        updated_at: now,
    };
    // Duplicate pair -> Conflict from the unique constraint.
    hospital_department::insert_hospital_department(&conn, &link)?;

    let view = hospital_department::to_view(&conn, link)?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub hospital_id: Option<String>,
}

/// `GET /api/hospital-departments`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<HospitalDepartmentView>>, ApiError> {
    let hospital_id = query
        .hospital_id
        .as_deref()
        .map(|raw| parse_id(raw, "hospital"))
        .transpose()?;

    let conn = ctx.conn()?;
    let links = hospital_department::list_hospital_departments(&conn, hospital_id)?;
    let views = links
        .into_iter()
        .map(|link| hospital_department::to_view(&conn, link))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

#[derive(Deserialize)]
pub struct UpdateFeeRequest {
    pub consultation_fee: f64,
}

/// `PUT /api/hospital-departments/:id` (admin)
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateFeeRequest>,
) -> Result<Json<HospitalDepartmentView>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let link_id = parse_id(&id, "hospital-department")?;
    if body.consultation_fee < 0.0 {
        return Err(ApiError::InvalidInput(
            "consultation_fee must not be negative".into(),
        ));
    }

    let conn = ctx.conn()?;
    let mut link = hospital_department::get_hospital_department(&conn, link_id)?
        .ok_or_else(|| ApiError::NotFound("hospital department not found".into()))?;

    let now = Utc::now();
    hospital_department::update_fee(&conn, link_id, body.consultation_fee, now)?;
    link.consultation_fee = body.consultation_fee;
    link.updated_at = now;

    let view = hospital_department::to_view(&conn, link)?;
    Ok(Json(view))
}

/// `DELETE /api/hospital-departments/:id` (admin)
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let link_id = parse_id(&id, "hospital-department")?;

    let conn = ctx.conn()?;
    if !hospital_department::delete_hospital_department(&conn, link_id)? {
        return Err(ApiError::NotFound("hospital department not found".into()));
    }
    Ok(Json(DeleteResponse {
        message: "hospital department deleted",
    }))
}
