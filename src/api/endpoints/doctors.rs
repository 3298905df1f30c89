//! Doctor role profiles. Created by admins against an existing
//! doctor-role account; the doctor may update their own entry.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{non_blank, parse_id, DeleteResponse};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::{department, doctor, hospital, profile};
use crate::models::enums::Role;
use crate::models::{Doctor, DoctorView};

#[derive(Deserialize)]
pub struct CreateDoctorRequest {
    pub user_id: String,
    pub hospital_id: Option<String>,
    pub department_id: Option<String>,
    pub specialization: Option<String>,
    pub license_number: String,
    pub consultation_fee: Option<f64>,
    pub signature_data: Option<String>,
}

/// `POST /api/doctors` (admin)
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<CreateDoctorRequest>,
) -> Result<Json<DoctorView>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let user_id = parse_id(&body.user_id, "user")?;
    non_blank(&body.license_number, "license_number")?;

    let conn = ctx.conn()?;
    let account = profile::get_profile(&conn, user_id)?
        .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;
    if account.role != Role::Doctor {
        return Err(ApiError::InvalidInput(
            "user_id must reference a doctor account".into(),
        ));
    }

    let hospital_id = body
        .hospital_id
        .as_deref()
        .map(|raw| parse_id(raw, "hospital"))
        .transpose()?;
    if let Some(hid) = hospital_id {
        if hospital::get_hospital(&conn, hid)?.is_none() {
            return Err(ApiError::NotFound("hospital not found".into()));
        }
    }
    let department_id = body
        .department_id
        .as_deref()
        .map(|raw| parse_id(raw, "department"))
        .transpose()?;
    if let Some(did) = department_id {
        if department::get_department(&conn, did)?.is_none() {
            return Err(ApiError::NotFound("department not found".into()));
        }
    }

    let now = Utc::now();
    let doc = Doctor {
        id: Uuid::new_v4(),
        user_id,
        hospital_id,
        department_id,
        specialization: body.specialization,
        license_number: body.license_number.trim().to_string(),
        consultation_fee: body.consultation_fee.unwrap_or(0.0),
        signature_data: body.signature_data,
        created_at: now,
        updated_at: now,
    };
    // One doctor per user and unique license numbers -> Conflict.
    doctor::insert_doctor(&conn, &doc)?;

    let view = doctor::to_view(&conn, doc)?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub hospital_id: Option<String>,
    pub department_id: Option<String>,
}

/// `GET /api/doctors`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DoctorView>>, ApiError> {
    let hospital_id = query
        .hospital_id
        .as_deref()
        .map(|raw| parse_id(raw, "hospital"))
        .transpose()?;
    let department_id = query
        .department_id
        .as_deref()
        .map(|raw| parse_id(raw, "department"))
        .transpose()?;

    let conn = ctx.conn()?;
    let doctors = doctor::list_doctors(&conn, hospital_id, department_id)?;
    let views = doctors
        .into_iter()
        .map(|doc| doctor::to_view(&conn, doc))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

/// `GET /api/doctors/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<DoctorView>, ApiError> {
    let doctor_id = parse_id(&id, "doctor")?;
    let conn = ctx.conn()?;
    let doc = doctor::get_doctor(&conn, doctor_id)?
        .ok_or_else(|| ApiError::NotFound("doctor not found".into()))?;
    let view = doctor::to_view(&conn, doc)?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct UpdateDoctorRequest {
    pub hospital_id: Option<String>,
    pub department_id: Option<String>,
    pub specialization: Option<String>,
    pub consultation_fee: Option<f64>,
    pub signature_data: Option<String>,
}

/// `PUT /api/doctors/:id` (the doctor themselves, or admin)
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateDoctorRequest>,
) -> Result<Json<DoctorView>, ApiError> {
    let doctor_id = parse_id(&id, "doctor")?;

    let conn = ctx.conn()?;
    let mut doc = doctor::get_doctor(&conn, doctor_id)?
        .ok_or_else(|| ApiError::NotFound("doctor not found".into()))?;
    user.require_self_or_admin(doc.user_id)?;

    if let Some(raw) = body.hospital_id {
        let hid = parse_id(&raw, "hospital")?;
        if hospital::get_hospital(&conn, hid)?.is_none() {
            return Err(ApiError::NotFound("hospital not found".into()));
        }
        doc.hospital_id = Some(hid);
    }
    if let Some(raw) = body.department_id {
        let did = parse_id(&raw, "department")?;
        if department::get_department(&conn, did)?.is_none() {
            return Err(ApiError::NotFound("department not found".into()));
        }
        doc.department_id = Some(did);
    }
    if let Some(spec) = body.specialization {
        doc.specialization = Some(spec);
    }
    if let Some(fee) = body.consultation_fee {
        if fee < 0.0 {
            return Err(ApiError::InvalidInput(
                "consultation_fee must not be negative".into(),
            ));
        }
        doc.consultation_fee = fee;
    }
    if let Some(sig) = body.signature_data {
        doc.signature_data = Some(sig);
    }

    let now = Utc::now();
    doctor::update_doctor(&conn, &doc, now)?;
    doc.updated_at = now;

    let view = doctor::to_view(&conn, doc)?;
    Ok(Json(view))
}

/// `DELETE /api/doctors/:id` (admin)
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let doctor_id = parse_id(&id, "doctor")?;

    let conn = ctx.conn()?;
    if !doctor::delete_doctor(&conn, doctor_id)? {
        return Err(ApiError::NotFound("doctor not found".into()));
    }
    Ok(Json(DeleteResponse {
        message: "doctor deleted",
    }))
}
