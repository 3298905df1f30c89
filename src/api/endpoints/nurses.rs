//! Nurse role profiles, admin-administered.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{non_blank, parse_id, DeleteResponse};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::{nurse, profile};
use crate::models::enums::Role;
use crate::models::{Nurse, NurseView};

#[derive(Deserialize)]
pub struct CreateNurseRequest {
    pub user_id: String,
    pub license_number: String,
}

/// `POST /api/nurses` (admin)
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<CreateNurseRequest>,
) -> Result<Json<NurseView>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let user_id = parse_id(&body.user_id, "user")?;
    non_blank(&body.license_number, "license_number")?;

    let conn = ctx.conn()?;
    let account = profile::get_profile(&conn, user_id)?
        .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;
    if account.role != Role::Nurse {
        return Err(ApiError::InvalidInput(
            "user_id must reference a nurse account".into(),
        ));
    }

    let now = Utc::now();
    let nurse_row = Nurse {
        id: Uuid::new_v4(),
        user_id,
        license_number: body.license_number.trim().to_string(),
        created_at: now,
        updated_at: now,
    };
    nurse::insert_nurse(&conn, &nurse_row)?;

    let view = nurse::to_view(&conn, nurse_row)?;
    Ok(Json(view))
}

/// `GET /api/nurses`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
) -> Result<Json<Vec<NurseView>>, ApiError> {
    let conn = ctx.conn()?;
    let nurses = nurse::list_nurses(&conn)?;
    let views = nurses
        .into_iter()
        .map(|n| nurse::to_view(&conn, n))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

/// `GET /api/nurses/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<NurseView>, ApiError> {
    let nurse_id = parse_id(&id, "nurse")?;
    let conn = ctx.conn()?;
    let nurse_row = nurse::get_nurse(&conn, nurse_id)?
        .ok_or_else(|| ApiError::NotFound("nurse not found".into()))?;
    let view = nurse::to_view(&conn, nurse_row)?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct UpdateNurseRequest {
    pub license_number: String,
}

/// `PUT /api/nurses/:id` (the nurse themselves, or admin)
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateNurseRequest>,
) -> Result<Json<NurseView>, ApiError> {
    let nurse_id = parse_id(&id, "nurse")?;
    non_blank(&body.license_number, "license_number")?;

    let conn = ctx.conn()?;
    let mut nurse_row = nurse::get_nurse(&conn, nurse_id)?
        .ok_or_else(|| ApiError::NotFound("nurse not found".into()))?;
    user.require_self_or_admin(nurse_row.user_id)?;

    nurse_row.license_number = body.license_number.trim().to_string();
    let now = Utc::now();
    nurse::update_nurse(&conn, &nurse_row, now)?;
    nurse_row.updated_at = now;

    let view = nurse::to_view(&conn, nurse_row)?;
    Ok(Json(view))
}

/// `DELETE /api/nurses/:id` (admin)
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let nurse_id = parse_id(&id, "nurse")?;

    let conn = ctx.conn()?;
    if !nurse::delete_nurse(&conn, nurse_id)? {
        return Err(ApiError::NotFound("nurse not found".into()));
    }
    Ok(Json(DeleteResponse {
        message: "nurse deleted",
    }))
}
