//! Profile administration. Listing and deletion are admin-only;
//! reads and updates pass the ownership gate.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;

use super::{parse_id, DeleteResponse};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::{insurance, profile};
use crate::models::enums::Role;
use crate::models::{Profile, ProfileView};

/// `GET /api/profiles` (admin)
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let conn = ctx.conn()?;
    Ok(Json(profile::list_profiles(&conn)?))
}

/// `GET /api/profiles/:id` (self or admin)
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<ProfileView>, ApiError> {
    let profile_id = parse_id(&id, "profile")?;
    user.require_self_or_admin(profile_id)?;

    let conn = ctx.conn()?;
    let view = profile::get_profile_view(&conn, profile_id)?
        .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub insurance_id: Option<String>,
}

/// `PUT /api/profiles/:id` (self or admin)
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let profile_id = parse_id(&id, "profile")?;
    user.require_self_or_admin(profile_id)?;

    let conn = ctx.conn()?;
    let mut existing = profile::get_profile(&conn, profile_id)?
        .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;

    if let Some(name) = body.full_name {
        super::non_blank(&name, "full_name")?;
        existing.full_name = name.trim().to_string();
    }
    if let Some(phone) = body.phone {
        existing.phone = Some(phone);
    }
    if let Some(national_id) = body.national_id {
        existing.national_id = Some(national_id);
    }
    if let Some(raw) = body.insurance_id {
        let ins_id = parse_id(&raw, "insurance")?;
        if insurance::get_insurance(&conn, ins_id)?.is_none() {
            return Err(ApiError::InvalidInput("unknown insurance".into()));
        }
        existing.insurance_id = Some(ins_id);
    }

    let now = Utc::now();
    profile::update_profile(&conn, &existing, now)?;
    existing.updated_at = now;
    Ok(Json(existing))
}

/// `DELETE /api/profiles/:id` (admin)
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let profile_id = parse_id(&id, "profile")?;

    let conn = ctx.conn()?;
    if !profile::delete_profile(&conn, profile_id)? {
        return Err(ApiError::NotFound("profile not found".into()));
    }
    Ok(Json(DeleteResponse {
        message: "profile deleted",
    }))
}
