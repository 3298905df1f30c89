//! Pharmacy catalog. Admin-administered; assigning `pharmacist_id` is
//! what grants a pharmacist their visible prescriptions and requests.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{non_blank, parse_id, DeleteResponse};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::{pharmacy, profile};
use crate::models::enums::Role;
use crate::models::Pharmacy;

#[derive(Deserialize)]
pub struct PharmacyRequestBody {
    pub name: String,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub pharmacist_id: Option<String>,
}

fn resolve_pharmacist(
    conn: &rusqlite::Connection,
    raw: Option<&str>,
) -> Result<Option<Uuid>, ApiError> {
    let Some(raw) = raw else { return Ok(None) };
    let user_id = parse_id(raw, "pharmacist")?;
    let account = profile::get_profile(conn, user_id)?
        .ok_or_else(|| ApiError::InvalidInput("unknown pharmacist".into()))?;
    if account.role != Role::Pharmacist {
        return Err(ApiError::InvalidInput(
            "pharmacist_id must reference a pharmacist account".into(),
        ));
    }
    Ok(Some(user_id))
}

/// `POST /api/pharmacies` (admin)
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<PharmacyRequestBody>,
) -> Result<Json<Pharmacy>, ApiError> {
    user.require_role(&[Role::Admin])?;
    non_blank(&body.name, "name")?;

    let conn = ctx.conn()?;
    let pharmacist_id = resolve_pharmacist(&conn, body.pharmacist_id.as_deref())?;

    let now = Utc::now();
    let pharm = Pharmacy {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        location: body.location,
        phone: body.phone,
        email: body.email,
        latitude: body.latitude,
        longitude: body.longitude,
        pharmacist_id,
        created_at: now,
        updated_at: now,
    };
    pharmacy::insert_pharmacy(&conn, &pharm)?;
    Ok(Json(pharm))
}

/// `GET /api/pharmacies`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
) -> Result<Json<Vec<Pharmacy>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(pharmacy::list_pharmacies(&conn)?))
}

/// `GET /api/pharmacies/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Pharmacy>, ApiError> {
    let pharmacy_id = parse_id(&id, "pharmacy")?;
    let conn = ctx.conn()?;
    let pharm = pharmacy::get_pharmacy(&conn, pharmacy_id)?
        .ok_or_else(|| ApiError::NotFound("pharmacy not found".into()))?;
    Ok(Json(pharm))
}

/// `PUT /api/pharmacies/:id` (admin, or the assigned pharmacist)
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<PharmacyRequestBody>,
) -> Result<Json<Pharmacy>, ApiError> {
    let pharmacy_id = parse_id(&id, "pharmacy")?;
    non_blank(&body.name, "name")?;

    let conn = ctx.conn()?;
    let mut existing = pharmacy::get_pharmacy(&conn, pharmacy_id)?
        .ok_or_else(|| ApiError::NotFound("pharmacy not found".into()))?;
    match existing.pharmacist_id {
        Some(owner) => user.require_self_or_admin(owner)?,
        None => user.require_role(&[Role::Admin])?,
    }
    // Reassigning the pharmacist stays an admin decision.
    if body.pharmacist_id.is_some() {
        user.require_role(&[Role::Admin])?;
        existing.pharmacist_id = resolve_pharmacist(&conn, body.pharmacist_id.as_deref())?;
    }

    existing.name = body.name.trim().to_string();
    existing.location = body.location.or(existing.location);
    existing.phone = body.phone.or(existing.phone);
    existing.email = body.email.or(existing.email);
    existing.latitude = body.latitude.or(existing.latitude);
    existing.longitude = body.longitude.or(existing.longitude);

    let now = Utc::now();
    pharmacy::update_pharmacy(&conn, &existing, now)?;
    existing.updated_at = now;
    Ok(Json(existing))
}

/// `DELETE /api/pharmacies/:id` (admin)
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let pharmacy_id = parse_id(&id, "pharmacy")?;

    let conn = ctx.conn()?;
    if !pharmacy::delete_pharmacy(&conn, pharmacy_id)? {
        return Err(ApiError::NotFound("pharmacy not found".into()));
    }
    Ok(Json(DeleteResponse {
        message: "pharmacy deleted",
    }))
}
