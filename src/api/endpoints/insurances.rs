//! Insurance catalog. Reads are open to any authenticated role;
//! mutation is admin-only.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{non_blank, parse_id, DeleteResponse};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::insurance;
use crate::models::enums::Role;
use crate::models::Insurance;

fn check_coverage(pct: f64) -> Result<(), ApiError> {
    if !(0.0..=100.0).contains(&pct) {
        return Err(ApiError::InvalidInput(
            "coverage_percentage must be between 0 and 100".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize)]
pub struct InsuranceRequest {
    pub name: String,
    pub coverage_percentage: f64,
    pub description: Option<String>,
}

/// `POST /api/insurances` (admin)
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<InsuranceRequest>,
) -> Result<Json<Insurance>, ApiError> {
    user.require_role(&[Role::Admin])?;
    non_blank(&body.name, "name")?;
    check_coverage(body.coverage_percentage)?;

    let now = Utc::now();
    let ins = Insurance {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        coverage_percentage: body.coverage_percentage,
        description: body.description,
        created_at: now,
        updated_at: now,
    };

    let conn = ctx.conn()?;
    insurance::insert_insurance(&conn, &ins)?;
    Ok(Json(ins))
}

/// `GET /api/insurances`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
) -> Result<Json<Vec<Insurance>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(insurance::list_insurances(&conn)?))
}

/// `GET /api/insurances/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Insurance>, ApiError> {
    let ins_id = parse_id(&id, "insurance")?;
    let conn = ctx.conn()?;
    let ins = insurance::get_insurance(&conn, ins_id)?
        .ok_or_else(|| ApiError::NotFound("insurance not found".into()))?;
    Ok(Json(ins))
}

/// `PUT /api/insurances/:id` (admin)
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<InsuranceRequest>,
) -> Result<Json<Insurance>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let ins_id = parse_id(&id, "insurance")?;
    non_blank(&body.name, "name")?;
    check_coverage(body.coverage_percentage)?;

    let conn = ctx.conn()?;
    let mut existing = insurance::get_insurance(&conn, ins_id)?
        .ok_or_else(|| ApiError::NotFound("insurance not found".into()))?;

    existing.name = body.name.trim().to_string();
    existing.coverage_percentage = body.coverage_percentage;
    existing.description = body.description;

    let now = Utc::now();
    insurance::update_insurance(&conn, &existing, now)?;
    existing.updated_at = now;
    Ok(Json(existing))
}

/// `DELETE /api/insurances/:id` (admin)
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let ins_id = parse_id(&id, "insurance")?;

    let conn = ctx.conn()?;
    if !insurance::delete_insurance(&conn, ins_id)? {
        return Err(ApiError::NotFound("insurance not found".into()));
    }
    Ok(Json(DeleteResponse {
        message: "insurance deleted",
    }))
}
