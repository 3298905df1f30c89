//! Department catalog, admin-administered.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{non_blank, parse_id, DeleteResponse};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::department;
use crate::models::enums::Role;
use crate::models::Department;

#[derive(Deserialize)]
pub struct DepartmentRequest {
    pub name: String,
    pub description: Option<String>,
}

/// `POST /api/departments` (admin)
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<DepartmentRequest>,
) -> Result<Json<Department>, ApiError> {
    user.require_role(&[Role::Admin])?;
    non_blank(&body.name, "name")?;

    let now = Utc::now();
    let dept = Department {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        description: body.description,
        created_at: now,
        updated_at: now,
    };

    let conn = ctx.conn()?;
    department::insert_department(&conn, &dept)?;
    Ok(Json(dept))
}

/// `GET /api/departments`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
) -> Result<Json<Vec<Department>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(department::list_departments(&conn)?))
}

/// `GET /api/departments/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Department>, ApiError> {
    let dept_id = parse_id(&id, "department")?;
    let conn = ctx.conn()?;
    let dept = department::get_department(&conn, dept_id)?
        .ok_or_else(|| ApiError::NotFound("department not found".into()))?;
    Ok(Json(dept))
}

/// `PUT /api/departments/:id` (admin)
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<DepartmentRequest>,
) -> Result<Json<Department>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let dept_id = parse_id(&id, "department")?;
    non_blank(&body.name, "name")?;

    let conn = ctx.conn()?;
    let mut existing = department::get_department(&conn, dept_id)?
        .ok_or_else(|| ApiError::NotFound("department not found".into()))?;

    existing.name = body.name.trim().to_string();
    existing.description = body.description.or(existing.description);

    let now = Utc::now();
    department::update_department(&conn, &existing, now)?;
    existing.updated_at = now;
    Ok(Json(existing))
}

/// `DELETE /api/departments/:id` (admin)
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let dept_id = parse_id(&id, "department")?;

    let conn = ctx.conn()?;
    if !department::delete_department(&conn, dept_id)? {
        return Err(ApiError::NotFound("department not found".into()));
    }
    Ok(Json(DeleteResponse {
        message: "department deleted",
    }))
}
