//! Medication catalog. Admins and pharmacists maintain it; everyone
//! authenticated can read it.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{non_blank, parse_id, DeleteResponse};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::medication;
use crate::models::enums::Role;
use crate::models::Medication;

#[derive(Deserialize)]
pub struct MedicationRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<f64>,
    pub stock_quantity: Option<i64>,
    pub requires_prescription: Option<bool>,
}

/// `POST /api/medications` (admin or pharmacist)
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<MedicationRequest>,
) -> Result<Json<Medication>, ApiError> {
    user.require_role(&[Role::Admin, Role::Pharmacist])?;
    non_blank(&body.name, "name")?;
    let unit_price = body.unit_price.unwrap_or(0.0);
    if unit_price < 0.0 {
        return Err(ApiError::InvalidInput(
            "unit_price must not be negative".into(),
        ));
    }

    let now = Utc::now();
    let med = Medication {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        description: body.description,
        category: body.category,
        unit_price,
        stock_quantity: body.stock_quantity.unwrap_or(0),
        requires_prescription: body.requires_prescription.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    let conn = ctx.conn()?;
    // Medication names are unique -> Conflict on duplicates.
    medication::insert_medication(&conn, &med)?;
    Ok(Json(med))
}

/// `GET /api/medications`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
) -> Result<Json<Vec<Medication>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(medication::list_medications(&conn)?))
}

/// `GET /api/medications/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Medication>, ApiError> {
    let med_id = parse_id(&id, "medication")?;
    let conn = ctx.conn()?;
    let med = medication::get_medication(&conn, med_id)?
        .ok_or_else(|| ApiError::NotFound("medication not found".into()))?;
    Ok(Json(med))
}

/// `PUT /api/medications/:id` (admin or pharmacist)
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<MedicationRequest>,
) -> Result<Json<Medication>, ApiError> {
    user.require_role(&[Role::Admin, Role::Pharmacist])?;
    let med_id = parse_id(&id, "medication")?;
    non_blank(&body.name, "name")?;

    let conn = ctx.conn()?;
    let mut existing = medication::get_medication(&conn, med_id)?
        .ok_or_else(|| ApiError::NotFound("medication not found".into()))?;

    existing.name = body.name.trim().to_string();
    existing.description = body.description.or(existing.description);
    existing.category = body.category.or(existing.category);
    if let Some(price) = body.unit_price {
        if price < 0.0 {
            return Err(ApiError::InvalidInput(
                "unit_price must not be negative".into(),
            ));
        }
        existing.unit_price = price;
    }
    if let Some(stock) = body.stock_quantity {
        existing.stock_quantity = stock;
    }
    if let Some(rx_only) = body.requires_prescription {
        existing.requires_prescription = rx_only;
    }

    let now = Utc::now();
    medication::update_medication(&conn, &existing, now)?;
    existing.updated_at = now;
    Ok(Json(existing))
}

/// `DELETE /api/medications/:id` (admin)
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    user.require_role(&[Role::Admin])?;
    let med_id = parse_id(&id, "medication")?;

    let conn = ctx.conn()?;
    if !medication::delete_medication(&conn, med_id)? {
        return Err(ApiError::NotFound("medication not found".into()));
    }
    Ok(Json(DeleteResponse {
        message: "medication deleted",
    }))
}
