//! Payment recording.
//!
//! The amount is caller-supplied and deliberately not cross-checked
//! against the referenced consultation/lab-test/medication price (a
//! preserved trust gap in the upstream design). There is no gateway:
//! creation records the payment as completed.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::billing;
use crate::db::repository::{insurance, payment, profile};
use crate::models::enums::{PaymentStatus, PaymentType, Role};
use crate::models::Payment;
use crate::scope;

#[derive(Deserialize)]
pub struct CreatePaymentRequest {
    pub payment_type: PaymentType,
    pub reference_id: String,
    pub amount: f64,
    pub payment_method: Option<String>,
}

/// `POST /api/payments` (patient)
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<CreatePaymentRequest>,
) -> Result<Json<Payment>, ApiError> {
    user.require_role(&[Role::Patient])?;
    let reference_id = parse_id(&body.reference_id, "reference")?;
    if body.amount <= 0.0 {
        return Err(ApiError::InvalidInput("amount must be positive".into()));
    }

    let conn = ctx.conn()?;
    let patient = profile::get_profile(&conn, user.id)?
        .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;

    let coverage_pct = match patient.insurance_id {
        Some(ins_id) => insurance::get_insurance(&conn, ins_id)?.map(|i| i.coverage_percentage),
        None => None,
    };
    let (insurance_coverage, patient_pays) = billing::split_amount(body.amount, coverage_pct);

    let now = Utc::now();
    let record = Payment {
        id: Uuid::new_v4(),
        patient_id: user.id,
        payment_type: body.payment_type,
        reference_id,
        amount: body.amount,
        insurance_coverage,
        patient_pays,
        status: PaymentStatus::Completed,
        payment_method: body.payment_method,
        transaction_id: Some(Uuid::new_v4().to_string()),
        created_at: now,
        updated_at: now,
    };
    payment::insert_payment(&conn, &record)?;
    Ok(Json(record))
}

/// `GET /api/payments` — patients their own, admins all.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let conn = ctx.conn()?;
    let filter = scope::payments(user.role, user.id);
    Ok(Json(payment::list_payments(&conn, &filter)?))
}

/// `GET /api/payments/:id` (owner or admin)
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Payment>, ApiError> {
    let payment_id = parse_id(&id, "payment")?;
    let conn = ctx.conn()?;
    let record = payment::get_payment(&conn, payment_id)?
        .ok_or_else(|| ApiError::NotFound("payment not found".into()))?;
    user.require_self_or_admin(record.patient_id)?;
    Ok(Json(record))
}
