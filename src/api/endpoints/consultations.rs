//! Consultations — one per appointment, recorded by the appointment's
//! doctor. Recording completes the appointment in the same transaction.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::{appointment, consultation, doctor};
use crate::db::DatabaseError;
use crate::models::enums::{AppointmentStatus, Role};
use crate::models::{Consultation, ConsultationView};
use crate::scope;

#[derive(Deserialize)]
pub struct CreateConsultationRequest {
    pub appointment_id: String,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub requires_lab_test: Option<bool>,
    pub requires_prescription: Option<bool>,
    pub consultation_date: Option<NaiveDate>,
}

/// `POST /api/consultations` (the appointment's doctor)
///
/// Patient and doctor references are copied from the appointment, never
/// taken from the caller.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<CreateConsultationRequest>,
) -> Result<Json<ConsultationView>, ApiError> {
    user.require_role(&[Role::Doctor])?;
    let appointment_id = parse_id(&body.appointment_id, "appointment")?;

    let mut conn = ctx.conn()?;
    let appt = appointment::get_appointment(&conn, appointment_id)?
        .ok_or_else(|| ApiError::NotFound("appointment not found".into()))?;

    let doc = doctor::get_doctor_by_user(&conn, user.id)?.ok_or(ApiError::AccessDenied)?;
    if doc.id != appt.doctor_id {
        return Err(ApiError::AccessDenied);
    }

    let now = Utc::now();
    let cons = Consultation {
        id: Uuid::new_v4(),
        appointment_id,
        patient_id: appt.patient_id,
        doctor_id: appt.doctor_id,
        diagnosis: body.diagnosis,
        notes: body.notes,
        requires_lab_test: body.requires_lab_test.unwrap_or(false),
        requires_prescription: body.requires_prescription.unwrap_or(false),
        consultation_date: body.consultation_date.unwrap_or_else(|| now.date_naive()),
        created_at: now,
        updated_at: now,
    };

    let tx = conn.transaction()?;
    match consultation::insert_consultation(&tx, &cons) {
        Ok(()) => {}
        Err(DatabaseError::Conflict(_)) => {
            return Err(ApiError::Conflict(
                "a consultation already exists for this appointment".into(),
            ))
        }
        Err(other) => return Err(other.into()),
    }
    appointment::set_status(&tx, appt.id, AppointmentStatus::Completed, None, now)?;
    tx.commit()?;

    let view = consultation::to_view(&conn, cons)?;
    Ok(Json(view))
}

/// `GET /api/consultations` — scoped by the caller's role.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<ConsultationView>>, ApiError> {
    let conn = ctx.conn()?;
    let filter = scope::consultations(&conn, user.role, user.id)?;
    Ok(Json(consultation::list_views(&conn, &filter)?))
}

/// `GET /api/consultations/:id` (patient, doctor, admin)
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<ConsultationView>, ApiError> {
    let consultation_id = parse_id(&id, "consultation")?;
    let conn = ctx.conn()?;
    let cons = consultation::get_consultation(&conn, consultation_id)?
        .ok_or_else(|| ApiError::NotFound("consultation not found".into()))?;

    let allowed = match user.role {
        Role::Admin => true,
        Role::Patient => cons.patient_id == user.id,
        Role::Doctor => {
            doctor::get_doctor_by_user(&conn, user.id)?.map(|d| d.id) == Some(cons.doctor_id)
        }
        _ => false,
    };
    if !allowed {
        return Err(ApiError::AccessDenied);
    }

    let view = consultation::to_view(&conn, cons)?;
    Ok(Json(view))
}
