//! Appointment booking and its status transitions.
//!
//! Only patients book, and only for themselves. The assigned doctor, a
//! nurse or an admin decides pending appointments; the owning patient
//! cancels. Booking and decisions each notify the other party in the
//! same transaction as the status write.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::{appointment, department, doctor, hospital, profile};
use crate::db::DatabaseError;
use crate::events::{dispatch, WorkflowEvent};
use crate::models::enums::{AppointmentStatus, Role};
use crate::models::{Appointment, AppointmentView};
use crate::scheduling;
use crate::scope;

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::InvalidInput("appointment_date must be YYYY-MM-DD".into()))
}

fn parse_time(raw: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ApiError::InvalidInput("appointment_time must be HH:MM:SS".into()))
}

#[derive(Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: String,
    pub hospital_id: String,
    pub department_id: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub reason: Option<String>,
}

/// `POST /api/appointments` (patient)
///
/// The caller is forced to be the patient of record; booking on behalf
/// of another patient is not possible.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<BookAppointmentRequest>,
) -> Result<Json<AppointmentView>, ApiError> {
    user.require_role(&[Role::Patient])?;
    let doctor_id = parse_id(&body.doctor_id, "doctor")?;
    let hospital_id = parse_id(&body.hospital_id, "hospital")?;
    let department_id = parse_id(&body.department_id, "department")?;
    let date = parse_date(&body.appointment_date)?;
    let time = parse_time(&body.appointment_time)?;

    let mut conn = ctx.conn()?;

    let doc = doctor::get_doctor(&conn, doctor_id)?
        .ok_or_else(|| ApiError::NotFound("doctor not found".into()))?;
    if hospital::get_hospital(&conn, hospital_id)?.is_none() {
        return Err(ApiError::NotFound("hospital not found".into()));
    }
    if department::get_department(&conn, department_id)?.is_none() {
        return Err(ApiError::NotFound("department not found".into()));
    }
    let patient = profile::get_profile(&conn, user.id)?
        .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;

    let now = Utc::now();
    let appt = Appointment {
        id: Uuid::new_v4(),
        patient_id: user.id,
        doctor_id,
        hospital_id,
        department_id,
        appointment_date: date,
        appointment_time: time,
        status: AppointmentStatus::Pending,
        reason: body.reason,
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    };

    let tx = conn.transaction()?;
    match appointment::insert_appointment(&tx, &appt) {
        Ok(()) => {}
        Err(DatabaseError::Conflict(_)) => {
            return Err(ApiError::Conflict(
                "this slot is already booked for the doctor".into(),
            ))
        }
        Err(other) => return Err(other.into()),
    }
    dispatch(
        &tx,
        &WorkflowEvent::AppointmentBooked {
            appointment_id: appt.id,
            doctor_user_id: doc.user_id,
            patient_name: patient.full_name.clone(),
            date,
            time,
        },
    )?;
    tx.commit()?;

    let view = appointment::to_view(&conn, appt)?;
    Ok(Json(view))
}

/// `GET /api/appointments` — scoped by the caller's role.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<AppointmentView>>, ApiError> {
    let conn = ctx.conn()?;
    let filter = scope::appointments(&conn, user.role, user.id)?;
    Ok(Json(appointment::list_views(&conn, &filter)?))
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub doctor_id: String,
    pub date: String,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub available_slots: Vec<String>,
}

/// `GET /api/appointments/slots?doctor_id=…&date=…`
pub async fn slots(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, ApiError> {
    let doctor_id = parse_id(&query.doctor_id, "doctor")?;
    let date = parse_date(&query.date)?;

    let conn = ctx.conn()?;
    if doctor::get_doctor(&conn, doctor_id)?.is_none() {
        return Err(ApiError::NotFound("doctor not found".into()));
    }
    let open = scheduling::available_slots(&conn, doctor_id, date)?;
    Ok(Json(SlotsResponse {
        doctor_id,
        date,
        available_slots: scheduling::format_slots(&open),
    }))
}

/// Can this caller see / act on this appointment?
fn check_appointment_access(
    conn: &rusqlite::Connection,
    user: &AuthedUser,
    appt: &Appointment,
    assigned_doctor_only: bool,
) -> Result<(), ApiError> {
    match user.role {
        Role::Admin | Role::Nurse => Ok(()),
        Role::Patient if !assigned_doctor_only && appt.patient_id == user.id => Ok(()),
        Role::Doctor => {
            let doc = doctor::get_doctor_by_user(conn, user.id)?;
            if doc.map(|d| d.id) == Some(appt.doctor_id) {
                Ok(())
            } else {
                Err(ApiError::AccessDenied)
            }
        }
        _ => Err(ApiError::AccessDenied),
    }
}

/// `GET /api/appointments/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentView>, ApiError> {
    let appointment_id = parse_id(&id, "appointment")?;
    let conn = ctx.conn()?;
    let appt = appointment::get_appointment(&conn, appointment_id)?
        .ok_or_else(|| ApiError::NotFound("appointment not found".into()))?;
    check_appointment_access(&conn, &user, &appt, false)?;
    let view = appointment::to_view(&conn, appt)?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct DecisionRequest {
    pub status: AppointmentStatus,
    pub rejection_reason: Option<String>,
}

/// `PUT /api/appointments/:id/decision` (assigned doctor, nurse, admin)
///
/// `pending` -> `approved` | `rejected`; rejection requires a reason.
/// The patient is notified in the same transaction.
pub async fn decide(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<AppointmentView>, ApiError> {
    user.require_role(&[Role::Doctor, Role::Nurse, Role::Admin])?;
    let appointment_id = parse_id(&id, "appointment")?;

    if !matches!(
        body.status,
        AppointmentStatus::Approved | AppointmentStatus::Rejected
    ) {
        return Err(ApiError::InvalidInput(
            "status must be approved or rejected".into(),
        ));
    }
    let rejection_reason = match body.status {
        AppointmentStatus::Rejected => {
            let reason = body
                .rejection_reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| {
                    ApiError::InvalidInput("rejection requires a rejection_reason".into())
                })?;
            Some(reason.to_string())
        }
        _ => None,
    };

    let mut conn = ctx.conn()?;
    let mut appt = appointment::get_appointment(&conn, appointment_id)?
        .ok_or_else(|| ApiError::NotFound("appointment not found".into()))?;
    check_appointment_access(&conn, &user, &appt, true)?;

    if appt.status != AppointmentStatus::Pending {
        return Err(ApiError::InvalidState(format!(
            "only pending appointments can be decided (current: {})",
            appt.status.as_str()
        )));
    }

    let now = Utc::now();
    let tx = conn.transaction()?;
    appointment::set_status(&tx, appt.id, body.status, rejection_reason.as_deref(), now)?;
    dispatch(
        &tx,
        &WorkflowEvent::AppointmentDecided {
            appointment_id: appt.id,
            patient_id: appt.patient_id,
            status: body.status,
            rejection_reason: rejection_reason.clone(),
        },
    )?;
    tx.commit()?;

    appt.status = body.status;
    appt.rejection_reason = rejection_reason.or(appt.rejection_reason);
    appt.updated_at = now;
    let view = appointment::to_view(&conn, appt)?;
    Ok(Json(view))
}

/// `PUT /api/appointments/:id/cancel` (owning patient)
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentView>, ApiError> {
    let appointment_id = parse_id(&id, "appointment")?;

    let conn = ctx.conn()?;
    let mut appt = appointment::get_appointment(&conn, appointment_id)?
        .ok_or_else(|| ApiError::NotFound("appointment not found".into()))?;
    user.require_self_or_admin(appt.patient_id)?;

    if !matches!(
        appt.status,
        AppointmentStatus::Pending | AppointmentStatus::Approved
    ) {
        return Err(ApiError::InvalidState(format!(
            "only pending or approved appointments can be cancelled (current: {})",
            appt.status.as_str()
        )));
    }

    let now = Utc::now();
    appointment::set_status(&conn, appt.id, AppointmentStatus::Cancelled, None, now)?;
    appt.status = AppointmentStatus::Cancelled;
    appt.updated_at = now;
    let view = appointment::to_view(&conn, appt)?;
    Ok(Json(view))
}
