//! Prescriptions. One clinical "prescribe" call fans out into one row
//! per medication item — all validated before any write, all written in
//! one transaction, or none at all. Assigning a pharmacy auto-creates
//! the pharmacy request, idempotently per (prescription, pharmacy).

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::{
    consultation, doctor, medication, pharmacy, pharmacy_request, prescription,
};
use crate::models::enums::{PharmacyRequestStatus, PrescriptionStatus, Role};
use crate::models::{PharmacyRequest, Prescription, PrescriptionView};
use crate::scope;

#[derive(Deserialize)]
pub struct PrescriptionItem {
    pub medication_id: String,
    pub quantity: i64,
    pub dosage: String,
    pub unit_price: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePrescriptionsRequest {
    pub consultation_id: String,
    pub items: Vec<PrescriptionItem>,
    pub signature_data: Option<String>,
}

#[derive(Serialize)]
pub struct CreatePrescriptionsResponse {
    pub prescriptions: Vec<Prescription>,
    pub count: usize,
    pub message: String,
}

/// `POST /api/prescriptions` (the consultation's doctor)
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<CreatePrescriptionsRequest>,
) -> Result<Json<CreatePrescriptionsResponse>, ApiError> {
    user.require_role(&[Role::Doctor])?;
    let consultation_id = parse_id(&body.consultation_id, "consultation")?;

    if body.items.is_empty() {
        return Err(ApiError::InvalidInput(
            "items must contain at least one medication".into(),
        ));
    }

    let mut conn = ctx.conn()?;
    let cons = consultation::get_consultation(&conn, consultation_id)?
        .ok_or_else(|| ApiError::NotFound("consultation not found".into()))?;
    let doc = doctor::get_doctor_by_user(&conn, user.id)?.ok_or(ApiError::AccessDenied)?;
    if doc.id != cons.doctor_id {
        return Err(ApiError::AccessDenied);
    }

    // Validate the whole batch before writing anything; the first
    // violation aborts it with the failing item index.
    let mut resolved = Vec::with_capacity(body.items.len());
    for (index, item) in body.items.iter().enumerate() {
        let med_id = Uuid::parse_str(&item.medication_id).map_err(|_| {
            ApiError::InvalidInput(format!("item {index}: invalid medication reference"))
        })?;
        let med = medication::get_medication(&conn, med_id)?.ok_or_else(|| {
            ApiError::InvalidInput(format!("item {index}: unknown medication"))
        })?;
        if item.quantity < 1 {
            return Err(ApiError::InvalidInput(format!(
                "item {index}: quantity must be a positive integer"
            )));
        }
        if item.dosage.trim().is_empty() {
            return Err(ApiError::InvalidInput(format!(
                "item {index}: dosage must not be blank"
            )));
        }
        resolved.push((item, med));
    }

    let now = Utc::now();
    let rows: Vec<Prescription> = resolved
        .into_iter()
        .map(|(item, med)| {
            let unit_price = item.unit_price.unwrap_or(med.unit_price);
            Prescription {
                id: Uuid::new_v4(),
                consultation_id,
                patient_id: cons.patient_id,
                doctor_id: cons.doctor_id,
                pharmacy_id: None,
                status: PrescriptionStatus::Pending,
                medication_id: Some(med.id),
                quantity: item.quantity,
                dosage: item.dosage.trim().to_string(),
                unit_price,
                total_price: unit_price * item.quantity as f64,
                notes: item.notes.clone(),
                signature_data: body.signature_data.clone(),
                created_at: now,
                updated_at: now,
            }
        })
        .collect();

    let tx = conn.transaction()?;
    for rx in &rows {
        prescription::insert_prescription(&tx, rx)?;
    }
    tx.commit()?;

    let count = rows.len();
    Ok(Json(CreatePrescriptionsResponse {
        prescriptions: rows,
        count,
        message: format!("{count} prescription(s) created"),
    }))
}

/// `GET /api/prescriptions` — scoped by the caller's role.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<PrescriptionView>>, ApiError> {
    let conn = ctx.conn()?;
    let filter = scope::prescriptions(&conn, user.role, user.id)?;
    Ok(Json(prescription::list_views(&conn, &filter)?))
}

fn check_prescription_access(
    conn: &rusqlite::Connection,
    user: &AuthedUser,
    rx: &Prescription,
) -> Result<(), ApiError> {
    let allowed = match user.role {
        Role::Admin => true,
        Role::Patient => rx.patient_id == user.id,
        Role::Doctor => {
            doctor::get_doctor_by_user(conn, user.id)?.map(|d| d.id) == Some(rx.doctor_id)
        }
        Role::Pharmacist => match rx.pharmacy_id {
            Some(pid) => {
                pharmacy::get_pharmacy(conn, pid)?.and_then(|p| p.pharmacist_id) == Some(user.id)
            }
            None => false,
        },
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(ApiError::AccessDenied)
    }
}

/// `GET /api/prescriptions/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<PrescriptionView>, ApiError> {
    let prescription_id = parse_id(&id, "prescription")?;
    let conn = ctx.conn()?;
    let rx = prescription::get_prescription(&conn, prescription_id)?
        .ok_or_else(|| ApiError::NotFound("prescription not found".into()))?;
    check_prescription_access(&conn, &user, &rx)?;
    let view = prescription::to_view(&conn, rx)?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct UpdatePrescriptionRequest {
    pub pharmacy_id: Option<String>,
    pub notes: Option<String>,
}

/// `PUT /api/prescriptions/:id` (patient, doctor or admin)
///
/// Assigning a pharmacy requires a resolved medication, and creates the
/// pharmacy request for the (prescription, pharmacy) pair unless one
/// already exists — repeating the same assignment never duplicates it.
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePrescriptionRequest>,
) -> Result<Json<PrescriptionView>, ApiError> {
    let prescription_id = parse_id(&id, "prescription")?;

    let mut conn = ctx.conn()?;
    let mut rx = prescription::get_prescription(&conn, prescription_id)?
        .ok_or_else(|| ApiError::NotFound("prescription not found".into()))?;

    let is_owner_doctor = user.role == Role::Doctor
        && doctor::get_doctor_by_user(&conn, user.id)?.map(|d| d.id) == Some(rx.doctor_id);
    if !(user.is_admin() || rx.patient_id == user.id || is_owner_doctor) {
        return Err(ApiError::AccessDenied);
    }

    let now = Utc::now();

    if let Some(raw) = body.pharmacy_id.as_deref() {
        let pharmacy_id = parse_id(raw, "pharmacy")?;
        if rx.medication_id.is_none() {
            return Err(ApiError::InvalidState(
                "prescription has no resolved medication and cannot be sent to a pharmacy".into(),
            ));
        }
        if pharmacy::get_pharmacy(&conn, pharmacy_id)?.is_none() {
            return Err(ApiError::NotFound("pharmacy not found".into()));
        }

        let tx = conn.transaction()?;
        prescription::assign_pharmacy(&tx, rx.id, pharmacy_id, body.notes.as_deref(), now)?;
        if pharmacy_request::find_by_pair(&tx, rx.id, pharmacy_id)?.is_none() {
            pharmacy_request::insert_request(
                &tx,
                &PharmacyRequest {
                    id: Uuid::new_v4(),
                    prescription_id: rx.id,
                    patient_id: rx.patient_id,
                    pharmacy_id,
                    status: PharmacyRequestStatus::Pending,
                    rejection_reason: None,
                    created_at: now,
                    updated_at: now,
                },
            )?;
        }
        tx.commit()?;

        rx.pharmacy_id = Some(pharmacy_id);
        if let Some(notes) = body.notes {
            rx.notes = Some(notes);
        }
        rx.updated_at = now;
    } else if let Some(notes) = body.notes {
        prescription::update_notes(&conn, rx.id, &notes, now)?;
        rx.notes = Some(notes);
        rx.updated_at = now;
    }

    let view = prescription::to_view(&conn, rx)?;
    Ok(Json(view))
}
