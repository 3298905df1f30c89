//! Pharmacy requests — a prescription dispatched to a pharmacy, decided
//! by that pharmacy's pharmacist.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::{pharmacy, pharmacy_request};
use crate::models::enums::{PharmacyRequestStatus, Role};
use crate::models::{PharmacyRequest, PharmacyRequestView};
use crate::scope;

/// `GET /api/pharmacy-requests` — scoped by the caller's role.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<PharmacyRequestView>>, ApiError> {
    let conn = ctx.conn()?;
    let filter = scope::pharmacy_requests(&conn, user.role, user.id)?;
    Ok(Json(pharmacy_request::list_views(&conn, &filter)?))
}

fn check_access(
    conn: &rusqlite::Connection,
    user: &AuthedUser,
    req: &PharmacyRequest,
) -> Result<(), ApiError> {
    let allowed = match user.role {
        Role::Admin => true,
        Role::Patient => req.patient_id == user.id,
        Role::Pharmacist => {
            pharmacy::get_pharmacy(conn, req.pharmacy_id)?.and_then(|p| p.pharmacist_id)
                == Some(user.id)
        }
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(ApiError::AccessDenied)
    }
}

/// `GET /api/pharmacy-requests/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<PharmacyRequestView>, ApiError> {
    let request_id = parse_id(&id, "pharmacy request")?;
    let conn = ctx.conn()?;
    let req = pharmacy_request::get_request(&conn, request_id)?
        .ok_or_else(|| ApiError::NotFound("pharmacy request not found".into()))?;
    check_access(&conn, &user, &req)?;
    let view = pharmacy_request::to_view(&conn, req)?;
    Ok(Json(view))
}

#[derive(Deserialize)]
pub struct DecisionRequest {
    pub status: PharmacyRequestStatus,
    pub rejection_reason: Option<String>,
}

/// `PUT /api/pharmacy-requests/:id/decision` (the pharmacy's pharmacist
/// or admin)
///
/// `pending` -> `approved` | `rejected` (reason required);
/// `approved` -> `completed`.
pub async fn decide(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<PharmacyRequestView>, ApiError> {
    user.require_role(&[Role::Pharmacist, Role::Admin])?;
    let request_id = parse_id(&id, "pharmacy request")?;

    let conn = ctx.conn()?;
    let mut req = pharmacy_request::get_request(&conn, request_id)?
        .ok_or_else(|| ApiError::NotFound("pharmacy request not found".into()))?;
    check_access(&conn, &user, &req)?;

    let rejection_reason = match (req.status, body.status) {
        (PharmacyRequestStatus::Pending, PharmacyRequestStatus::Approved) => None,
        (PharmacyRequestStatus::Pending, PharmacyRequestStatus::Rejected) => {
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
        (PharmacyRequestStatus::Approved, PharmacyRequestStatus::Completed) => None,
        (current, requested) => {
            return Err(ApiError::InvalidState(format!(
                "cannot move a {} request to {}",
                current.as_str(),
                requested.as_str()
            )))
        }
    };

    let now = Utc::now();
    pharmacy_request::set_status(&conn, req.id, body.status, rejection_reason.as_deref(), now)?;
    req.status = body.status;
    req.rejection_reason = rejection_reason.or(req.rejection_reason);
    req.updated_at = now;

    let view = pharmacy_request::to_view(&conn, req)?;
    Ok(Json(view))
}
