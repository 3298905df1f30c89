//! Registration, login and session endpoints.

use std::sync::OnceLock;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Extension, Json};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, parse_id};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::crypto::password::{hash_password, verify_password};
use crate::crypto::tokens::{expiry_from, generate_token, hash_token};
use crate::db::repository::{auth_token, insurance, profile};
use crate::models::enums::Role;
use crate::models::{Profile, ProfileView};

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub insurance_id: Option<String>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub profile: Profile,
}

/// `POST /api/auth/register`
///
/// Stores a hash, never the plaintext. Administrator accounts come from
/// the bootstrap seed, not self-registration.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = body.email.trim().to_lowercase();
    if !email_regex().is_match(&email) {
        return Err(ApiError::InvalidInput("invalid email address".into()));
    }
    if body.password.len() < 8 {
        return Err(ApiError::InvalidInput(
            "password must be at least 8 characters".into(),
        ));
    }
    non_blank(&body.full_name, "full_name")?;

    let role = body.role.unwrap_or(Role::Patient);
    if role == Role::Admin {
        return Err(ApiError::InvalidInput(
            "administrator accounts cannot be self-registered".into(),
        ));
    }

    let insurance_id = body
        .insurance_id
        .as_deref()
        .map(|raw| parse_id(raw, "insurance"))
        .transpose()?;

    let password_hash =
        hash_password(&body.password).map_err(|e| ApiError::Unexpected(e.to_string()))?;

    let conn = ctx.conn()?;

    if profile::get_profile_by_email(&conn, &email)?.is_some() {
        return Err(ApiError::DuplicateUser);
    }
    if let Some(ins_id) = insurance_id {
        if insurance::get_insurance(&conn, ins_id)?.is_none() {
            return Err(ApiError::InvalidInput("unknown insurance".into()));
        }
    }

    let now = Utc::now();
    let new_profile = Profile {
        id: Uuid::new_v4(),
        email,
        password_hash,
        full_name: body.full_name.trim().to_string(),
        role,
        phone: body.phone,
        national_id: body.national_id,
        insurance_id,
        created_at: now,
        updated_at: now,
    };
    profile::insert_profile(&conn, &new_profile)?;

    let token = generate_token();
    auth_token::insert_token(&conn, &hash_token(&token), new_profile.id, expiry_from(now), now)?;

    tracing::info!(user = %new_profile.id, role = new_profile.role.as_str(), "registered");
    Ok(Json(AuthResponse {
        token,
        profile: new_profile,
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/login`
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = body.email.trim().to_lowercase();
    let conn = ctx.conn()?;

    let account =
        profile::get_profile_by_email(&conn, &email)?.ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&body.password, &account.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let now = Utc::now();
    auth_token::purge_expired(&conn, now)?;

    let token = generate_token();
    auth_token::insert_token(&conn, &hash_token(&token), account.id, expiry_from(now), now)?;

    Ok(Json(AuthResponse {
        token,
        profile: account,
    }))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

/// `POST /api/auth/logout` — revoke the presented token.
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(_user): Extension<AuthedUser>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, ApiError> {
    let token = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)?;

    let conn = ctx.conn()?;
    auth_token::delete_token(&conn, &hash_token(token))?;
    Ok(Json(LogoutResponse {
        message: "logged out",
    }))
}

/// `GET /api/auth/me` — the authenticated profile, insurance expanded.
pub async fn me(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<ProfileView>, ApiError> {
    let conn = ctx.conn()?;
    let view = profile::get_profile_view(&conn, user.id)?
        .ok_or_else(|| ApiError::NotFound("profile not found".into()))?;
    Ok(Json(view))
}
