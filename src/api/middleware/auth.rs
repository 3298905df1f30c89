//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it to a profile
//! and injects `AuthedUser` into request extensions for downstream
//! handlers. Every failure path — missing header, unknown or expired
//! token, deleted profile — is the same `Unauthenticated` answer.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::crypto::tokens::hash_token;
use crate::db::repository::{auth_token, profile};

pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Unexpected("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)?
        .to_string();

    let user = {
        let conn = ctx.conn()?;
        let user_id = auth_token::find_user_by_token(&conn, &hash_token(&token), Utc::now())?
            .ok_or(ApiError::Unauthenticated)?;
        // A valid token whose profile has since been deleted is just as
        // unauthenticated as no token at all.
        let profile =
            profile::get_profile(&conn, user_id)?.ok_or(ApiError::Unauthenticated)?;
        AuthedUser {
            id: profile.id,
            role: profile.role,
        }
    };

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
