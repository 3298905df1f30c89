//! Shared types for the API layer.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::models::enums::Role;

/// Shared context for all routes and middleware.
///
/// The store is one SQLite file behind a mutex; handlers hold the guard
/// only across synchronous repository calls, never across awaits.
#[derive(Clone)]
pub struct ApiContext {
    db: Arc<Mutex<Connection>>,
}

impl ApiContext {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Unexpected("database lock poisoned".into()))
    }
}

/// Authenticated caller, injected into request extensions by the auth
/// middleware after the bearer token resolves to a live profile.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Role gate: the operation is only for these roles.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::AccessDenied)
        }
    }

    /// Ownership gate: the record's owner, or an admin.
    pub fn require_self_or_admin(&self, owner: Uuid) -> Result<(), ApiError> {
        if self.id == owner || self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::AccessDenied)
        }
    }
}
