use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::uuid_col;
use crate::db::DatabaseError;

pub fn insert_token(
    conn: &Connection,
    token_hash: &str,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO auth_tokens (token_hash, user_id, expires_at, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![token_hash, user_id.to_string(), expires_at, now],
    )?;
    Ok(())
}

/// Resolve an unexpired token digest to its subject.
pub fn find_user_by_token(
    conn: &Connection,
    token_hash: &str,
    now: DateTime<Utc>,
) -> Result<Option<Uuid>, DatabaseError> {
    conn.query_row(
        "SELECT user_id FROM auth_tokens WHERE token_hash = ?1 AND expires_at > ?2",
        params![token_hash, now],
        |row| uuid_col(row, 0),
    )
    .optional()
    .map_err(Into::into)
}

pub fn delete_token(conn: &Connection, token_hash: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM auth_tokens WHERE token_hash = ?1",
        params![token_hash],
    )?;
    Ok(())
}

/// Lazy cleanup, run on login.
pub fn purge_expired(conn: &Connection, now: DateTime<Utc>) -> Result<usize, DatabaseError> {
    let purged = conn.execute(
        "DELETE FROM auth_tokens WHERE expires_at <= ?1",
        params![now],
    )?;
    Ok(purged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use chrono::Duration;

    #[test]
    fn token_resolves_until_expiry() {
        let conn = open_memory_database().unwrap();
        let user = Uuid::new_v4();
        let now = Utc::now();
        insert_token(&conn, "hash-1", user, now + Duration::days(7), now).unwrap();

        assert_eq!(find_user_by_token(&conn, "hash-1", now).unwrap(), Some(user));
        assert_eq!(
            find_user_by_token(&conn, "hash-1", now + Duration::days(8)).unwrap(),
            None
        );
    }

    #[test]
    fn unknown_token_resolves_to_none() {
        let conn = open_memory_database().unwrap();
        assert_eq!(
            find_user_by_token(&conn, "missing", Utc::now()).unwrap(),
            None
        );
    }

    #[test]
    fn purge_removes_only_expired() {
        let conn = open_memory_database().unwrap();
        let now = Utc::now();
        insert_token(&conn, "live", Uuid::new_v4(), now + Duration::days(1), now).unwrap();
        insert_token(&conn, "dead", Uuid::new_v4(), now - Duration::days(1), now).unwrap();

        assert_eq!(purge_expired(&conn, now).unwrap(), 1);
        assert!(find_user_by_token(&conn, "live", now).unwrap().is_some());
    }
}
