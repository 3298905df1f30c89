use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{uuid_col, uuid_col_opt};
use crate::db::DatabaseError;
use crate::models::Notification;

const COLS: &str = "id, user_id, title, message, kind, reference_id, is_read, \
                    created_at, updated_at";

fn read_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        title: row.get(2)?,
        message: row.get(3)?,
        kind: row.get(4)?,
        reference_id: uuid_col_opt(row, 5)?,
        is_read: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn insert_notification(conn: &Connection, note: &Notification) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (id, user_id, title, message, kind, reference_id, is_read,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            note.id.to_string(),
            note.user_id.to_string(),
            note.title,
            note.message,
            note.kind,
            note.reference_id.map(|id| id.to_string()),
            note.is_read,
            note.created_at,
            note.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_notification(
    conn: &Connection,
    id: Uuid,
) -> Result<Option<Notification>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM notifications WHERE id = ?1"),
        params![id.to_string()],
        read_notification,
    )
    .optional()
    .map_err(Into::into)
}

/// A user's inbox, newest first.
pub fn list_for_user(
    conn: &Connection,
    user_id: Uuid,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLS} FROM notifications WHERE user_id = ?1 ORDER BY created_at DESC"
    ))?;
    let rows = stmt.query_map(params![user_id.to_string()], read_notification)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

pub fn unread_count(conn: &Connection, user_id: Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
        params![user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn mark_read(conn: &Connection, id: Uuid, now: DateTime<Utc>) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE notifications SET is_read = 1, updated_at = ?2 WHERE id = ?1",
        params![id.to_string(), now],
    )?;
    Ok(())
}

pub fn mark_all_read(
    conn: &Connection,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<usize, DatabaseError> {
    let affected = conn.execute(
        "UPDATE notifications SET is_read = 1, updated_at = ?2 WHERE user_id = ?1 AND is_read = 0",
        params![user_id.to_string(), now],
    )?;
    Ok(affected)
}
