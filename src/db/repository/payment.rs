use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{enum_col, uuid_col};
use crate::db::DatabaseError;
use crate::models::Payment;
use crate::scope::ScopeFilter;

const COLS: &str = "id, patient_id, payment_type, reference_id, amount, insurance_coverage, \
                    patient_pays, status, payment_method, transaction_id, created_at, updated_at";

fn read_payment(row: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: uuid_col(row, 0)?,
        patient_id: uuid_col(row, 1)?,
        payment_type: enum_col(row, 2)?,
        reference_id: uuid_col(row, 3)?,
        amount: row.get(4)?,
        insurance_coverage: row.get(5)?,
        patient_pays: row.get(6)?,
        status: enum_col(row, 7)?,
        payment_method: row.get(8)?,
        transaction_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

pub fn insert_payment(conn: &Connection, payment: &Payment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO payments (id, patient_id, payment_type, reference_id, amount,
         insurance_coverage, patient_pays, status, payment_method, transaction_id,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            payment.id.to_string(),
            payment.patient_id.to_string(),
            payment.payment_type.as_str(),
            payment.reference_id.to_string(),
            payment.amount,
            payment.insurance_coverage,
            payment.patient_pays,
            payment.status.as_str(),
            payment.payment_method,
            payment.transaction_id,
            payment.created_at,
            payment.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_payment(conn: &Connection, id: Uuid) -> Result<Option<Payment>, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLS} FROM payments WHERE id = ?1"),
        params![id.to_string()],
        read_payment,
    )
    .optional()
    .map_err(Into::into)
}

pub fn list_payments(
    conn: &Connection,
    scope: &ScopeFilter,
) -> Result<Vec<Payment>, DatabaseError> {
    let sql = format!(
        "SELECT {COLS} FROM payments WHERE {} ORDER BY created_at DESC",
        scope.clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(scope.params.iter()), read_payment)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}
