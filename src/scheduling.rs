//! Appointment slot grid.
//!
//! The clinic day runs 08:00–18:00 on 10-minute boundaries (inclusive
//! start, exclusive end): 60 candidate slots. A booked slot blocks
//! exactly one marker, not a ranged interval. Only pending and approved
//! appointments block; rejected, cancelled and completed rows release
//! the slot.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::appointment;
use crate::db::DatabaseError;

const DAY_START_HOUR: u32 = 8;
const DAY_END_HOUR: u32 = 18;
const SLOT_MINUTES: u32 = 10;

/// Every candidate slot for one day, as `HH:MM:SS`, in order.
pub fn all_slots() -> Vec<NaiveTime> {
    let mut slots = Vec::with_capacity(60);
    for hour in DAY_START_HOUR..DAY_END_HOUR {
        let mut minute = 0;
        while minute < 60 {
            slots.push(NaiveTime::from_hms_opt(hour, minute, 0).expect("valid slot time"));
            minute += SLOT_MINUTES;
        }
    }
    slots
}

/// Candidate slots minus the doctor's blocking bookings on that date.
///
/// The read-then-book race is accepted: the unique index on
/// (doctor, date, time) is the actual double-booking guard, and a lost
/// race surfaces as a Conflict at booking time.
pub fn available_slots(
    conn: &Connection,
    doctor_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<NaiveTime>, DatabaseError> {
    let taken = appointment::blocking_times(conn, doctor_id, date)?;
    Ok(all_slots()
        .into_iter()
        .filter(|slot| !taken.contains(slot))
        .collect())
}

/// Render a slot list in the wire format (`HH:MM:SS`).
pub fn format_slots(slots: &[NaiveTime]) -> Vec<String> {
    slots
        .iter()
        .map(|t| t.format("%H:%M:%S").to_string())
        .collect()
}
