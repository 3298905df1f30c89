//! Workflow events and their notification fan-out.
//!
//! Transitions that owe someone an inbox row emit an event; `dispatch`
//! writes the Notification inside the caller's transaction, so the
//! triggering write and its side effect commit (or roll back) together.

use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::notification;
use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::Notification;

#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// A patient booked a slot; the doctor's account is notified.
    AppointmentBooked {
        appointment_id: Uuid,
        doctor_user_id: Uuid,
        patient_name: String,
        date: NaiveDate,
        time: NaiveTime,
    },
    /// The doctor (or a nurse/admin) decided a pending appointment;
    /// the patient is notified.
    AppointmentDecided {
        appointment_id: Uuid,
        patient_id: Uuid,
        status: AppointmentStatus,
        rejection_reason: Option<String>,
    },
}

/// Write the inbox row for one event. Exactly one Notification per
/// event.
pub fn dispatch(conn: &Connection, event: &WorkflowEvent) -> Result<(), DatabaseError> {
    let (user_id, title, message, kind, reference_id) = match event {
        WorkflowEvent::AppointmentBooked {
            appointment_id,
            doctor_user_id,
            patient_name,
            date,
            time,
        } => (
            *doctor_user_id,
            "New appointment request".to_string(),
            format!(
                "{patient_name} requested an appointment on {date} at {}",
                time.format("%H:%M")
            ),
            "appointment_booked".to_string(),
            Some(*appointment_id),
        ),
        WorkflowEvent::AppointmentDecided {
            appointment_id,
            patient_id,
            status,
            rejection_reason,
        } => {
            let (title, message) = match status {
                AppointmentStatus::Approved => (
                    "Appointment approved".to_string(),
                    "Your appointment has been approved".to_string(),
                ),
                _ => (
                    "Appointment rejected".to_string(),
                    match rejection_reason {
                        Some(reason) => format!("Your appointment was rejected: {reason}"),
                        None => "Your appointment was rejected".to_string(),
                    },
                ),
            };
            (
                *patient_id,
                title,
                message,
                format!("appointment_{}", status.as_str()),
                Some(*appointment_id),
            )
        }
    };

    let now = Utc::now();
    notification::insert_notification(
        conn,
        &Notification {
            id: Uuid::new_v4(),
            user_id,
            title,
            message,
            kind,
            reference_id,
            is_read: false,
            created_at: now,
            updated_at: now,
        },
    )
}
