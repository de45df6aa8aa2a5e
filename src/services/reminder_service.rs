//! Appointment reminder mails.
//!
//! The reminder endpoint collects the appointments starting within the next
//! 24 hours that have not been reminded yet, answers immediately, and hands
//! the list to [`deliver_reminders`] on a background task.
//!
//! Appointments stay claimed in [`ReminderClaims`] until their delivery
//! attempt is over, so overlapping triggers in one process never mail the
//! same appointment twice. Claims are not shared between processes; running
//! several replicas against one database can still duplicate a reminder.

use std::{collections::HashSet, sync::Arc};

use chrono::{Duration, NaiveDateTime};
use tokio::sync::Mutex;

use crate::{
    error::AppError, models::appointment::DueAppointment, services::mail_service::Mailer,
    store::Store,
};

pub const REMINDER_SUBJECT: &str = "Appointment Reminder";

/// How far ahead of `now` appointments are reminded.
pub fn reminder_window() -> Duration {
    Duration::hours(24)
}

/// Appointments starting in `[now, now + 24h)` without a reminder.
pub async fn collect_due(
    store: &dyn Store,
    now: NaiveDateTime,
) -> Result<Vec<DueAppointment>, AppError> {
    store.appointments_due(now, now + reminder_window()).await
}

/// Appointment ids owned by a delivery run that has not finished yet.
#[derive(Debug, Clone, Default)]
pub struct ReminderClaims {
    in_flight: Arc<Mutex<HashSet<i64>>>,
}

impl ReminderClaims {
    /// Collect the due appointments and claim those no other run owns.
    ///
    /// Selection and claiming happen under one lock, and a claim is only
    /// released after the appointment is flagged, so a later run either sees
    /// the claim or the flag.
    pub async fn claim_due(
        &self,
        store: &dyn Store,
        now: NaiveDateTime,
    ) -> Result<Vec<DueAppointment>, AppError> {
        let mut in_flight = self.in_flight.lock().await;
        let due = collect_due(store, now).await?;
        let total = due.len();

        let claimed: Vec<_> = due.into_iter().filter(|a| in_flight.insert(a.id)).collect();
        if claimed.len() < total {
            tracing::info!(
                skipped = total - claimed.len(),
                "appointments already being reminded"
            );
        }
        Ok(claimed)
    }

    async fn release(&self, appointment_id: i64) {
        self.in_flight.lock().await.remove(&appointment_id);
    }

    /// Number of appointments currently claimed.
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

/// Body of the reminder mail for one appointment.
pub fn reminder_body(appointment: &DueAppointment) -> String {
    let slot = appointment
        .appointment_date
        .and_time(appointment.appointment_time)
        .format("%Y-%m-%d %H:%M");

    match &appointment.partner_name {
        Some(partner) => format!(
            "Hi {}, reminder: you have an appointment with {} scheduled on {}.",
            appointment.patient_name, partner, slot
        ),
        None => format!(
            "Hi {}, reminder: you have an appointment scheduled on {}.",
            appointment.patient_name, slot
        ),
    }
}

/// Outcome counts of one delivery run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

/// Send one reminder per appointment and flag the ones that went out.
///
/// Failures are logged and skipped; a failed mail leaves the appointment
/// unflagged so the next run picks it up again. Each appointment's claim is
/// released once its attempt is over.
pub async fn deliver_reminders(
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
    claims: ReminderClaims,
    appointments: Vec<DueAppointment>,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for appointment in appointments {
        let body = reminder_body(&appointment);

        match mailer
            .send(&appointment.patient_email, REMINDER_SUBJECT, &body)
            .await
        {
            Ok(()) => {
                report.sent += 1;

                if let Err(e) = store.mark_reminder_sent(appointment.id).await {
                    tracing::error!(
                        appointment_id = appointment.id,
                        "Failed to update reminder status: {}",
                        e
                    );
                }
            }
            Err(e) => {
                tracing::error!(
                    appointment_id = appointment.id,
                    "Failed to send email to {}: {}",
                    appointment.patient_email,
                    e
                );
                report.failed += 1;
            }
        }

        claims.release(appointment.id).await;
    }

    tracing::info!(sent = report.sent, failed = report.failed, "reminder run finished");
    report
}
