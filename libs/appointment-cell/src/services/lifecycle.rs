// libs/appointment-cell/src/services/lifecycle.rs
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppointmentError, TransitionRejection};
use crate::models::{fits_calendar, Appointment, AppointmentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionEvent {
    Confirm,
    Reschedule,
    Cancel,
    Complete,
    MarkNotPresented,
}

impl TransitionEvent {
    pub const ALL: [TransitionEvent; 5] = [
        TransitionEvent::Confirm,
        TransitionEvent::Reschedule,
        TransitionEvent::Cancel,
        TransitionEvent::Complete,
        TransitionEvent::MarkNotPresented,
    ];

    /// The status an accepted event moves the appointment into.
    pub fn target(&self) -> AppointmentStatus {
        match self {
            TransitionEvent::Confirm => AppointmentStatus::Confirmed,
            TransitionEvent::Reschedule => AppointmentStatus::Rescheduled,
            TransitionEvent::Cancel => AppointmentStatus::Cancelled,
            TransitionEvent::Complete => AppointmentStatus::Completed,
            TransitionEvent::MarkNotPresented => AppointmentStatus::NotPresented,
        }
    }
}

/// The single (status, event) table. Time-dependent guards are applied by the
/// entity methods on top of it.
pub fn next_status(
    current: AppointmentStatus,
    event: TransitionEvent,
) -> Result<AppointmentStatus, TransitionRejection> {
    use AppointmentStatus::*;
    use TransitionEvent::*;

    match (event, current) {
        (Confirm, Pending) => Ok(Confirmed),
        (Confirm, _) => Err(TransitionRejection::RequiresPending),

        (Reschedule, Completed | Cancelled) => Err(TransitionRejection::StatusClosed),
        (Reschedule, Pending | Confirmed | Rescheduled | NotPresented) => Ok(Rescheduled),

        (Cancel, Cancelled) => Err(TransitionRejection::AlreadyInStatus),
        (Cancel, Completed | NotPresented) => Err(TransitionRejection::StatusClosed),
        (Cancel, Pending | Confirmed | Rescheduled) => Ok(Cancelled),

        (Complete, Completed) => Err(TransitionRejection::AlreadyInStatus),
        (Complete, Cancelled) => Err(TransitionRejection::StatusClosed),
        (Complete, Pending | Confirmed | Rescheduled | NotPresented) => Ok(Completed),

        (MarkNotPresented, NotPresented) => Err(TransitionRejection::AlreadyInStatus),
        (MarkNotPresented, Cancelled) => Err(TransitionRejection::StatusClosed),
        (MarkNotPresented, Pending | Confirmed | Rescheduled | Completed) => Ok(NotPresented),
    }
}

/// Events the table accepts from `current`, ignoring time guards.
pub fn allowed_events(current: AppointmentStatus) -> Vec<TransitionEvent> {
    TransitionEvent::ALL
        .into_iter()
        .filter(|event| next_status(current, *event).is_ok())
        .collect()
}

impl Appointment {
    pub fn confirm(&mut self, employee_id: Uuid, now: DateTime<Utc>) -> Result<(), AppointmentError> {
        let next = self.checked_transition(TransitionEvent::Confirm)?;

        self.employee_id = Some(employee_id);
        self.commit(next, now);
        Ok(())
    }

    pub fn reschedule(&mut self, new_date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AppointmentError> {
        let next = self.checked_transition(TransitionEvent::Reschedule)?;

        if new_date <= now {
            warn!("Rejected reschedule of {:?} to past date {}", self.id, new_date);
            return Err(AppointmentError::InvalidScheduleDate {
                date: new_date,
                message: "new date must be in the future".to_string(),
            });
        }
        if !fits_calendar(new_date) {
            return Err(AppointmentError::out_of_calendar(new_date));
        }

        self.scheduled_date = new_date;
        self.commit(next, now);
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), AppointmentError> {
        let next = self.checked_transition(TransitionEvent::Cancel)?;

        if self.scheduled_date < now {
            return Err(self.rejection(TransitionEvent::Cancel, TransitionRejection::ScheduledDatePassed));
        }

        self.commit(next, now);
        Ok(())
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), AppointmentError> {
        let next = self.checked_transition(TransitionEvent::Complete)?;
        self.commit(next, now);
        Ok(())
    }

    pub fn mark_not_presented(&mut self, now: DateTime<Utc>) -> Result<(), AppointmentError> {
        let next = self.checked_transition(TransitionEvent::MarkNotPresented)?;
        self.commit(next, now);
        Ok(())
    }

    fn checked_transition(&self, event: TransitionEvent) -> Result<AppointmentStatus, AppointmentError> {
        next_status(self.status, event).map_err(|reason| self.rejection(event, reason))
    }

    fn rejection(&self, event: TransitionEvent, reason: TransitionRejection) -> AppointmentError {
        warn!(
            "Invalid transition for appointment {:?}: {} -> {} ({})",
            self.id, self.status, event.target(), reason
        );
        AppointmentError::InvalidTransition {
            from: self.status,
            to: event.target(),
            reason,
        }
    }

    fn commit(&mut self, next: AppointmentStatus, now: DateTime<Utc>) {
        debug!("Appointment {:?} moved {} -> {}", self.id, self.status, next);
        self.status = next;
        self.updated_at = now;
    }
}
