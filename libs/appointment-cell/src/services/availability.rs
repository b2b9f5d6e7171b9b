// libs/appointment-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use employee_cell::{EmployeeRepository, WorkSchedule};
use shared_config::{SchedulingConfig, MAX_SESSION_DURATION_MINUTES};

use crate::error::AppointmentError;
use crate::models::Appointment;
use crate::repository::AppointmentRepository;
use crate::specification::AppointmentSpecification;

/// Half-open interval intersection: `[a_start, a_end)` and `[b_start, b_end)`
/// overlap unless one ends exactly where (or before) the other begins.
pub fn sessions_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Appointments that compete with `candidate`, i.e. everything except the
/// stored version of the candidate itself.
pub(crate) fn competing<'a>(
    items: &'a [Appointment],
    candidate: &'a Appointment,
) -> impl Iterator<Item = &'a Appointment> + 'a {
    items.iter().filter(move |existing| !existing.is_same_record(candidate))
}

/// Same-day criterion for `candidate`.
pub(crate) fn candidate_day(candidate: &Appointment) -> Result<AppointmentSpecification, AppointmentError> {
    AppointmentSpecification::by_day(candidate.scheduled_date)
        .ok_or_else(|| AppointmentError::out_of_calendar(candidate.scheduled_date))
}

/// Clinic-wide capacity and per-employee slot checks.
pub struct AvailabilityService {
    appointments: Arc<dyn AppointmentRepository>,
    employees: Arc<dyn EmployeeRepository>,
    clinic_capacity: usize,
    session: Duration,
}

impl AvailabilityService {
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        employees: Arc<dyn EmployeeRepository>,
        config: &SchedulingConfig,
    ) -> Self {
        Self {
            appointments,
            employees,
            clinic_capacity: config.clinic_capacity,
            session: Duration::minutes(config.session_duration_minutes.clamp(1, MAX_SESSION_DURATION_MINUTES)),
        }
    }

    /// Rejects the candidate when its calendar day already holds
    /// `clinic_capacity` appointments, whoever the employee is.
    pub async fn check_clinic_capacity(&self, candidate: &Appointment) -> Result<(), AppointmentError> {
        let spec = candidate_day(candidate)?;

        let page = self.appointments
            .find(&spec)
            .await
            .map_err(|e| AppointmentError::repository("load clinic day", e))?;

        let booked = competing(&page.items, candidate).count();
        debug!(
            "Clinic has {} of {} slots booked on {}",
            booked, self.clinic_capacity, candidate.scheduled_date.date_naive()
        );

        if booked >= self.clinic_capacity {
            warn!("Clinic capacity reached on {}", candidate.scheduled_date.date_naive());
            return Err(AppointmentError::ClinicCapacityReached {
                date: candidate.scheduled_date.date_naive(),
                capacity: self.clinic_capacity,
            });
        }

        Ok(())
    }

    /// Rejects the candidate when it falls outside the employee's schedule
    /// for that weekday or overlaps one of their sessions on the same day.
    pub async fn check_employee_availability(
        &self,
        employee_id: Uuid,
        candidate: &Appointment,
    ) -> Result<(), AppointmentError> {
        debug!("Checking availability of employee {} at {}", employee_id, candidate.scheduled_date);

        let spec = candidate_day(candidate)?.and(AppointmentSpecification::by_employee(employee_id));

        let page = self.appointments
            .find(&spec)
            .await
            .map_err(|e| AppointmentError::repository("load employee day", e))?;

        let schedule = self.employees
            .find_schedule(employee_id)
            .await
            .map_err(|e| AppointmentError::repository("load employee schedule", e))?;

        if let Some(schedule) = schedule {
            self.check_schedule(employee_id, &schedule, candidate)?;
        }

        let candidate_end = candidate
            .session_end(self.session)
            .ok_or_else(|| AppointmentError::out_of_calendar(candidate.scheduled_date))?;
        for existing in competing(&page.items, candidate) {
            let existing_end = existing.session_end(self.session).unwrap_or(DateTime::<Utc>::MAX_UTC);

            if sessions_overlap(existing.scheduled_date, existing_end, candidate.scheduled_date, candidate_end) {
                warn!(
                    "Employee {} already booked at {} (requested {})",
                    employee_id, existing.scheduled_date, candidate.scheduled_date
                );
                return Err(AppointmentError::EmployeeOverlap {
                    employee_id,
                    existing_start: existing.scheduled_date,
                    candidate_start: candidate.scheduled_date,
                });
            }
        }

        Ok(())
    }

    fn check_schedule(
        &self,
        employee_id: Uuid,
        schedule: &WorkSchedule,
        candidate: &Appointment,
    ) -> Result<(), AppointmentError> {
        let start = candidate.scheduled_date;
        let weekday = start.weekday();

        let Some(day) = schedule.for_weekday(weekday) else {
            return Err(AppointmentError::EmployeeNotWorking { employee_id, weekday });
        };

        if day.is_on_break(start.time()) {
            return Err(AppointmentError::DuringBreak { employee_id, start });
        }

        let end = candidate
            .session_end(self.session)
            .ok_or_else(|| AppointmentError::out_of_calendar(start))?;
        if end.date_naive() != start.date_naive() || !day.covers(start.time(), end.time()) {
            return Err(AppointmentError::OutsideWorkingHours { employee_id, start });
        }

        Ok(())
    }
}
