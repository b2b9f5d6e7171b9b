use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use shared_models::{AppError, RepositoryError};

use crate::models::AppointmentStatus;

/// Coarse classification used at the dispatch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    BusinessRule,
    NotFound,
    Infrastructure,
}

impl ErrorKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation failed",
            ErrorKind::BusinessRule => "business rule failed",
            ErrorKind::NotFound => "not found",
            ErrorKind::Infrastructure => "infrastructure failure",
        }
    }
}

/// Why the state machine refused an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionRejection {
    RequiresPending,
    AlreadyInStatus,
    StatusClosed,
    ScheduledDatePassed,
}

impl std::fmt::Display for TransitionRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            TransitionRejection::RequiresPending => "only pending appointments can be confirmed",
            TransitionRejection::AlreadyInStatus => "appointment is already in that status",
            TransitionRejection::StatusClosed => "appointment is closed",
            TransitionRejection::ScheduledDatePassed => "scheduled date has already passed",
        };
        f.write_str(reason)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppointmentError {
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("cannot move appointment from {from} to {to}: {reason}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
        reason: TransitionRejection,
    },

    #[error("invalid schedule date {date}: {message}")]
    InvalidScheduleDate { date: DateTime<Utc>, message: String },

    #[error("clinic capacity of {capacity} appointments reached on {date}")]
    ClinicCapacityReached { date: NaiveDate, capacity: usize },

    #[error("customer {customer_id} already holds {limit} appointment(s) on {date}")]
    DailyLimitReached { customer_id: Uuid, date: NaiveDate, limit: usize },

    #[error("employee {employee_id} does not work on {weekday}")]
    EmployeeNotWorking { employee_id: Uuid, weekday: Weekday },

    #[error("session at {start} is outside the working hours of employee {employee_id}")]
    OutsideWorkingHours { employee_id: Uuid, start: DateTime<Utc> },

    #[error("session at {start} falls within the break of employee {employee_id}")]
    DuringBreak { employee_id: Uuid, start: DateTime<Utc> },

    #[error("employee {employee_id} is already booked at {existing_start}")]
    EmployeeOverlap {
        employee_id: Uuid,
        existing_start: DateTime<Utc>,
        candidate_start: DateTime<Utc>,
    },

    #[error("booking details cannot change once the appointment is {status}")]
    DetailsFrozen { status: AppointmentStatus },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{operation} failed: {source}")]
    Repository {
        operation: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl AppointmentError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppointmentError::Validation { field, message: message.into() }
    }

    pub fn out_of_calendar(date: DateTime<Utc>) -> Self {
        AppointmentError::InvalidScheduleDate {
            date,
            message: "date is outside the supported calendar range".to_string(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppointmentError::NotFound { entity, id: id.to_string() }
    }

    /// Wraps a storage failure; a storage not-found becomes the domain not-found.
    pub fn repository(operation: &'static str, source: RepositoryError) -> Self {
        match source {
            RepositoryError::NotFound { entity, id } => AppointmentError::NotFound { entity, id },
            source => AppointmentError::Repository { operation, source },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppointmentError::Validation { .. } => ErrorKind::Validation,
            AppointmentError::NotFound { .. } => ErrorKind::NotFound,
            AppointmentError::Repository { .. } => ErrorKind::Infrastructure,
            AppointmentError::InvalidTransition { .. }
            | AppointmentError::InvalidScheduleDate { .. }
            | AppointmentError::ClinicCapacityReached { .. }
            | AppointmentError::DailyLimitReached { .. }
            | AppointmentError::EmployeeNotWorking { .. }
            | AppointmentError::OutsideWorkingHours { .. }
            | AppointmentError::DuringBreak { .. }
            | AppointmentError::EmployeeOverlap { .. }
            | AppointmentError::DetailsFrozen { .. } => ErrorKind::BusinessRule,
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => AppError::ValidationError(message),
            ErrorKind::BusinessRule => AppError::Conflict(message),
            ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::Infrastructure => AppError::ExternalService(message),
        }
    }
}
