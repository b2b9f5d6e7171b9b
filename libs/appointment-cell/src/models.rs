// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::AppointmentError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Unset until the appointment is first saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub pet_id: Uuid,
    pub customer_id: Uuid,
    /// Assigned on confirmation.
    pub employee_id: Option<Uuid>,
    pub service: ServiceType,
    pub scheduled_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub reason: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields a customer supplies when requesting an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub customer_id: Uuid,
    pub pet_id: Uuid,
    pub service: ServiceType,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub reason: String,
    pub notes: Option<String>,
}

impl Appointment {
    /// Builds a pending appointment, rejecting malformed input before any side effect.
    pub fn new_request(request: NewAppointment, now: DateTime<Utc>) -> Result<Self, AppointmentError> {
        if request.customer_id.is_nil() {
            return Err(AppointmentError::validation("customer_id", "owner id is required"));
        }
        if request.pet_id.is_nil() {
            return Err(AppointmentError::validation("pet_id", "pet id is required"));
        }

        let scheduled_date = request.scheduled_date
            .ok_or_else(|| AppointmentError::validation("scheduled_date", "date is required"))?;
        if scheduled_date <= now {
            return Err(AppointmentError::validation(
                "scheduled_date",
                "appointment must be requested for a future time",
            ));
        }
        if !fits_calendar(scheduled_date) {
            return Err(AppointmentError::validation(
                "scheduled_date",
                "date is outside the supported calendar range",
            ));
        }

        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(AppointmentError::validation("reason", "reason must not be empty"));
        }

        Ok(Self {
            id: None,
            pet_id: request.pet_id,
            customer_id: request.customer_id,
            employee_id: None,
            service: request.service,
            scheduled_date,
            status: AppointmentStatus::Pending,
            reason: reason.to_string(),
            notes: request.notes.filter(|notes| !notes.trim().is_empty()),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    /// End of the implied session starting at `scheduled_date`, `None` when
    /// it would fall past the last representable instant.
    pub fn session_end(&self, session: Duration) -> Option<DateTime<Utc>> {
        self.scheduled_date.checked_add_signed(session)
    }

    pub fn is_same_record(&self, other: &Appointment) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

/// A bookable date needs a following day window and room for a session of up
/// to one day.
pub(crate) fn fits_calendar(at: DateTime<Utc>) -> bool {
    at.checked_add_signed(Duration::days(1)).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Rescheduled,
    NotPresented,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 6] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Rescheduled,
        AppointmentStatus::NotPresented,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Rescheduled => "rescheduled",
            AppointmentStatus::NotPresented => "not_presented",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NotPresented
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    #[serde(alias = "general", alias = "consult")]
    Consultation,
    #[serde(alias = "vaccine")]
    Vaccination,
    Surgery,
    Grooming,
    Dental,
    #[serde(alias = "urgent")]
    Emergency,
    #[serde(alias = "check_up")]
    Checkup,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Consultation => "consultation",
            ServiceType::Vaccination => "vaccination",
            ServiceType::Surgery => "surgery",
            ServiceType::Grooming => "grooming",
            ServiceType::Dental => "dental",
            ServiceType::Emergency => "emergency",
            ServiceType::Checkup => "checkup",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmAppointmentRequest {
    pub employee_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub new_date: DateTime<Utc>,
    pub acting_employee_id: Option<Uuid>,
}

/// Body shared by cancel, complete and not-presented.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub acting_employee_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub acting_employee_id: Option<Uuid>,
    pub pet_id: Option<Uuid>,
    pub service: Option<ServiceType>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteAppointmentQuery {
    pub hard: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentSearchQuery {
    pub customer_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub pet_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub service: Option<ServiceType>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}
