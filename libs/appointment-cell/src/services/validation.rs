// libs/appointment-cell/src/services/validation.rs
use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppointmentError;
use crate::models::Appointment;
use crate::services::availability::AvailabilityService;
use crate::services::booking_policy::CustomerBookingPolicy;

/// Runs the booking checks that gate a new or moved appointment.
///
/// The concurrent fan-out only saves latency on read-only lookups. Two
/// requests racing for the same slot can both pass; preventing that needs a
/// uniqueness constraint or serializable transaction in storage.
pub struct BookingValidator {
    availability: Arc<AvailabilityService>,
    booking_policy: Arc<CustomerBookingPolicy>,
}

impl BookingValidator {
    pub fn new(availability: Arc<AvailabilityService>, booking_policy: Arc<CustomerBookingPolicy>) -> Self {
        Self { availability, booking_policy }
    }

    /// Clinic capacity and the customer's daily limit, checked concurrently.
    /// Both checks always run to completion; the first failure in worker
    /// order is returned.
    pub async fn validate_request(
        &self,
        customer_id: Uuid,
        appointment: &Appointment,
    ) -> Result<(), AppointmentError> {
        debug!("Validating booking for customer {} at {}", customer_id, appointment.scheduled_date);

        let workers: Vec<BoxFuture<'_, Result<(), AppointmentError>>> = vec![
            Box::pin(self.availability.check_clinic_capacity(appointment)),
            Box::pin(self.booking_policy.check_daily_limit(customer_id, appointment)),
        ];

        let results = join_all(workers).await;

        match results.into_iter().find_map(Result::err) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Schedule and overlap check for the employee taking the appointment.
    pub async fn validate_employee(
        &self,
        employee_id: Uuid,
        appointment: &Appointment,
    ) -> Result<(), AppointmentError> {
        self.availability.check_employee_availability(employee_id, appointment).await
    }
}
