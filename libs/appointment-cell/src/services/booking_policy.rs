// libs/appointment-cell/src/services/booking_policy.rs
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::SchedulingConfig;

use crate::error::AppointmentError;
use crate::models::Appointment;
use crate::repository::AppointmentRepository;
use crate::services::availability::{candidate_day, competing};
use crate::specification::AppointmentSpecification;

/// Per-customer booking limits.
pub struct CustomerBookingPolicy {
    appointments: Arc<dyn AppointmentRepository>,
    daily_limit: usize,
}

impl CustomerBookingPolicy {
    pub fn new(appointments: Arc<dyn AppointmentRepository>, config: &SchedulingConfig) -> Self {
        Self {
            appointments,
            daily_limit: config.customer_daily_limit,
        }
    }

    /// Rejects the candidate once the customer already holds `daily_limit`
    /// appointments on the same calendar day, at any time of that day.
    pub async fn check_daily_limit(
        &self,
        customer_id: Uuid,
        candidate: &Appointment,
    ) -> Result<(), AppointmentError> {
        let spec = candidate_day(candidate)?.and(AppointmentSpecification::by_customer(customer_id));

        let page = self.appointments
            .find(&spec)
            .await
            .map_err(|e| AppointmentError::repository("load customer day", e))?;

        let held = competing(&page.items, candidate).count();
        debug!("Customer {} holds {} appointment(s) that day", customer_id, held);

        if held >= self.daily_limit {
            warn!(
                "Customer {} reached daily limit of {} on {}",
                customer_id, self.daily_limit, candidate.scheduled_date.date_naive()
            );
            return Err(AppointmentError::DailyLimitReached {
                customer_id,
                date: candidate.scheduled_date.date_naive(),
                limit: self.daily_limit,
            });
        }

        Ok(())
    }
}
