// libs/appointment-cell/src/services/commands/reschedule.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppointmentError;

use super::{AppointmentServices, CommandHandler, CommandResult};

#[derive(Debug, Clone)]
pub struct RescheduleAppointment {
    pub appointment_id: Uuid,
    pub new_date: DateTime<Utc>,
    pub acting_employee_id: Option<Uuid>,
}

impl AppointmentServices {
    async fn reschedule(&self, command: RescheduleAppointment) -> Result<Option<Uuid>, AppointmentError> {
        let current = self.load(command.appointment_id, command.acting_employee_id).await?;

        let mut moved = current.clone();
        moved.reschedule(command.new_date, Utc::now())?;

        if moved.scheduled_date.date_naive() != current.scheduled_date.date_naive() {
            debug!(
                "Appointment {} moves from {} to {}, revalidating the new day",
                command.appointment_id,
                current.scheduled_date.date_naive(),
                moved.scheduled_date.date_naive()
            );
            self.validator.validate_request(moved.customer_id, &moved).await?;
        }

        if let Some(employee_id) = moved.employee_id {
            self.validator.validate_employee(employee_id, &moved).await?;
        }

        let saved = self.store(&moved).await?;
        Ok(saved.id.or(Some(command.appointment_id)))
    }
}

#[async_trait]
impl CommandHandler<RescheduleAppointment> for AppointmentServices {
    async fn handle(&self, command: RescheduleAppointment) -> CommandResult {
        CommandResult::from_outcome("reschedule appointment", self.reschedule(command).await, "Appointment rescheduled")
    }
}
