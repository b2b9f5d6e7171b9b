// libs/appointment-cell/src/services/commands/create.rs
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppointmentError;
use crate::models::{Appointment, NewAppointment};

use super::{AppointmentServices, CommandHandler, CommandResult};

#[derive(Debug, Clone)]
pub struct CreateAppointment {
    pub request: NewAppointment,
}

impl AppointmentServices {
    async fn create(&self, command: CreateAppointment) -> Result<Option<Uuid>, AppointmentError> {
        let customer_id = command.request.customer_id;
        let appointment = Appointment::new_request(command.request, Utc::now())?;

        let customer_exists = self.customers
            .exists_by_id(customer_id)
            .await
            .map_err(|e| AppointmentError::repository("check customer", e))?;
        if !customer_exists {
            return Err(AppointmentError::not_found("customer", customer_id));
        }

        self.validator.validate_request(customer_id, &appointment).await?;

        debug!("Booking request for customer {} passed validation", customer_id);
        let saved = self.store(&appointment).await?;
        Ok(saved.id)
    }
}

#[async_trait]
impl CommandHandler<CreateAppointment> for AppointmentServices {
    async fn handle(&self, command: CreateAppointment) -> CommandResult {
        CommandResult::from_outcome("create appointment", self.create(command).await, "Appointment requested")
    }
}
