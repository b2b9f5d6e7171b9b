// libs/appointment-cell/src/services/commands/transition.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppointmentError;
use crate::models::Appointment;

use super::{AppointmentServices, CommandHandler, CommandResult};

#[derive(Debug, Clone)]
pub struct ConfirmAppointment {
    pub appointment_id: Uuid,
    pub employee_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CancelAppointment {
    pub appointment_id: Uuid,
    pub acting_employee_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CompleteAppointment {
    pub appointment_id: Uuid,
    pub acting_employee_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct MarkNotPresented {
    pub appointment_id: Uuid,
    pub acting_employee_id: Option<Uuid>,
}

type Transition = fn(&mut Appointment, DateTime<Utc>) -> Result<(), AppointmentError>;

impl AppointmentServices {
    async fn confirm(&self, command: ConfirmAppointment) -> Result<Option<Uuid>, AppointmentError> {
        let employee_exists = self.employees
            .exists_by_id(command.employee_id)
            .await
            .map_err(|e| AppointmentError::repository("check employee", e))?;
        if !employee_exists {
            return Err(AppointmentError::not_found("employee", command.employee_id));
        }

        let mut appointment = self.load(command.appointment_id, None).await?;
        appointment.confirm(command.employee_id, Utc::now())?;

        self.validator.validate_employee(command.employee_id, &appointment).await?;

        let saved = self.store(&appointment).await?;
        Ok(saved.id.or(Some(command.appointment_id)))
    }

    /// Shared flow for the closing transitions.
    async fn close(
        &self,
        appointment_id: Uuid,
        acting_employee_id: Option<Uuid>,
        transition: Transition,
    ) -> Result<Option<Uuid>, AppointmentError> {
        let mut appointment = self.load(appointment_id, acting_employee_id).await?;
        transition(&mut appointment, Utc::now())?;

        let saved = self.store(&appointment).await?;
        Ok(saved.id.or(Some(appointment_id)))
    }
}

#[async_trait]
impl CommandHandler<ConfirmAppointment> for AppointmentServices {
    async fn handle(&self, command: ConfirmAppointment) -> CommandResult {
        CommandResult::from_outcome("confirm appointment", self.confirm(command).await, "Appointment confirmed")
    }
}

#[async_trait]
impl CommandHandler<CancelAppointment> for AppointmentServices {
    async fn handle(&self, command: CancelAppointment) -> CommandResult {
        let outcome = self
            .close(command.appointment_id, command.acting_employee_id, Appointment::cancel)
            .await;
        CommandResult::from_outcome("cancel appointment", outcome, "Appointment cancelled")
    }
}

#[async_trait]
impl CommandHandler<CompleteAppointment> for AppointmentServices {
    async fn handle(&self, command: CompleteAppointment) -> CommandResult {
        let outcome = self
            .close(command.appointment_id, command.acting_employee_id, Appointment::complete)
            .await;
        CommandResult::from_outcome("complete appointment", outcome, "Appointment completed")
    }
}

#[async_trait]
impl CommandHandler<MarkNotPresented> for AppointmentServices {
    async fn handle(&self, command: MarkNotPresented) -> CommandResult {
        let outcome = self
            .close(command.appointment_id, command.acting_employee_id, Appointment::mark_not_presented)
            .await;
        CommandResult::from_outcome("mark not presented", outcome, "Appointment marked as not presented")
    }
}
