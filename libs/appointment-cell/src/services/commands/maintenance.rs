// libs/appointment-cell/src/services/commands/maintenance.rs
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppointmentError;
use crate::models::UpdateAppointmentRequest;

use super::{AppointmentServices, CommandHandler, CommandResult};

#[derive(Debug, Clone)]
pub struct UpdateAppointment {
    pub appointment_id: Uuid,
    pub changes: UpdateAppointmentRequest,
}

#[derive(Debug, Clone)]
pub struct DeleteAppointment {
    pub appointment_id: Uuid,
    pub hard_delete: bool,
}

fn check_changes(changes: &UpdateAppointmentRequest) -> Result<(), AppointmentError> {
    if changes.pet_id.is_none() && changes.service.is_none() && changes.reason.is_none() && changes.notes.is_none() {
        return Err(AppointmentError::validation("body", "no changes supplied"));
    }
    if changes.pet_id.is_some_and(|pet_id| pet_id.is_nil()) {
        return Err(AppointmentError::validation("pet_id", "pet id is required"));
    }
    if changes.reason.as_deref().is_some_and(|reason| reason.trim().is_empty()) {
        return Err(AppointmentError::validation("reason", "reason must not be empty"));
    }
    Ok(())
}

impl AppointmentServices {
    async fn update(&self, command: UpdateAppointment) -> Result<Option<Uuid>, AppointmentError> {
        let changes = command.changes;
        check_changes(&changes)?;

        let mut appointment = self.load(command.appointment_id, changes.acting_employee_id).await?;

        let touches_details = changes.pet_id.is_some() || changes.service.is_some() || changes.reason.is_some();
        if touches_details && appointment.status.is_terminal() {
            return Err(AppointmentError::DetailsFrozen { status: appointment.status });
        }

        if let Some(pet_id) = changes.pet_id {
            appointment.pet_id = pet_id;
        }
        if let Some(service) = changes.service {
            appointment.service = service;
        }
        if let Some(reason) = changes.reason {
            appointment.reason = reason.trim().to_string();
        }
        if let Some(notes) = changes.notes {
            // blank clears
            appointment.notes = Some(notes).filter(|notes| !notes.trim().is_empty());
        }
        appointment.updated_at = Utc::now();

        let saved = self.store(&appointment).await?;
        Ok(saved.id.or(Some(command.appointment_id)))
    }

    async fn delete(&self, command: DeleteAppointment) -> Result<Option<Uuid>, AppointmentError> {
        let exists = self.appointments
            .exists_by_id(command.appointment_id)
            .await
            .map_err(|e| AppointmentError::repository("check appointment", e))?;
        if !exists {
            return Err(AppointmentError::not_found("appointment", command.appointment_id));
        }

        debug!(
            "Deleting appointment {} (hard: {})",
            command.appointment_id, command.hard_delete
        );
        self.appointments
            .delete(command.appointment_id, command.hard_delete)
            .await
            .map_err(|e| AppointmentError::repository("delete appointment", e))?;

        Ok(Some(command.appointment_id))
    }
}

#[async_trait]
impl CommandHandler<UpdateAppointment> for AppointmentServices {
    async fn handle(&self, command: UpdateAppointment) -> CommandResult {
        CommandResult::from_outcome("update appointment", self.update(command).await, "Appointment updated")
    }
}

#[async_trait]
impl CommandHandler<DeleteAppointment> for AppointmentServices {
    async fn handle(&self, command: DeleteAppointment) -> CommandResult {
        let message = if command.hard_delete { "Appointment deleted" } else { "Appointment archived" };
        CommandResult::from_outcome("delete appointment", self.delete(command).await, message)
    }
}
