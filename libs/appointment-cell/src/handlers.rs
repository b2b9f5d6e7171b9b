// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_models::{AppError, Page};

use crate::error::ErrorKind;
use crate::models::{
    Appointment, AppointmentSearchQuery, ConfirmAppointmentRequest, DeleteAppointmentQuery,
    NewAppointment, RescheduleAppointmentRequest, TransitionRequest, UpdateAppointmentRequest,
};
use crate::services::commands::{
    AppointmentServices, CancelAppointment, CommandHandler, CommandResult, CompleteAppointment,
    ConfirmAppointment, CreateAppointment, DeleteAppointment, MarkNotPresented, RescheduleAppointment,
    UpdateAppointment,
};

pub type CommandResponse = (StatusCode, Json<CommandResult>);

fn failure_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::BusinessRule => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Infrastructure => StatusCode::BAD_GATEWAY,
    }
}

fn respond(result: CommandResult, success_status: StatusCode) -> CommandResponse {
    let status = match result.error_kind() {
        None => success_status,
        Some(kind) => failure_status(kind),
    };
    (status, Json(result))
}

// ==============================================================================
// COMMAND HANDLERS
// ==============================================================================

pub async fn create_appointment(
    State(services): State<Arc<AppointmentServices>>,
    Json(request): Json<NewAppointment>,
) -> CommandResponse {
    let result = services.handle(CreateAppointment { request }).await;
    respond(result, StatusCode::CREATED)
}

pub async fn confirm_appointment(
    State(services): State<Arc<AppointmentServices>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<ConfirmAppointmentRequest>,
) -> CommandResponse {
    let command = ConfirmAppointment {
        appointment_id,
        employee_id: request.employee_id,
    };
    respond(services.handle(command).await, StatusCode::OK)
}

pub async fn reschedule_appointment(
    State(services): State<Arc<AppointmentServices>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> CommandResponse {
    let command = RescheduleAppointment {
        appointment_id,
        new_date: request.new_date,
        acting_employee_id: request.acting_employee_id,
    };
    respond(services.handle(command).await, StatusCode::OK)
}

pub async fn cancel_appointment(
    State(services): State<Arc<AppointmentServices>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> CommandResponse {
    let command = CancelAppointment {
        appointment_id,
        acting_employee_id: request.acting_employee_id,
    };
    respond(services.handle(command).await, StatusCode::OK)
}

pub async fn complete_appointment(
    State(services): State<Arc<AppointmentServices>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> CommandResponse {
    let command = CompleteAppointment {
        appointment_id,
        acting_employee_id: request.acting_employee_id,
    };
    respond(services.handle(command).await, StatusCode::OK)
}

pub async fn mark_not_presented(
    State(services): State<Arc<AppointmentServices>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> CommandResponse {
    let command = MarkNotPresented {
        appointment_id,
        acting_employee_id: request.acting_employee_id,
    };
    respond(services.handle(command).await, StatusCode::OK)
}

pub async fn update_appointment(
    State(services): State<Arc<AppointmentServices>>,
    Path(appointment_id): Path<Uuid>,
    Json(changes): Json<UpdateAppointmentRequest>,
) -> CommandResponse {
    let command = UpdateAppointment { appointment_id, changes };
    respond(services.handle(command).await, StatusCode::OK)
}

pub async fn delete_appointment(
    State(services): State<Arc<AppointmentServices>>,
    Path(appointment_id): Path<Uuid>,
    Query(query): Query<DeleteAppointmentQuery>,
) -> CommandResponse {
    let command = DeleteAppointment {
        appointment_id,
        hard_delete: query.hard.unwrap_or(false),
    };
    respond(services.handle(command).await, StatusCode::OK)
}

// ==============================================================================
// QUERY HANDLERS
// ==============================================================================

pub async fn get_appointment(
    State(services): State<Arc<AppointmentServices>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = services.get(appointment_id).await?;
    Ok(Json(appointment))
}

pub async fn search_appointments(
    State(services): State<Arc<AppointmentServices>>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Page<Appointment>>, AppError> {
    let page = services.search(query).await?;
    Ok(Json(page))
}
