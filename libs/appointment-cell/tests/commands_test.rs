mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use uuid::Uuid;

use appointment_cell::{
    AppointmentError, AppointmentServices, AppointmentStatus, CancelAppointment, CommandHandler,
    CommandResult, CompleteAppointment, ConfirmAppointment, CreateAppointment, DeleteAppointment,
    ErrorKind, MarkNotPresented, NewAppointment, RescheduleAppointment, ServiceType,
    TransitionRejection, UpdateAppointment, UpdateAppointmentRequest,
};

use common::*;

struct Clinic {
    appointments: Arc<InMemoryAppointments>,
    services: AppointmentServices,
    customer: Uuid,
    employee: Uuid,
}

fn clinic() -> Clinic {
    let appointments = InMemoryAppointments::new();
    let customer = Uuid::new_v4();
    let employee = Uuid::new_v4();

    let services = services(
        appointments.clone(),
        InMemoryCustomers::with(&[customer]),
        InMemoryEmployees::new().with_schedule(tuesday_schedule(employee)).shared(),
    );

    Clinic { appointments, services, customer, employee }
}

fn new_request(customer_id: Uuid, at: chrono::DateTime<Utc>) -> NewAppointment {
    NewAppointment {
        customer_id,
        pet_id: Uuid::new_v4(),
        service: ServiceType::Vaccination,
        scheduled_date: Some(at),
        reason: "Rabies booster".to_string(),
        notes: None,
    }
}

fn cause(result: CommandResult) -> AppointmentError {
    assert!(!result.success, "expected failure, got {:?}", result);
    result.error.expect("failure carries an error").cause
}

fn created_id(result: &CommandResult) -> Uuid {
    assert!(result.success, "expected success, got {:?}", result);
    result.id.as_deref().and_then(|id| Uuid::parse_str(id).ok()).expect("created id")
}

// ==============================================================================
// CREATE
// ==============================================================================

#[tokio::test]
async fn create_stores_pending_appointment_without_employee() {
    let clinic = clinic();

    let result = clinic.services
        .handle(CreateAppointment { request: new_request(clinic.customer, tuesday_at(10, 0)) })
        .await;

    let id = created_id(&result);
    let stored = clinic.appointments.raw(id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::Pending);
    assert_eq!(stored.employee_id, None);
    assert_eq!(stored.customer_id, clinic.customer);
}

#[tokio::test]
async fn create_for_unknown_customer_is_not_found() {
    let clinic = clinic();

    let result = clinic.services
        .handle(CreateAppointment { request: new_request(Uuid::new_v4(), tuesday_at(10, 0)) })
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
    assert_eq!(clinic.appointments.len().await, 0);
}

#[tokio::test]
async fn create_in_the_past_fails_validation() {
    let clinic = clinic();

    let result = clinic.services
        .handle(CreateAppointment { request: new_request(clinic.customer, Utc::now() - Duration::hours(2)) })
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Validation));
    assert_eq!(result.message, "validation failed");
}

#[tokio::test]
async fn create_at_the_end_of_the_calendar_fails_validation() {
    let clinic = clinic();
    let last_half_hour = chrono::DateTime::<Utc>::MAX_UTC - Duration::minutes(30);

    let result = clinic.services
        .handle(CreateAppointment { request: new_request(clinic.customer, last_half_hour) })
        .await;

    assert_matches!(cause(result), AppointmentError::Validation { field: "scheduled_date", .. });
    assert_eq!(clinic.appointments.len().await, 0);
}

#[tokio::test]
async fn create_respects_customer_daily_limit() {
    let clinic = clinic();

    let first = clinic.services
        .handle(CreateAppointment { request: new_request(clinic.customer, tuesday_at(9, 0)) })
        .await;
    assert!(first.success);

    let second = clinic.services
        .handle(CreateAppointment { request: new_request(clinic.customer, tuesday_at(15, 0)) })
        .await;

    assert_eq!(second.error_kind(), Some(ErrorKind::BusinessRule));
    assert_matches!(cause(second), AppointmentError::DailyLimitReached { limit: 1, .. });
}

// ==============================================================================
// CONFIRM
// ==============================================================================

#[tokio::test]
async fn confirm_assigns_employee() {
    let clinic = clinic();
    let pending = clinic.appointments
        .seed(appointment(clinic.customer, None, tuesday_at(10, 0), AppointmentStatus::Pending))
        .await;
    let id = pending.id.unwrap();

    let result = clinic.services
        .handle(ConfirmAppointment { appointment_id: id, employee_id: clinic.employee })
        .await;

    assert!(result.success);
    let stored = clinic.appointments.raw(id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::Confirmed);
    assert_eq!(stored.employee_id, Some(clinic.employee));
}

#[tokio::test]
async fn confirm_with_unknown_employee_is_not_found() {
    let clinic = clinic();
    let pending = clinic.appointments
        .seed(appointment(clinic.customer, None, tuesday_at(10, 0), AppointmentStatus::Pending))
        .await;

    let result = clinic.services
        .handle(ConfirmAppointment { appointment_id: pending.id.unwrap(), employee_id: Uuid::new_v4() })
        .await;

    assert_matches!(cause(result), AppointmentError::NotFound { entity: "employee", .. });
}

#[tokio::test]
async fn confirm_into_overlapping_slot_leaves_appointment_pending() {
    let clinic = clinic();
    clinic.appointments
        .seed(appointment(Uuid::new_v4(), Some(clinic.employee), tuesday_at(10, 0), AppointmentStatus::Confirmed))
        .await;
    let pending = clinic.appointments
        .seed(appointment(clinic.customer, None, tuesday_at(10, 30), AppointmentStatus::Pending))
        .await;
    let id = pending.id.unwrap();

    let result = clinic.services
        .handle(ConfirmAppointment { appointment_id: id, employee_id: clinic.employee })
        .await;

    assert_matches!(cause(result), AppointmentError::EmployeeOverlap { .. });
    assert_eq!(clinic.appointments.raw(id).await.unwrap(), pending);
}

// ==============================================================================
// TRANSITIONS
// ==============================================================================

#[tokio::test]
async fn cancelling_completed_appointment_names_both_statuses() {
    let clinic = clinic();
    let completed = clinic.appointments
        .seed(appointment(clinic.customer, Some(clinic.employee), tuesday_at(10, 0), AppointmentStatus::Completed))
        .await;

    let result = clinic.services
        .handle(CancelAppointment { appointment_id: completed.id.unwrap(), acting_employee_id: None })
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::BusinessRule));
    assert_eq!(
        cause(result),
        AppointmentError::InvalidTransition {
            from: AppointmentStatus::Completed,
            to: AppointmentStatus::Cancelled,
            reason: TransitionRejection::StatusClosed,
        }
    );
}

#[tokio::test]
async fn complete_and_not_presented_follow_the_table() {
    let clinic = clinic();
    let confirmed = clinic.appointments
        .seed(appointment(clinic.customer, Some(clinic.employee), tuesday_at(10, 0), AppointmentStatus::Confirmed))
        .await;
    let id = confirmed.id.unwrap();

    let result = clinic.services
        .handle(MarkNotPresented { appointment_id: id, acting_employee_id: Some(clinic.employee) })
        .await;
    assert!(result.success);
    assert_eq!(clinic.appointments.raw(id).await.unwrap().status, AppointmentStatus::NotPresented);

    let result = clinic.services
        .handle(CompleteAppointment { appointment_id: id, acting_employee_id: Some(clinic.employee) })
        .await;
    assert!(result.success);
    assert_eq!(clinic.appointments.raw(id).await.unwrap().status, AppointmentStatus::Completed);

    let result = clinic.services
        .handle(CompleteAppointment { appointment_id: id, acting_employee_id: None })
        .await;
    assert_matches!(
        cause(result),
        AppointmentError::InvalidTransition { reason: TransitionRejection::AlreadyInStatus, .. }
    );
}

#[tokio::test]
async fn scoped_lookup_for_other_employee_is_not_found() {
    let clinic = clinic();
    let confirmed = clinic.appointments
        .seed(appointment(clinic.customer, Some(clinic.employee), tuesday_at(10, 0), AppointmentStatus::Confirmed))
        .await;
    let id = confirmed.id.unwrap();

    let result = clinic.services
        .handle(CancelAppointment { appointment_id: id, acting_employee_id: Some(Uuid::new_v4()) })
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::NotFound));
    assert_eq!(clinic.appointments.raw(id).await.unwrap().status, AppointmentStatus::Confirmed);
}

// ==============================================================================
// RESCHEDULE
// ==============================================================================

#[tokio::test]
async fn reschedule_into_the_past_changes_nothing() {
    let clinic = clinic();
    let confirmed = clinic.appointments
        .seed(appointment(clinic.customer, Some(clinic.employee), tuesday_at(10, 0), AppointmentStatus::Confirmed))
        .await;
    let id = confirmed.id.unwrap();

    let result = clinic.services
        .handle(RescheduleAppointment {
            appointment_id: id,
            new_date: Utc::now() - Duration::days(1),
            acting_employee_id: None,
        })
        .await;

    assert_matches!(cause(result), AppointmentError::InvalidScheduleDate { .. });
    assert_eq!(clinic.appointments.raw(id).await.unwrap(), confirmed);
}

#[tokio::test]
async fn reschedule_to_the_end_of_the_calendar_changes_nothing() {
    let clinic = clinic();
    let confirmed = clinic.appointments
        .seed(appointment(clinic.customer, Some(clinic.employee), tuesday_at(10, 0), AppointmentStatus::Confirmed))
        .await;
    let id = confirmed.id.unwrap();

    let result = clinic.services
        .handle(RescheduleAppointment {
            appointment_id: id,
            new_date: chrono::DateTime::<Utc>::MAX_UTC - Duration::minutes(30),
            acting_employee_id: None,
        })
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::BusinessRule));
    assert_matches!(cause(result), AppointmentError::InvalidScheduleDate { .. });
    assert_eq!(clinic.appointments.raw(id).await.unwrap(), confirmed);
}

#[tokio::test]
async fn reschedule_within_the_day_checks_employee_slot() {
    let clinic = clinic();
    let confirmed = clinic.appointments
        .seed(appointment(clinic.customer, Some(clinic.employee), tuesday_at(10, 0), AppointmentStatus::Confirmed))
        .await;
    let id = confirmed.id.unwrap();

    let into_break = clinic.services
        .handle(RescheduleAppointment { appointment_id: id, new_date: tuesday_at(12, 15), acting_employee_id: None })
        .await;
    assert_matches!(cause(into_break), AppointmentError::DuringBreak { .. });

    let result = clinic.services
        .handle(RescheduleAppointment { appointment_id: id, new_date: tuesday_at(14, 0), acting_employee_id: None })
        .await;
    assert!(result.success);

    let stored = clinic.appointments.raw(id).await.unwrap();
    assert_eq!(stored.scheduled_date, tuesday_at(14, 0));
    assert_eq!(stored.status, AppointmentStatus::Rescheduled);
}

#[tokio::test]
async fn reschedule_to_another_day_revalidates_daily_limit() {
    let clinic = clinic();
    clinic.appointments
        .seed(appointment(clinic.customer, None, wednesday_at(9, 0), AppointmentStatus::Pending))
        .await;
    let tuesday = clinic.appointments
        .seed(appointment(clinic.customer, None, tuesday_at(10, 0), AppointmentStatus::Pending))
        .await;

    let result = clinic.services
        .handle(RescheduleAppointment {
            appointment_id: tuesday.id.unwrap(),
            new_date: wednesday_at(15, 0),
            acting_employee_id: None,
        })
        .await;

    assert_matches!(cause(result), AppointmentError::DailyLimitReached { .. });
}

// ==============================================================================
// UPDATE / DELETE
// ==============================================================================

#[tokio::test]
async fn closed_appointments_only_accept_note_changes() {
    let clinic = clinic();
    let completed = clinic.appointments
        .seed(appointment(clinic.customer, Some(clinic.employee), tuesday_at(10, 0), AppointmentStatus::Completed))
        .await;
    let id = completed.id.unwrap();

    let result = clinic.services
        .handle(UpdateAppointment {
            appointment_id: id,
            changes: UpdateAppointmentRequest { service: Some(ServiceType::Surgery), ..Default::default() },
        })
        .await;
    assert_matches!(
        cause(result),
        AppointmentError::DetailsFrozen { status: AppointmentStatus::Completed }
    );

    let result = clinic.services
        .handle(UpdateAppointment {
            appointment_id: id,
            changes: UpdateAppointmentRequest {
                notes: Some("Owner asked for the invoice by mail".to_string()),
                ..Default::default()
            },
        })
        .await;
    assert!(result.success);

    let stored = clinic.appointments.raw(id).await.unwrap();
    assert_eq!(stored.service, ServiceType::Consultation);
    assert_eq!(stored.notes.as_deref(), Some("Owner asked for the invoice by mail"));
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let clinic = clinic();

    let result = clinic.services
        .handle(UpdateAppointment { appointment_id: Uuid::new_v4(), changes: UpdateAppointmentRequest::default() })
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Validation));
}

#[tokio::test]
async fn soft_delete_hides_appointment() {
    let clinic = clinic();
    let pending = clinic.appointments
        .seed(appointment(clinic.customer, None, tuesday_at(10, 0), AppointmentStatus::Pending))
        .await;
    let id = pending.id.unwrap();

    let result = clinic.services
        .handle(DeleteAppointment { appointment_id: id, hard_delete: false })
        .await;
    assert!(result.success);
    assert!(clinic.appointments.raw(id).await.unwrap().deleted_at.is_some());

    let again = clinic.services
        .handle(DeleteAppointment { appointment_id: id, hard_delete: false })
        .await;
    assert_eq!(again.error_kind(), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn hard_delete_removes_row() {
    let clinic = clinic();
    let pending = clinic.appointments
        .seed(appointment(clinic.customer, None, tuesday_at(10, 0), AppointmentStatus::Pending))
        .await;
    let id = pending.id.unwrap();

    let result = clinic.services
        .handle(DeleteAppointment { appointment_id: id, hard_delete: true })
        .await;

    assert!(result.success);
    assert_eq!(result.id, Some(id.to_string()));
    assert!(clinic.appointments.raw(id).await.is_none());
}

// ==============================================================================
// INFRASTRUCTURE
// ==============================================================================

#[tokio::test]
async fn storage_outage_is_reported_not_raised() {
    let customer = Uuid::new_v4();
    let services = services(
        Arc::new(UnreachableAppointments),
        InMemoryCustomers::with(&[customer]),
        InMemoryEmployees::new().shared(),
    );

    let result = services
        .handle(CreateAppointment { request: new_request(customer, tuesday_at(10, 0)) })
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Infrastructure));
    assert_eq!(result.message, "infrastructure failure");
    assert_matches!(cause(result), AppointmentError::Repository { .. });
}
