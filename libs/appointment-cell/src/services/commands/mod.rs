// libs/appointment-cell/src/services/commands/mod.rs
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use customer_cell::{CustomerRepository, SupabaseCustomerRepository};
use employee_cell::{EmployeeRepository, SupabaseEmployeeRepository};
use shared_config::{AppConfig, SchedulingConfig};
use shared_database::SupabaseClient;
use shared_models::Page;

use crate::error::{AppointmentError, ErrorKind};
use crate::models::{Appointment, AppointmentSearchQuery};
use crate::repository::{AppointmentRepository, SupabaseAppointmentRepository};
use crate::services::availability::AvailabilityService;
use crate::services::booking_policy::CustomerBookingPolicy;
use crate::services::validation::BookingValidator;
use crate::specification::{AppointmentSpecification, Pagination};

pub mod create;
pub mod maintenance;
pub mod reschedule;
pub mod transition;

pub use create::CreateAppointment;
pub use maintenance::{DeleteAppointment, UpdateAppointment};
pub use reschedule::RescheduleAppointment;
pub use transition::{CancelAppointment, CompleteAppointment, ConfirmAppointment, MarkNotPresented};

const DEFAULT_SEARCH_PAGE_SIZE: u32 = 20;
const MAX_SEARCH_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct CommandFailure {
    pub kind: ErrorKind,
    pub detail: String,
    #[serde(skip)]
    pub cause: AppointmentError,
}

/// Uniform outcome of every command, success or not.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandFailure>,
}

impl CommandResult {
    pub fn success(id: Option<Uuid>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            id: id.map(|id| id.to_string()),
            message: message.into(),
            error: None,
        }
    }

    pub fn failure(cause: AppointmentError) -> Self {
        let kind = cause.kind();
        Self {
            success: false,
            id: None,
            message: kind.tag().to_string(),
            error: Some(CommandFailure {
                kind,
                detail: cause.to_string(),
                cause,
            }),
        }
    }

    /// Logs the outcome of `operation` and folds it into a result.
    pub(crate) fn from_outcome(
        operation: &'static str,
        outcome: Result<Option<Uuid>, AppointmentError>,
        message: &str,
    ) -> Self {
        match outcome {
            Ok(id) => {
                info!("{} succeeded for appointment {:?}", operation, id);
                Self::success(id, message)
            }
            Err(err) => {
                match err.kind() {
                    ErrorKind::Infrastructure => error!("{} failed: {}", operation, err),
                    _ => warn!("{} rejected: {}", operation, err),
                }
                Self::failure(err)
            }
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|failure| failure.kind)
    }
}

/// One implementation per use case. Handlers never fail outright; every
/// outcome is reported through [`CommandResult`].
#[async_trait]
pub trait CommandHandler<C>
where
    C: Send + 'static,
{
    async fn handle(&self, command: C) -> CommandResult;
}

/// Everything the command handlers need, wired once per process.
pub struct AppointmentServices {
    pub(crate) appointments: Arc<dyn AppointmentRepository>,
    pub(crate) customers: Arc<dyn CustomerRepository>,
    pub(crate) employees: Arc<dyn EmployeeRepository>,
    pub(crate) validator: BookingValidator,
}

impl AppointmentServices {
    /// PostgREST-backed services for the running API.
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self::with_repositories(
            Arc::new(SupabaseAppointmentRepository::new(Arc::clone(&supabase))),
            Arc::new(SupabaseCustomerRepository::new(Arc::clone(&supabase))),
            Arc::new(SupabaseEmployeeRepository::new(supabase)),
            &config.scheduling,
        )
    }

    pub fn with_repositories(
        appointments: Arc<dyn AppointmentRepository>,
        customers: Arc<dyn CustomerRepository>,
        employees: Arc<dyn EmployeeRepository>,
        scheduling: &SchedulingConfig,
    ) -> Self {
        let availability = AvailabilityService::new(
            Arc::clone(&appointments),
            Arc::clone(&employees),
            scheduling,
        );
        let booking_policy = CustomerBookingPolicy::new(Arc::clone(&appointments), scheduling);

        Self {
            appointments,
            customers,
            employees,
            validator: BookingValidator::new(Arc::new(availability), Arc::new(booking_policy)),
        }
    }

    /// Loads an appointment, restricted to the acting employee when one is
    /// given. A scoped lookup with no rows is a plain not-found.
    pub(crate) async fn load(
        &self,
        appointment_id: Uuid,
        acting_employee_id: Option<Uuid>,
    ) -> Result<Appointment, AppointmentError> {
        let Some(employee_id) = acting_employee_id else {
            return self.appointments
                .find_by_id(appointment_id)
                .await
                .map_err(|e| AppointmentError::repository("load appointment", e));
        };

        let spec = AppointmentSpecification::by_id(appointment_id)
            .and(AppointmentSpecification::by_employee(employee_id));

        let page = self.appointments
            .find(&spec)
            .await
            .map_err(|e| AppointmentError::repository("load appointment", e))?;

        page.items
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::not_found("appointment", appointment_id))
    }

    pub(crate) async fn store(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        self.appointments
            .save(appointment)
            .await
            .map_err(|e| AppointmentError::repository("save appointment", e))
    }

    pub async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        self.load(appointment_id, None).await
    }

    pub async fn search(&self, query: AppointmentSearchQuery) -> Result<Page<Appointment>, AppointmentError> {
        let spec = search_specification(&query)?;
        self.appointments
            .find(&spec)
            .await
            .map_err(|e| AppointmentError::repository("search appointments", e))
    }
}

/// Conjunction of every filter present in `query`, paged.
pub fn search_specification(query: &AppointmentSearchQuery) -> Result<AppointmentSpecification, AppointmentError> {
    let mut criteria = Vec::new();

    if let Some(customer_id) = query.customer_id {
        criteria.push(AppointmentSpecification::by_customer(customer_id));
    }
    if let Some(employee_id) = query.employee_id {
        criteria.push(AppointmentSpecification::by_employee(employee_id));
    }
    if let Some(pet_id) = query.pet_id {
        criteria.push(AppointmentSpecification::by_pet(pet_id));
    }
    if let Some(status) = query.status {
        criteria.push(AppointmentSpecification::by_status(status));
    }
    if let Some(service) = query.service {
        criteria.push(AppointmentSpecification::by_service(service));
    }
    match (query.from_date, query.to_date) {
        (Some(start), Some(end)) if start < end => {
            criteria.push(AppointmentSpecification::by_date_range(start, end));
        }
        (Some(_), Some(_)) => {
            return Err(AppointmentError::validation("to_date", "must be after from_date"));
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(AppointmentError::validation(
                "from_date",
                "from_date and to_date must be supplied together",
            ));
        }
        (None, None) => {}
    }

    let size = query.size.unwrap_or(DEFAULT_SEARCH_PAGE_SIZE).clamp(1, MAX_SEARCH_PAGE_SIZE);
    Ok(AppointmentSpecification::all(criteria).paginate(Pagination::page(query.page.unwrap_or(1), size)))
}
