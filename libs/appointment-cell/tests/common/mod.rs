#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc, Weekday};
use tokio::sync::Mutex;
use uuid::Uuid;

use appointment_cell::{
    paginate_in_memory, Appointment, AppointmentRepository, AppointmentServices,
    AppointmentSpecification, AppointmentStatus, ServiceType,
};
use customer_cell::CustomerRepository;
use employee_cell::{BreakWindow, EmployeeRepository, WorkSchedule, WorkdaySchedule};
use shared_config::SchedulingConfig;
use shared_models::{Page, RepositoryError};

// ==============================================================================
// IN-MEMORY REPOSITORIES
// ==============================================================================

#[derive(Default)]
pub struct InMemoryAppointments {
    rows: Mutex<Vec<Appointment>>,
}

impl InMemoryAppointments {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Stores `appointment` as-is, assigning an id when it has none.
    pub async fn seed(&self, mut appointment: Appointment) -> Appointment {
        appointment.id.get_or_insert_with(Uuid::new_v4);
        self.rows.lock().await.push(appointment.clone());
        appointment
    }

    /// Raw row lookup, soft-deleted rows included.
    pub async fn raw(&self, id: Uuid) -> Option<Appointment> {
        self.rows.lock().await.iter().find(|row| row.id == Some(id)).cloned()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointments {
    async fn find_by_id(&self, id: Uuid) -> Result<Appointment, RepositoryError> {
        self.rows
            .lock()
            .await
            .iter()
            .find(|row| row.id == Some(id) && row.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("appointment", id))
    }

    async fn find(&self, spec: &AppointmentSpecification) -> Result<Page<Appointment>, RepositoryError> {
        let items = self.rows
            .lock()
            .await
            .iter()
            .filter(|row| spec.is_satisfied_by(row))
            .cloned()
            .collect();
        Ok(paginate_in_memory(items, spec.pagination()))
    }

    async fn save(&self, appointment: &Appointment) -> Result<Appointment, RepositoryError> {
        let mut rows = self.rows.lock().await;

        match appointment.id {
            None => {
                let mut stored = appointment.clone();
                stored.id = Some(Uuid::new_v4());
                rows.push(stored.clone());
                Ok(stored)
            }
            Some(id) => {
                let slot = rows
                    .iter_mut()
                    .find(|row| row.id == Some(id) && row.deleted_at.is_none())
                    .ok_or_else(|| RepositoryError::not_found("appointment", id))?;
                *slot = appointment.clone();
                Ok(slot.clone())
            }
        }
    }

    async fn delete(&self, id: Uuid, hard_delete: bool) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().await;

        if hard_delete {
            rows.retain(|row| row.id != Some(id));
        } else if let Some(row) = rows.iter_mut().find(|row| row.id == Some(id)) {
            row.deleted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.rows
            .lock()
            .await
            .iter()
            .any(|row| row.id == Some(id) && row.deleted_at.is_none()))
    }

    async fn count(&self, spec: &AppointmentSpecification) -> Result<i64, RepositoryError> {
        Ok(self.rows.lock().await.iter().filter(|row| spec.is_satisfied_by(row)).count() as i64)
    }
}

/// Every call fails as if the database were unreachable.
pub struct UnreachableAppointments;

#[async_trait]
impl AppointmentRepository for UnreachableAppointments {
    async fn find_by_id(&self, _id: Uuid) -> Result<Appointment, RepositoryError> {
        Err(unreachable_db())
    }

    async fn find(&self, _spec: &AppointmentSpecification) -> Result<Page<Appointment>, RepositoryError> {
        Err(unreachable_db())
    }

    async fn save(&self, _appointment: &Appointment) -> Result<Appointment, RepositoryError> {
        Err(unreachable_db())
    }

    async fn delete(&self, _id: Uuid, _hard_delete: bool) -> Result<(), RepositoryError> {
        Err(unreachable_db())
    }

    async fn exists_by_id(&self, _id: Uuid) -> Result<bool, RepositoryError> {
        Err(unreachable_db())
    }

    async fn count(&self, _spec: &AppointmentSpecification) -> Result<i64, RepositoryError> {
        Err(unreachable_db())
    }
}

fn unreachable_db() -> RepositoryError {
    RepositoryError::Request("connection refused".to_string())
}

#[derive(Default)]
pub struct InMemoryCustomers {
    ids: HashSet<Uuid>,
}

impl InMemoryCustomers {
    pub fn with(ids: &[Uuid]) -> Arc<Self> {
        Arc::new(Self { ids: ids.iter().copied().collect() })
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomers {
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.ids.contains(&id))
    }
}

#[derive(Default)]
pub struct InMemoryEmployees {
    schedules: HashMap<Uuid, Option<WorkSchedule>>,
}

impl InMemoryEmployees {
    pub fn new() -> Self {
        Self::default()
    }

    /// An employee with no stored schedule.
    pub fn with_employee(mut self, employee_id: Uuid) -> Self {
        self.schedules.insert(employee_id, None);
        self
    }

    pub fn with_schedule(mut self, schedule: WorkSchedule) -> Self {
        self.schedules.insert(schedule.employee_id, Some(schedule));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployees {
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.schedules.contains_key(&id))
    }

    async fn find_schedule(&self, id: Uuid) -> Result<Option<WorkSchedule>, RepositoryError> {
        Ok(self.schedules.get(&id).cloned().flatten())
    }
}

// ==============================================================================
// FIXTURES
// ==============================================================================

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// 2099-06-02 is a Tuesday.
pub fn tuesday_at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 6, 2, hour, minute, 0).unwrap()
}

/// 2099-06-03 is a Wednesday.
pub fn wednesday_at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 6, 3, hour, minute, 0).unwrap()
}

/// Tuesday 09:00-17:00 with a 12:00-13:00 break.
pub fn tuesday_schedule(employee_id: Uuid) -> WorkSchedule {
    WorkSchedule::new(employee_id).with_day(WorkdaySchedule {
        weekday: Weekday::Tue,
        start: time(9, 0),
        end: time(17, 0),
        break_window: Some(BreakWindow { start: time(12, 0), end: time(13, 0) }),
    })
}

pub fn appointment(
    customer_id: Uuid,
    employee_id: Option<Uuid>,
    scheduled_date: DateTime<Utc>,
    status: AppointmentStatus,
) -> Appointment {
    let created = Utc::now() - Duration::days(1);
    Appointment {
        id: None,
        pet_id: Uuid::new_v4(),
        customer_id,
        employee_id,
        service: ServiceType::Consultation,
        scheduled_date,
        status,
        reason: "Annual check".to_string(),
        notes: None,
        created_at: created,
        updated_at: created,
        deleted_at: None,
    }
}

pub fn services(
    appointments: Arc<dyn AppointmentRepository>,
    customers: Arc<dyn CustomerRepository>,
    employees: Arc<dyn EmployeeRepository>,
) -> AppointmentServices {
    AppointmentServices::with_repositories(appointments, customers, employees, &SchedulingConfig::default())
}
