use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_database::{repository_error, SupabaseClient};
use shared_models::RepositoryError;

use crate::models::{EmployeeWorkday, WorkSchedule};

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// None when the employee has no working hours configured.
    async fn find_schedule(&self, id: Uuid) -> Result<Option<WorkSchedule>, RepositoryError>;
}

pub struct SupabaseEmployeeRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseEmployeeRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl EmployeeRepository for SupabaseEmployeeRepository {
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let query = vec![
            ("id".to_string(), format!("eq.{}", id)),
            ("deleted_at".to_string(), "is.null".to_string()),
            ("select".to_string(), "id".to_string()),
        ];

        let rows: Vec<Value> = self.supabase
            .request_with_headers(Method::GET, "/rest/v1/employees", &query, None, None)
            .await
            .map_err(repository_error)?;

        Ok(!rows.is_empty())
    }

    async fn find_schedule(&self, id: Uuid) -> Result<Option<WorkSchedule>, RepositoryError> {
        debug!("Loading work schedule for employee {}", id);

        let query = vec![
            ("employee_id".to_string(), format!("eq.{}", id)),
            ("order".to_string(), "day_of_week.asc".to_string()),
        ];

        let rows: Vec<EmployeeWorkday> = self.supabase
            .request_with_headers(Method::GET, "/rest/v1/employee_schedules", &query, None, None)
            .await
            .map_err(repository_error)?;

        if rows.is_empty() {
            return Ok(None);
        }

        Ok(Some(WorkSchedule::from_rows(id, rows)))
    }
}
