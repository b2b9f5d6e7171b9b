// libs/appointment-cell/src/repository.rs
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Method,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::{repository_error, SupabaseClient};
use shared_models::{Page, RepositoryError};

use crate::models::Appointment;
use crate::specification::{AppointmentParams, AppointmentSpecification, Pagination};

const APPOINTMENTS_PATH: &str = "/rest/v1/appointments";

/// Storage contract for appointments. Implementations must honor soft
/// deletion: a soft-deleted row is invisible to every read.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Appointment, RepositoryError>;

    async fn find(&self, spec: &AppointmentSpecification) -> Result<Page<Appointment>, RepositoryError>;

    /// Inserts when `id` is unset, otherwise updates. Returns the stored row.
    async fn save(&self, appointment: &Appointment) -> Result<Appointment, RepositoryError>;

    async fn delete(&self, id: Uuid, hard_delete: bool) -> Result<(), RepositoryError>;

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepositoryError>;

    async fn count(&self, spec: &AppointmentSpecification) -> Result<i64, RepositoryError>;
}

/// Slices an already-filtered, fully materialized result set.
pub fn paginate_in_memory(mut items: Vec<Appointment>, pagination: Option<Pagination>) -> Page<Appointment> {
    items.sort_by_key(|appointment| appointment.scheduled_date);

    match pagination {
        None => Page::unpaged(items),
        Some(pagination) => {
            let total = items.len() as i64;
            let page_items = items
                .into_iter()
                .skip(pagination.offset() as usize)
                .take(pagination.limit() as usize)
                .collect();
            Page::new(page_items, total, pagination.page_number(), pagination.limit())
        }
    }
}

/// Runs each DNF alternative of `spec` and unions the rows by id.
async fn union_of<F, Fut>(spec: &AppointmentSpecification, mut fetch: F) -> Result<Vec<Appointment>, RepositoryError>
where
    F: FnMut(AppointmentParams) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<Appointment>, RepositoryError>>,
{
    let mut by_id: HashMap<Option<Uuid>, Appointment> = HashMap::new();
    let mut unidentified = Vec::new();

    for params in spec.param_sets() {
        for appointment in fetch(params).await? {
            match appointment.id {
                Some(_) => {
                    by_id.entry(appointment.id).or_insert(appointment);
                }
                None => unidentified.push(appointment),
            }
        }
    }

    Ok(by_id.into_values().chain(unidentified).collect())
}

pub struct SupabaseAppointmentRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn select(&self, params: &AppointmentParams) -> Result<(Vec<Appointment>, Option<i64>), RepositoryError> {
        let query = params.to_query_pairs();
        debug!("Querying appointments with {:?}", query);

        let result = self.supabase
            .select::<Appointment>(APPOINTMENTS_PATH, &query)
            .await
            .map_err(repository_error)?;

        Ok((result.rows, result.total))
    }

    fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    fn by_id_query(id: Uuid) -> Vec<(String, String)> {
        vec![
            ("id".to_string(), format!("eq.{}", id)),
            ("deleted_at".to_string(), "is.null".to_string()),
        ]
    }

    async fn write(
        &self,
        method: Method,
        query: &[(String, String)],
        body: Value,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        self.supabase
            .request_with_headers(
                method,
                APPOINTMENTS_PATH,
                query,
                Some(body),
                Some(Self::representation_headers()),
            )
            .await
            .map_err(repository_error)
    }
}

#[async_trait]
impl AppointmentRepository for SupabaseAppointmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Appointment, RepositoryError> {
        let params = AppointmentParams { id: Some(id), ..Default::default() };
        let (rows, _) = self.select(&params).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| RepositoryError::not_found("appointment", id))
    }

    async fn find(&self, spec: &AppointmentSpecification) -> Result<Page<Appointment>, RepositoryError> {
        let pagination = spec.pagination();
        let mut sets = spec.param_sets();

        if sets.len() == 1 {
            let mut params = sets.remove(0);
            if let Some(pagination) = pagination {
                params.apply_pagination(pagination);
            }

            let (rows, total) = self.select(&params).await?;
            let seen = params.offset.unwrap_or(0) as i64 + rows.len() as i64;
            let total = total.unwrap_or(seen);

            return Ok(match pagination {
                Some(pagination) => {
                    Page::new(rows, total, pagination.page_number(), pagination.limit())
                }
                None => {
                    let size = rows.len() as u32;
                    Page::new(rows, total, 1, size)
                }
            });
        }

        let rows = union_of(spec, |params| async move {
            self.select(&params).await.map(|(rows, _)| rows)
        })
        .await?;

        Ok(paginate_in_memory(rows, pagination))
    }

    async fn save(&self, appointment: &Appointment) -> Result<Appointment, RepositoryError> {
        let body = serde_json::to_value(appointment).map_err(|e| RepositoryError::Decode {
            entity: "appointment",
            message: e.to_string(),
        })?;

        let rows = match appointment.id {
            None => {
                debug!("Inserting appointment for customer {}", appointment.customer_id);
                self.write(Method::POST, &[], body).await?
            }
            Some(id) => {
                debug!("Updating appointment {}", id);
                self.write(Method::PATCH, &Self::by_id_query(id), body).await?
            }
        };

        rows.into_iter().next().ok_or_else(|| match appointment.id {
            Some(id) => RepositoryError::not_found("appointment", id),
            None => RepositoryError::Decode {
                entity: "appointment",
                message: "insert returned no representation".to_string(),
            },
        })
    }

    async fn delete(&self, id: Uuid, hard_delete: bool) -> Result<(), RepositoryError> {
        let query = vec![("id".to_string(), format!("eq.{}", id))];

        if hard_delete {
            debug!("Hard deleting appointment {}", id);
            return self.supabase
                .execute(Method::DELETE, APPOINTMENTS_PATH, &query, None)
                .await
                .map_err(repository_error);
        }

        debug!("Soft deleting appointment {}", id);
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.supabase
            .execute(
                Method::PATCH,
                APPOINTMENTS_PATH,
                &query,
                Some(json!({ "deleted_at": now, "updated_at": now })),
            )
            .await
            .map_err(repository_error)
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut query = Self::by_id_query(id);
        query.push(("select".to_string(), "id".to_string()));

        let rows: Vec<Value> = self.supabase
            .request_with_headers(Method::GET, APPOINTMENTS_PATH, &query, None, None)
            .await
            .map_err(repository_error)?;

        Ok(!rows.is_empty())
    }

    async fn count(&self, spec: &AppointmentSpecification) -> Result<i64, RepositoryError> {
        let mut sets = spec.param_sets();

        if sets.len() == 1 {
            let params = sets.remove(0).without_pagination();
            let mut query = params.to_query_pairs();
            query.push(("select".to_string(), "id".to_string()));

            let result = self.supabase
                .select::<Value>(APPOINTMENTS_PATH, &query)
                .await
                .map_err(repository_error)?;
            return Ok(result.total.unwrap_or(result.rows.len() as i64));
        }

        let rows = union_of(spec, |params| async move {
            self.select(&params).await.map(|(rows, _)| rows)
        })
        .await?;
        Ok(rows.len() as i64)
    }
}
