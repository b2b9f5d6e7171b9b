use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_database::{repository_error, SupabaseClient};
use shared_models::RepositoryError;

/// Customer lookups needed by appointment booking. Customer records themselves
/// are managed elsewhere.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

pub struct SupabaseCustomerRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseCustomerRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl CustomerRepository for SupabaseCustomerRepository {
    async fn exists_by_id(&self, id: Uuid) -> Result<bool, RepositoryError> {
        debug!("Checking customer {} exists", id);

        let query = vec![
            ("id".to_string(), format!("eq.{}", id)),
            ("deleted_at".to_string(), "is.null".to_string()),
            ("select".to_string(), "id".to_string()),
        ];

        let rows: Vec<Value> = self.supabase
            .request_with_headers(Method::GET, "/rest/v1/customers", &query, None, None)
            .await
            .map_err(repository_error)?;

        Ok(!rows.is_empty())
    }
}
