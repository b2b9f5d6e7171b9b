use chrono::{DateTime, NaiveTime, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, SchedulingConfig};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub scheduling: SchedulingConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            scheduling: SchedulingConfig::default(),
        }
    }
}

impl TestConfig {
    /// Points the config at a mock server, typically `MockServer::uri()`.
    pub fn with_supabase_url(url: impl Into<String>) -> Self {
        Self {
            supabase_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            request_timeout_secs: 5,
            api_port: 0,
            scheduling: self.scheduling.clone(),
        }
    }
}

/// Canned PostgREST rows for wiremock-backed tests.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn appointment_response(
        id: Uuid,
        customer_id: Uuid,
        employee_id: Option<Uuid>,
        scheduled_date: DateTime<Utc>,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "pet_id": Uuid::new_v4(),
            "customer_id": customer_id,
            "employee_id": employee_id,
            "service": "consultation",
            "scheduled_date": scheduled_date.to_rfc3339(),
            "status": status,
            "reason": "Annual check",
            "notes": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "deleted_at": null
        })
    }

    pub fn id_row(id: Uuid) -> serde_json::Value {
        json!({ "id": id })
    }

    pub fn workday_response(
        employee_id: Uuid,
        day_of_week: u32,
        start: NaiveTime,
        end: NaiveTime,
        break_window: Option<(NaiveTime, NaiveTime)>,
    ) -> serde_json::Value {
        json!({
            "employee_id": employee_id,
            "day_of_week": day_of_week,
            "start_time": start.format("%H:%M:%S").to_string(),
            "end_time": end.format("%H:%M:%S").to_string(),
            "break_start": break_window.map(|(s, _)| s.format("%H:%M:%S").to_string()),
            "break_end": break_window.map(|(_, e)| e.format("%H:%M:%S").to_string())
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
