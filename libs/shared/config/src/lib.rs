use std::env;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub request_timeout_secs: u64,
    pub api_port: u16,
    pub scheduling: SchedulingConfig,
}

/// Longest session the scheduler accepts: one day.
pub const MAX_SESSION_DURATION_MINUTES: i64 = 24 * 60;

/// Capacity and slot rules applied by the appointment validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingConfig {
    /// Maximum appointments the clinic accepts on one calendar day.
    pub clinic_capacity: usize,
    /// Maximum appointments a single customer may hold on one calendar day.
    pub customer_daily_limit: usize,
    pub session_duration_minutes: i64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            clinic_capacity: 3,
            customer_daily_limit: 1,
            session_duration_minutes: 60,
        }
    }
}

impl SchedulingConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            clinic_capacity: parsed_var("CLINIC_ROOM_CAPACITY", defaults.clinic_capacity),
            customer_daily_limit: parsed_var("CUSTOMER_DAILY_LIMIT", defaults.customer_daily_limit),
            session_duration_minutes: bounded(
                "SESSION_DURATION_MINUTES",
                parsed_var("SESSION_DURATION_MINUTES", defaults.session_duration_minutes),
                1..=MAX_SESSION_DURATION_MINUTES,
                defaults.session_duration_minutes,
            ),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            request_timeout_secs: parsed_var("SUPABASE_REQUEST_TIMEOUT_SECS", 10),
            api_port: parsed_var("API_PORT", 3000),
            scheduling: SchedulingConfig::from_env(),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

fn parsed_var<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default {}", key, default);
            default
        }
    }
}

fn bounded<T>(key: &str, value: T, range: RangeInclusive<T>, default: T) -> T
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        value
    } else {
        warn!(
            "{} value {} is outside {}..={}, using default {}",
            key, value, range.start(), range.end(), default
        );
        default
    }
}
