use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_SLOT_LENGTH_MINUTES: i64 = 30;
pub const DEFAULT_BOOKING_HORIZON_DAYS: i64 = 7;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_key: String,
    pub supabase_jwt_secret: String,
    pub slot_length_minutes: i64,
    pub booking_horizon_days: i64,
    pub port: u16,
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
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            slot_length_minutes: parse_or_default(
                "SLOT_LENGTH_MINUTES",
                env::var("SLOT_LENGTH_MINUTES").ok(),
                DEFAULT_SLOT_LENGTH_MINUTES,
            ),
            booking_horizon_days: parse_or_default(
                "BOOKING_HORIZON_DAYS",
                env::var("BOOKING_HORIZON_DAYS").ok(),
                DEFAULT_BOOKING_HORIZON_DAYS,
            ),
            port: parse_or_default("PORT", env::var("PORT").ok(), DEFAULT_PORT),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    /// Appointments and availability live in Supabase rather than process memory.
    pub fn uses_remote_store(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_key: String::new(),
            supabase_jwt_secret: String::new(),
            slot_length_minutes: DEFAULT_SLOT_LENGTH_MINUTES,
            booking_horizon_days: DEFAULT_BOOKING_HORIZON_DAYS,
            port: DEFAULT_PORT,
        }
    }
}

fn parse_or_default<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", name, value, default);
            default
        }),
    }
}
