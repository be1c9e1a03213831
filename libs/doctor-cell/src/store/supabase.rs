use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use super::AvailabilityStore;
use crate::error::AvailabilityError;
use crate::models::{AvailabilityWindow, DateRange, NewAvailabilityWindow};

const WINDOWS_PATH: &str = "/rest/v1/availability_windows";

pub struct SupabaseAvailabilityStore {
    supabase: SupabaseClient,
}

impl SupabaseAvailabilityStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

fn db_error(err: anyhow::Error) -> AvailabilityError {
    AvailabilityError::Database(err.to_string())
}

#[async_trait]
impl AvailabilityStore for SupabaseAvailabilityStore {
    async fn list_windows(
        &self,
        doctor_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<AvailabilityWindow>, AvailabilityError> {
        debug!("Fetching availability for doctor {} from {} to {}", doctor_id, range.from, range.to);

        let path = format!(
            "{}?doctor_id=eq.{}&available_date=gte.{}&available_date=lte.{}&order=available_date.asc,start_time.asc",
            WINDOWS_PATH, doctor_id, range.from, range.to
        );

        self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(db_error)
    }

    async fn insert_window(
        &self,
        window: NewAvailabilityWindow,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        let row = json!({
            "doctor_id": window.doctor_id,
            "available_date": window.date,
            "start_time": window.start_time.format("%H:%M:%S").to_string(),
            "end_time": window.end_time.format("%H:%M:%S").to_string(),
        });

        let created: Vec<AvailabilityWindow> = self
            .supabase
            .request_with_headers(
                Method::POST,
                WINDOWS_PATH,
                None,
                Some(row),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(db_error)?;

        created
            .into_iter()
            .next()
            .ok_or_else(|| AvailabilityError::Database("Failed to create availability window".to_string()))
    }

    async fn get_window(&self, id: Uuid) -> Result<Option<AvailabilityWindow>, AvailabilityError> {
        let path = format!("{}?id=eq.{}", WINDOWS_PATH, id);

        let rows: Vec<AvailabilityWindow> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().next())
    }

    async fn delete_window(&self, id: Uuid) -> Result<bool, AvailabilityError> {
        let path = format!("{}?id=eq.{}", WINDOWS_PATH, id);

        let deleted: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                None,
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(db_error)?;

        Ok(!deleted.is_empty())
    }
}
