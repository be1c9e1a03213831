use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::AvailabilityStore;
use crate::error::AvailabilityError;
use crate::models::{AvailabilityWindow, DateRange, NewAvailabilityWindow};

#[derive(Debug, Default)]
pub struct InMemoryAvailabilityStore {
    windows: RwLock<HashMap<Uuid, AvailabilityWindow>>,
}

impl InMemoryAvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.windows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.windows.read().await.is_empty()
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryAvailabilityStore {
    async fn list_windows(
        &self,
        doctor_id: Uuid,
        range: DateRange,
    ) -> Result<Vec<AvailabilityWindow>, AvailabilityError> {
        let windows = self.windows.read().await;

        let mut matching: Vec<AvailabilityWindow> = windows
            .values()
            .filter(|w| w.doctor_id == doctor_id && range.contains(w.date))
            .cloned()
            .collect();
        matching.sort_by_key(|w| (w.date, w.start_time, w.end_time));

        debug!("Found {} windows for doctor {}", matching.len(), doctor_id);
        Ok(matching)
    }

    async fn insert_window(
        &self,
        window: NewAvailabilityWindow,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        let stored = AvailabilityWindow {
            id: Uuid::new_v4(),
            doctor_id: window.doctor_id,
            date: window.date,
            start_time: window.start_time,
            end_time: window.end_time,
            created_at: Utc::now(),
        };

        self.windows.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_window(&self, id: Uuid) -> Result<Option<AvailabilityWindow>, AvailabilityError> {
        Ok(self.windows.read().await.get(&id).cloned())
    }

    async fn delete_window(&self, id: Uuid) -> Result<bool, AvailabilityError> {
        Ok(self.windows.write().await.remove(&id).is_some())
    }
}
