//! Redis pub/sub broadcast of establishment events
//!
//! The websocket gateway subscribes to `establishment:{id}` and
//! `establishment:{id}:staff:{staff_id}` and relays messages to browsers.

use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use super::notifier::{DomainEvent, NotificationChannel};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client })
    }

    /// Publish a payload on a channel
    pub async fn publish(&self, channel: &str, payload: &str) -> AppResult<()> {
        let mut conn = self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        conn.publish::<_, _, ()>(channel, payload)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to publish on {}: {}", channel, e)))?;

        Ok(())
    }
}

/// Pub/sub channels an event is published on
pub fn broadcast_channels(event: &DomainEvent) -> Vec<String> {
    let mut channels = vec![format!("establishment:{}", event.establishment_id)];
    if let Some(staff_id) = event.staff_id {
        channels.push(format!("establishment:{}:staff:{}", event.establishment_id, staff_id));
    }
    channels
}

#[async_trait]
impl NotificationChannel for RedisService {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    async fn deliver(&self, event: &DomainEvent) -> AppResult<()> {
        let payload = serde_json::to_string(event)
            .map_err(|e| AppError::Internal(format!("Failed to encode event: {}", e)))?;

        for channel in broadcast_channels(event) {
            self.publish(&channel, &payload).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifier::EventKind;
    use serde_json::json;

    #[test]
    fn test_channels_scoped_to_staff() {
        let event = DomainEvent::new(EventKind::AppointmentUpdated, 2, json!({})).for_staff(9);
        assert_eq!(
            broadcast_channels(&event),
            vec!["establishment:2".to_string(), "establishment:2:staff:9".to_string()]
        );
    }

    #[test]
    fn test_establishment_only_channel() {
        let event = DomainEvent::new(EventKind::FinancialChanged, 2, json!({}));
        assert_eq!(broadcast_channels(&event), vec!["establishment:2".to_string()]);
    }
}
