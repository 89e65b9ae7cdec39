//! Outbound webhooks for appointment events

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use super::notifier::{DomainEvent, EventKind, NotificationChannel};
use crate::{
    config::WebhookConfig,
    error::{AppError, AppResult},
    repository::establishments::EstablishmentsRepository,
};

#[derive(Clone)]
pub struct WebhookChannel {
    client: reqwest::Client,
    establishments: EstablishmentsRepository,
}

impl WebhookChannel {
    pub fn new(config: &WebhookConfig, establishments: EstablishmentsRepository) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("salon-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, establishments })
    }
}

/// Only appointment events are exposed to webhook subscribers
fn is_published(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::AppointmentCreated
            | EventKind::AppointmentUpdated
            | EventKind::AppointmentDeleted
            | EventKind::AppointmentStatusChanged
    )
}

fn payload(event: &DomainEvent) -> serde_json::Value {
    json!({
        "event": event.kind.as_str(),
        "establishment_id": event.establishment_id,
        "occurred_at": event.occurred_at,
        "data": event.data,
    })
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, event: &DomainEvent) -> AppResult<()> {
        if !is_published(event.kind) {
            return Ok(());
        }

        let subscriptions = self
            .establishments
            .webhooks_for(event.establishment_id, event.kind.as_str())
            .await?;
        if subscriptions.is_empty() {
            return Ok(());
        }

        let body = payload(event);
        let mut failures = Vec::new();

        for subscription in subscriptions {
            let delivery_id = Uuid::new_v4();
            let result = self
                .client
                .post(&subscription.url)
                .header("X-Delivery-Id", delivery_id.to_string())
                .json(&body)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match result {
                Ok(_) => tracing::debug!("Webhook {} delivered ({})", subscription.id, delivery_id),
                Err(e) => failures.push(format!("webhook {}: {}", subscription.id, e)),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::Internal(failures.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_appointment_events_are_published() {
        assert!(is_published(EventKind::AppointmentCreated));
        assert!(is_published(EventKind::AppointmentStatusChanged));
        assert!(!is_published(EventKind::FinancialChanged));
        assert!(!is_published(EventKind::DashboardStatsChanged));
    }

    #[test]
    fn test_payload_shape() {
        let event = DomainEvent::new(EventKind::AppointmentDeleted, 5, json!({ "id": 12 }));
        let body = payload(&event);
        assert_eq!(body["event"], "appointment_deleted");
        assert_eq!(body["establishment_id"], 5);
        assert_eq!(body["data"]["id"], 12);
        assert!(body.get("occurred_at").is_some());
    }
}
