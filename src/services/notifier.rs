//! Side-effect dispatch for appointment and finance events
//!
//! A [`Dispatcher`] hands each [`DomainEvent`] to every registered
//! [`NotificationChannel`]. Delivery failures are logged and swallowed:
//! the operation that produced the event has already succeeded.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{error::AppResult, models::appointment::NewNotification};

/// Event names, as seen by websocket clients and webhook receivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AppointmentCreated,
    AppointmentUpdated,
    AppointmentDeleted,
    AppointmentStatusChanged,
    FinancialChanged,
    DashboardStatsChanged,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AppointmentCreated => "appointment_created",
            EventKind::AppointmentUpdated => "appointment_updated",
            EventKind::AppointmentDeleted => "appointment_deleted",
            EventKind::AppointmentStatusChanged => "appointment_status_changed",
            EventKind::FinancialChanged => "financial_changed",
            EventKind::DashboardStatsChanged => "dashboard_stats_changed",
        }
    }
}

/// Human-readable description of a booking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentSummary {
    pub client_name: String,
    pub service_name: String,
    pub staff_name: String,
    pub date: NaiveDate,
    /// Local time of day (HH:MM)
    pub time: String,
    pub price: Decimal,
}

impl AppointmentSummary {
    pub fn text(&self) -> String {
        format!(
            "Client: {}\nService: {}\nStaff: {}\nDate: {}\nTime: {}\nPrice: {:.2}",
            self.client_name,
            self.service_name,
            self.staff_name,
            self.date.format("%d/%m/%Y"),
            self.time,
            self.price
        )
    }

    /// Notification row stored with a new appointment
    pub fn notification(&self) -> NewNotification {
        NewNotification {
            title: "New appointment".to_string(),
            message: self.text(),
        }
    }
}

/// Something that happened in an establishment
#[derive(Debug, Clone, Serialize)]
pub struct DomainEvent {
    pub kind: EventKind,
    pub establishment_id: i32,
    /// Staff member concerned, for staff-scoped broadcasts
    pub staff_id: Option<i32>,
    pub occurred_at: DateTime<Utc>,
    pub data: serde_json::Value,
    /// Present on appointment_created
    #[serde(skip)]
    pub summary: Option<AppointmentSummary>,
}

impl DomainEvent {
    pub fn new(kind: EventKind, establishment_id: i32, data: serde_json::Value) -> Self {
        Self {
            kind,
            establishment_id,
            staff_id: None,
            occurred_at: Utc::now(),
            data,
            summary: None,
        }
    }

    pub fn for_staff(mut self, staff_id: i32) -> Self {
        self.staff_id = Some(staff_id);
        self
    }

    pub fn with_summary(mut self, summary: AppointmentSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}

/// A delivery target for domain events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn deliver(&self, event: &DomainEvent) -> AppResult<()>;
}

/// Fan-out of events to every channel
#[derive(Clone, Default)]
pub struct Dispatcher {
    channels: Arc<Vec<Arc<dyn NotificationChannel>>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self {
            channels: Arc::new(channels),
        }
    }

    /// Deliver to every channel in turn. Never fails.
    pub async fn dispatch(&self, event: &DomainEvent) {
        for channel in self.channels.iter() {
            if let Err(e) = channel.deliver(event).await {
                tracing::warn!(
                    "Failed to deliver {} for establishment {} via {}: {}",
                    event.kind.as_str(),
                    event.establishment_id,
                    channel.name(),
                    e
                );
            }
        }
    }

    /// Dispatch in the background
    pub fn spawn(&self, event: DomainEvent) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.dispatch(&event).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    fn event() -> DomainEvent {
        DomainEvent::new(EventKind::AppointmentCreated, 3, json!({ "id": 10 })).for_staff(4)
    }

    #[tokio::test]
    async fn test_failing_channel_does_not_stop_others() {
        let mut failing = MockNotificationChannel::new();
        failing.expect_name().return_const("broken");
        failing
            .expect_deliver()
            .times(1)
            .returning(|_| Err(AppError::Internal("smtp down".into())));

        let mut healthy = MockNotificationChannel::new();
        healthy.expect_name().return_const("healthy");
        healthy
            .expect_deliver()
            .times(1)
            .withf(|e| e.kind == EventKind::AppointmentCreated && e.staff_id == Some(4))
            .returning(|_| Ok(()));

        let dispatcher = Dispatcher::new(vec![Arc::new(failing), Arc::new(healthy)]);
        dispatcher.dispatch(&event()).await;
    }

    #[tokio::test]
    async fn test_no_channels_is_a_no_op() {
        Dispatcher::default().dispatch(&event()).await;
    }

    #[test]
    fn test_event_serializes_snake_case_kind() {
        let value = serde_json::to_value(event()).unwrap();
        assert_eq!(value["kind"], "appointment_created");
        assert_eq!(value["establishment_id"], 3);
        assert!(value.get("summary").is_none());
    }

    #[test]
    fn test_summary_text() {
        let summary = AppointmentSummary {
            client_name: "Maria".into(),
            service_name: "Corte".into(),
            staff_name: "Ana".into(),
            date: NaiveDate::from_ymd_opt(2025, 9, 8).unwrap(),
            time: "14:30".into(),
            price: Decimal::new(8000, 2),
        };
        let text = summary.text();
        assert!(text.contains("Maria"));
        assert!(text.contains("08/09/2025"));
        assert!(text.contains("14:30"));
        assert!(text.contains("80.00"));
    }
}
