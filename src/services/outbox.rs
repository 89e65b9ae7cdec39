//! Completion side effects, driven by the appointment outbox
//!
//! A status change that completes an appointment leaves an outbox row in
//! the same transaction. The row is processed right away by the request
//! that wrote it and, failing that, by the polling worker.

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::json;
use tokio::task::JoinHandle;

use super::notifier::{Dispatcher, DomainEvent, EventKind};
use crate::{
    config::OutboxConfig,
    error::{AppError, AppResult},
    models::{
        finance::{NewTransaction, COMPLETED_SERVICE_CATEGORY, DEFAULT_PAYMENT_METHOD},
        outbox::{OutboxEntry, COMPLETION_KIND},
        TransactionType,
    },
    repository::Repository,
    scheduling::calendar::local_today,
};

const BASE_RETRY_SECS: i64 = 30;
const MAX_RETRY_SECS: i64 = 3600;
/// How long a claimed entry stays invisible to other workers
const CLAIM_LEASE_SECS: i64 = 300;

/// Delay before retry number `attempts` (1-based), doubling up to an hour
pub fn retry_delay(attempts: i32) -> chrono::Duration {
    let exponent = attempts.saturating_sub(1).clamp(0, 16) as u32;
    let secs = BASE_RETRY_SECS.saturating_mul(1_i64 << exponent).min(MAX_RETRY_SECS);
    chrono::Duration::seconds(secs)
}

/// When to try again after `attempts` failures, or None to give up
pub fn next_attempt_at(attempts: i32, max_attempts: i32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (attempts < max_attempts).then(|| now + retry_delay(attempts))
}

#[derive(Clone)]
pub struct CompletionProcessor {
    repository: Repository,
    dispatcher: Dispatcher,
    config: OutboxConfig,
    default_tz: Tz,
}

impl CompletionProcessor {
    pub fn new(repository: Repository, dispatcher: Dispatcher, config: OutboxConfig, default_tz: Tz) -> Self {
        Self {
            repository,
            dispatcher,
            config,
            default_tz,
        }
    }

    /// Process the pending completion of one appointment, if any
    pub async fn process_appointment(&self, appointment_id: i32) -> AppResult<()> {
        let Some(entry) = self.repository.outbox.pending_for(appointment_id, COMPLETION_KIND).await? else {
            return Ok(());
        };
        self.claim_and_process(&entry).await?;
        Ok(())
    }

    /// Process every entry whose next attempt is due. Returns how many ran.
    pub async fn run_due(&self) -> AppResult<usize> {
        let entries = self.repository.outbox.due(Utc::now(), self.config.batch_size).await?;
        let mut processed = 0;
        for entry in &entries {
            if self.claim_and_process(entry).await? {
                processed += 1;
            }
        }
        Ok(processed)
    }

    async fn claim_and_process(&self, entry: &OutboxEntry) -> AppResult<bool> {
        let lease = Utc::now() + chrono::Duration::seconds(CLAIM_LEASE_SECS);
        if !self.repository.outbox.claim(entry.id, lease).await? {
            return Ok(false);
        }

        match self.complete(entry.appointment_id).await {
            Ok(()) => {
                self.repository.outbox.mark_done(entry.id).await?;
            }
            Err(e) => {
                let attempts = entry.attempts + 1;
                let message = e.to_string();
                match next_attempt_at(attempts, self.config.max_attempts, Utc::now()) {
                    Some(at) => {
                        tracing::warn!(
                            "Completion of appointment {} failed (attempt {}), retrying at {}: {}",
                            entry.appointment_id,
                            attempts,
                            at,
                            message
                        );
                        self.repository.outbox.mark_failed(entry.id, &message, Some(at)).await?;
                    }
                    None => {
                        tracing::error!(
                            "Completion of appointment {} abandoned after {} attempts: {}",
                            entry.appointment_id,
                            attempts,
                            message
                        );
                        self.repository.outbox.mark_failed(entry.id, &message, None).await?;
                    }
                }
            }
        }
        Ok(true)
    }

    /// Revenue record, loyalty accrual and finance events for a completed
    /// appointment. Safe to repeat.
    async fn complete(&self, appointment_id: i32) -> AppResult<()> {
        let appointment = self
            .repository
            .appointments
            .find(appointment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", appointment_id)))?;

        let service = self
            .repository
            .catalog
            .find_service_by_id(appointment.service_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Service {} of appointment {} not found",
                    appointment.service_id, appointment_id
                ))
            })?;

        let establishment = self
            .repository
            .establishments
            .get_by_id(appointment.establishment_id)
            .await?;
        let tz = establishment.tz(self.default_tz);

        let transaction = NewTransaction {
            establishment_id: appointment.establishment_id,
            appointment_id: Some(appointment.id),
            amount: service.price,
            transaction_type: TransactionType::Income,
            category: COMPLETED_SERVICE_CATEGORY.to_string(),
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            description: Some(format!("Service: {}", service.name)),
            transaction_date: local_today(tz, Utc::now()),
        };

        match self.repository.finances.insert_completed_service(&transaction).await? {
            Some(t) => tracing::info!(
                "Recorded revenue {} for appointment {} (transaction {})",
                t.amount,
                appointment.id,
                t.id
            ),
            None => tracing::debug!("Revenue for appointment {} already recorded", appointment.id),
        }

        let programs = self
            .repository
            .loyalty
            .programs_for_service(appointment.establishment_id, service.id)
            .await?;
        let description = format!("Points for {}", service.name);

        for program in programs.iter().filter(|p| p.rewards(service.id)) {
            match self
                .repository
                .loyalty
                .accrue(program, appointment.client_id, appointment.id, &description)
                .await
            {
                Ok(true) => tracing::info!(
                    "Client {} earned {} points in program {}",
                    appointment.client_id,
                    program.points_per_service,
                    program.id
                ),
                Ok(false) => {}
                Err(e) => tracing::warn!(
                    "Loyalty accrual failed for appointment {} in program {}: {}",
                    appointment.id,
                    program.id,
                    e
                ),
            }
        }

        let data = json!({ "appointment_id": appointment.id, "amount": service.price });
        for kind in [EventKind::FinancialChanged, EventKind::DashboardStatsChanged] {
            self.dispatcher
                .dispatch(&DomainEvent::new(kind, appointment.establishment_id, data.clone()))
                .await;
        }

        Ok(())
    }
}

/// Poll the outbox every `interval` for entries whose retry is due
pub fn spawn_outbox_worker(processor: CompletionProcessor, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match processor.run_due().await {
                Ok(0) => {}
                Ok(n) => tracing::info!("Processed {} outbox entries", n),
                Err(e) => tracing::error!("Outbox worker error: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_retry_delay_doubles_then_caps() {
        assert_eq!(retry_delay(1).num_seconds(), 30);
        assert_eq!(retry_delay(2).num_seconds(), 60);
        assert_eq!(retry_delay(3).num_seconds(), 120);
        assert_eq!(retry_delay(8).num_seconds(), 3600);
        assert_eq!(retry_delay(100).num_seconds(), 3600);
    }

    #[test]
    fn test_gives_up_at_max_attempts() {
        let now = Utc.with_ymd_and_hms(2025, 9, 8, 12, 0, 0).unwrap();
        assert_eq!(next_attempt_at(1, 5, now), Some(now + chrono::Duration::seconds(30)));
        assert!(next_attempt_at(4, 5, now).is_some());
        assert_eq!(next_attempt_at(5, 5, now), None);
    }
}
