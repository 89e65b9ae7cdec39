//! Business logic services

pub mod appointments;
pub mod availability;
pub mod commission;
pub mod email;
pub mod notifier;
pub mod outbox;
pub mod quota;
pub mod redis;
pub mod schedules;
pub mod webhooks;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub appointments: appointments::AppointmentsService,
    pub availability: availability::AvailabilityService,
    pub quota: quota::QuotaService,
    pub commission: commission::CommissionService,
    pub schedules: schedules::SchedulesService,
    pub completions: outbox::CompletionProcessor,
    pub dispatcher: notifier::Dispatcher,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig, redis_service: redis::RedisService) -> AppResult<Self> {
        let email = email::EmailService::new(config.email.clone());
        let dispatcher = notifier::Dispatcher::new(vec![
            Arc::new(redis_service),
            Arc::new(email::EmailChannel::new(email, repository.establishments.clone())),
            Arc::new(webhooks::WebhookChannel::new(&config.webhooks, repository.establishments.clone())?),
        ]);

        let scheduling = config.scheduling.clone();
        let completions = outbox::CompletionProcessor::new(
            repository.clone(),
            dispatcher.clone(),
            config.outbox.clone(),
            scheduling.default_tz(),
        );

        Ok(Self {
            appointments: appointments::AppointmentsService::new(
                repository.clone(),
                dispatcher.clone(),
                completions.clone(),
                scheduling.clone(),
            ),
            availability: availability::AvailabilityService::new(repository.clone(), scheduling.clone()),
            quota: quota::QuotaService::new(repository.clone(), scheduling.clone()),
            commission: commission::CommissionService::new(repository.clone(), scheduling),
            schedules: schedules::SchedulesService::new(repository.clone()),
            completions,
            dispatcher,
            repository,
        })
    }
}
