//! Monthly appointment quota of an establishment

use chrono::Utc;

use crate::{
    config::SchedulingConfig,
    error::AppResult,
    models::report::QuotaStatus,
    repository::Repository,
    scheduling::{
        calendar::{local_today, month_bounds},
        evaluate_quota,
    },
};

#[derive(Clone)]
pub struct QuotaService {
    repository: Repository,
    scheduling: SchedulingConfig,
}

impl QuotaService {
    pub fn new(repository: Repository, scheduling: SchedulingConfig) -> Self {
        Self { repository, scheduling }
    }

    /// Appointments booked this month (establishment-local) against the plan limit
    pub async fn current(&self, establishment_id: i32) -> AppResult<QuotaStatus> {
        let establishment = self.repository.establishments.get_by_id(establishment_id).await?;
        let tz = establishment.tz(self.scheduling.default_tz());

        let (start, end) = month_bounds(tz, local_today(tz, Utc::now()));
        let count = self.repository.appointments.count(establishment_id, start, end).await?;
        let max = self
            .repository
            .establishments
            .get_plan(establishment_id)
            .await?
            .and_then(|p| p.max_monthly_appointments);

        Ok(evaluate_quota(count, max))
    }
}
