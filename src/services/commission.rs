//! Staff commission reports

use chrono::NaiveDate;

use crate::{
    config::SchedulingConfig,
    error::{AppError, AppResult},
    models::{
        report::{CommissionReport, CommissionRequest},
        UserClaims,
    },
    repository::Repository,
    scheduling::{build_commission_report, calendar::range_bounds},
};

#[derive(Clone)]
pub struct CommissionService {
    repository: Repository,
    scheduling: SchedulingConfig,
}

fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid {} (use YYYY-MM-DD)", field)))
}

impl CommissionService {
    pub fn new(repository: Repository, scheduling: SchedulingConfig) -> Self {
        Self { repository, scheduling }
    }

    /// Commission of a staff member over an inclusive date range.
    ///
    /// Staff members always get their own report; admins must name one.
    pub async fn report(&self, claims: &UserClaims, request: &CommissionRequest) -> AppResult<CommissionReport> {
        let staff_id = match (claims.staff_scope()?, request.staff_id) {
            (Some(own), None) => own,
            (Some(_), Some(requested)) => {
                claims.require_staff_access(requested)?;
                requested
            }
            (None, Some(requested)) => requested,
            (None, None) => return Err(AppError::Validation("staff_id is required".to_string())),
        };

        let start_date = parse_date(&request.start_date, "start_date")?;
        let end_date = parse_date(&request.end_date, "end_date")?;
        if end_date < start_date {
            return Err(AppError::Validation("end_date must not be before start_date".to_string()));
        }

        let establishment_id = claims.establishment_id;
        let staff = self.repository.catalog.get_staff(establishment_id, staff_id).await?;
        let establishment = self.repository.establishments.get_by_id(establishment_id).await?;
        let tz = establishment.tz(self.scheduling.default_tz());

        let (start, end) = range_bounds(tz, start_date, end_date);
        let rows = self
            .repository
            .appointments
            .completed_for_staff(establishment_id, staff.id, start, end)
            .await?;

        Ok(build_commission_report(&staff, start_date, end_date, tz, &rows))
    }
}
