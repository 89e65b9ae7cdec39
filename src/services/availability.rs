//! Available slots for a day

use chrono::{NaiveDate, Utc};

use crate::{
    config::SchedulingConfig,
    error::{AppError, AppResult, BookingRejection},
    models::{
        appointment::{AvailabilityQuery, AvailabilityResponse},
        UserClaims,
    },
    repository::Repository,
    scheduling::{calendar::day_bounds, compute_availability, SlotContext, StaffDay},
};

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
    scheduling: SchedulingConfig,
}

impl AvailabilityService {
    pub fn new(repository: Repository, scheduling: SchedulingConfig) -> Self {
        Self { repository, scheduling }
    }

    /// Slots for `query.date`. Without a staff member, business hours
    /// alone bound the day and every booking of the establishment counts.
    pub async fn available_slots(&self, claims: &UserClaims, query: &AvailabilityQuery) -> AppResult<AvailabilityResponse> {
        let establishment_id = claims.establishment_id;
        let date = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::Validation("Invalid date (use YYYY-MM-DD)".to_string()))?;

        let service = self
            .repository
            .catalog
            .find_service(establishment_id, query.service_id)
            .await?
            .ok_or(BookingRejection::ServiceNotFound)?;

        let establishment = self.repository.establishments.get_by_id(establishment_id).await?;
        let tz = establishment.tz(self.scheduling.default_tz());
        let business_hours = self.repository.schedules_business_hours(establishment_id).await?;

        let (day_start, day_end) = day_bounds(tz, date);
        let booked = self
            .repository
            .appointments
            .occupied(establishment_id, query.staff_id, day_start, day_end)
            .await?;

        let ctx = SlotContext {
            date,
            tz,
            now: Utc::now(),
            duration_minutes: service.duration_minutes,
            step_minutes: self.scheduling.slot_step_minutes,
        };

        let response = match query.staff_id {
            Some(staff_id) => {
                let staff = self.repository.catalog.get_staff(establishment_id, staff_id).await?;
                let working_hours = self.repository.schedules_staff_hours(staff.id).await?;
                let vacations = self.repository.schedules_vacations_between(staff.id, date, date).await?;
                let staff_day = StaffDay {
                    working_hours: &working_hours,
                    vacations: &vacations,
                    is_active: staff.is_active,
                };
                compute_availability(&ctx, &business_hours, Some(staff_day), &booked)
            }
            None => compute_availability(&ctx, &business_hours, None, &booked),
        };

        Ok(response)
    }
}
