//! Business hours, staff working hours and staff leave

use chrono::{NaiveDate, NaiveTime};

use crate::{
    error::{AppError, AppResult},
    models::{
        schedule::{
            BusinessHours, CreateStaffVacation, StaffVacation, StaffWorkingHours, UpsertBusinessHours,
            UpsertStaffWorkingHours,
        },
        UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct SchedulesService {
    repository: Repository,
}

fn parse_time(value: &str, field: &str) -> AppResult<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("Invalid {} (use HH:MM)", field)))
}

fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid {} (use YYYY-MM-DD)", field)))
}

/// Weekday index and time range of one schedule row
fn check_day(day_of_week: i16, start: NaiveTime, end: NaiveTime, enforce_range: bool) -> AppResult<()> {
    if !(0..=6).contains(&day_of_week) {
        return Err(AppError::Validation(format!(
            "Invalid day_of_week {} (0=Sunday .. 6=Saturday)",
            day_of_week
        )));
    }
    if enforce_range && start >= end {
        return Err(AppError::Validation(format!(
            "Opening time must be before closing time on day {}",
            day_of_week
        )));
    }
    Ok(())
}

impl SchedulesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn business_hours(&self, claims: &UserClaims) -> AppResult<Vec<BusinessHours>> {
        self.repository.schedules_business_hours(claims.establishment_id).await
    }

    /// Upsert business hours; every row is checked before any is written
    pub async fn set_business_hours(
        &self,
        claims: &UserClaims,
        days: Vec<UpsertBusinessHours>,
    ) -> AppResult<Vec<BusinessHours>> {
        claims.require_admin()?;

        let mut parsed = Vec::with_capacity(days.len());
        for day in &days {
            let open = parse_time(&day.open_time, "open_time")?;
            let close = parse_time(&day.close_time, "close_time")?;
            check_day(day.day_of_week, open, close, day.is_open)?;
            parsed.push((day, open, close));
        }

        for (day, open, close) in parsed {
            self.repository
                .schedules_upsert_business_hours(
                    claims.establishment_id,
                    day.day_of_week,
                    open,
                    close,
                    day.is_open,
                    day.is_holiday,
                )
                .await?;
        }

        self.repository.schedules_business_hours(claims.establishment_id).await
    }

    pub async fn staff_hours(&self, claims: &UserClaims, staff_id: i32) -> AppResult<Vec<StaffWorkingHours>> {
        let staff = self.repository.catalog.get_staff(claims.establishment_id, staff_id).await?;
        self.repository.schedules_staff_hours(staff.id).await
    }

    pub async fn set_staff_hours(
        &self,
        claims: &UserClaims,
        staff_id: i32,
        days: Vec<UpsertStaffWorkingHours>,
    ) -> AppResult<Vec<StaffWorkingHours>> {
        claims.require_admin()?;
        let staff = self.repository.catalog.get_staff(claims.establishment_id, staff_id).await?;

        let mut parsed = Vec::with_capacity(days.len());
        for day in &days {
            let start = parse_time(&day.start_time, "start_time")?;
            let end = parse_time(&day.end_time, "end_time")?;
            check_day(day.day_of_week, start, end, day.is_available)?;
            parsed.push((day, start, end));
        }

        for (day, start, end) in parsed {
            self.repository
                .schedules_upsert_staff_hours(staff.id, day.day_of_week, start, end, day.is_available)
                .await?;
        }

        self.repository.schedules_staff_hours(staff.id).await
    }

    pub async fn vacations(&self, claims: &UserClaims, staff_id: i32) -> AppResult<Vec<StaffVacation>> {
        let staff = self.repository.catalog.get_staff(claims.establishment_id, staff_id).await?;
        self.repository.schedules_list_vacations(staff.id).await
    }

    pub async fn create_vacation(
        &self,
        claims: &UserClaims,
        staff_id: i32,
        data: CreateStaffVacation,
    ) -> AppResult<StaffVacation> {
        claims.require_admin()?;
        let staff = self.repository.catalog.get_staff(claims.establishment_id, staff_id).await?;

        let start = parse_date(&data.start_date, "start_date")?;
        let end = parse_date(&data.end_date, "end_date")?;
        if end < start {
            return Err(AppError::Validation("end_date must not be before start_date".to_string()));
        }

        let vacation = self
            .repository
            .schedules_create_vacation(
                claims.establishment_id,
                staff.id,
                start,
                end,
                data.vacation_type,
                data.reason.as_deref(),
            )
            .await?;

        tracing::info!(
            "Staff {} on {} from {} to {}",
            staff.id,
            vacation.vacation_type,
            vacation.start_date,
            vacation.end_date
        );
        Ok(vacation)
    }

    pub async fn delete_vacation(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_admin()?;
        self.repository.schedules_deactivate_vacation(claims.establishment_id, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("09:30", "open_time").unwrap(), hm(9, 30));
        assert_eq!(parse_time("18:00:00", "close_time").unwrap(), hm(18, 0));
        assert!(parse_time("9h", "open_time").is_err());
    }

    #[test]
    fn test_check_day() {
        assert!(check_day(0, hm(9, 0), hm(18, 0), true).is_ok());
        assert!(check_day(7, hm(9, 0), hm(18, 0), true).is_err());
        assert!(check_day(1, hm(18, 0), hm(9, 0), true).is_err());
        // Closed days keep whatever times they had
        assert!(check_day(1, hm(0, 0), hm(0, 0), false).is_ok());
    }
}
