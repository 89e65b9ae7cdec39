//! Schedules domain methods on Repository (business hours, staff hours, leave)

use chrono::{NaiveDate, NaiveTime};

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::VacationType,
        schedule::{BusinessHours, StaffVacation, StaffWorkingHours},
    },
};

impl Repository {
    // ---- Business hours ----

    /// Business hours of an establishment, by weekday
    pub async fn schedules_business_hours(&self, establishment_id: i32) -> AppResult<Vec<BusinessHours>> {
        let rows = sqlx::query_as::<_, BusinessHours>(
            "SELECT * FROM business_hours WHERE establishment_id = $1 ORDER BY day_of_week",
        )
        .bind(establishment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert or replace the business hours of one weekday
    pub async fn schedules_upsert_business_hours(
        &self,
        establishment_id: i32,
        day_of_week: i16,
        open_time: NaiveTime,
        close_time: NaiveTime,
        is_open: bool,
        is_holiday: bool,
    ) -> AppResult<BusinessHours> {
        let row = sqlx::query_as::<_, BusinessHours>(
            r#"
            INSERT INTO business_hours (establishment_id, day_of_week, open_time, close_time, is_open, is_holiday)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (establishment_id, day_of_week)
            DO UPDATE SET open_time = EXCLUDED.open_time, close_time = EXCLUDED.close_time,
                          is_open = EXCLUDED.is_open, is_holiday = EXCLUDED.is_holiday
            RETURNING *
            "#,
        )
        .bind(establishment_id)
        .bind(day_of_week)
        .bind(open_time)
        .bind(close_time)
        .bind(is_open)
        .bind(is_holiday)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // ---- Staff working hours ----

    pub async fn schedules_staff_hours(&self, staff_id: i32) -> AppResult<Vec<StaffWorkingHours>> {
        let rows = sqlx::query_as::<_, StaffWorkingHours>(
            "SELECT * FROM staff_working_hours WHERE staff_id = $1 ORDER BY day_of_week",
        )
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn schedules_upsert_staff_hours(
        &self,
        staff_id: i32,
        day_of_week: i16,
        start_time: NaiveTime,
        end_time: NaiveTime,
        is_available: bool,
    ) -> AppResult<StaffWorkingHours> {
        let row = sqlx::query_as::<_, StaffWorkingHours>(
            r#"
            INSERT INTO staff_working_hours (staff_id, day_of_week, start_time, end_time, is_available)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (staff_id, day_of_week)
            DO UPDATE SET start_time = EXCLUDED.start_time, end_time = EXCLUDED.end_time,
                          is_available = EXCLUDED.is_available
            RETURNING *
            "#,
        )
        .bind(staff_id)
        .bind(day_of_week)
        .bind(start_time)
        .bind(end_time)
        .bind(is_available)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // ---- Leave ----

    /// Active leave periods of a staff member touching `[from, to]`
    pub async fn schedules_vacations_between(
        &self,
        staff_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<StaffVacation>> {
        let rows = sqlx::query_as::<_, StaffVacation>(
            r#"
            SELECT * FROM staff_vacations
            WHERE staff_id = $1 AND is_active AND start_date <= $3 AND end_date >= $2
            ORDER BY start_date
            "#,
        )
        .bind(staff_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All active leave periods of a staff member
    pub async fn schedules_list_vacations(&self, staff_id: i32) -> AppResult<Vec<StaffVacation>> {
        let rows = sqlx::query_as::<_, StaffVacation>(
            "SELECT * FROM staff_vacations WHERE staff_id = $1 AND is_active ORDER BY start_date DESC",
        )
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn schedules_create_vacation(
        &self,
        establishment_id: i32,
        staff_id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
        vacation_type: VacationType,
        reason: Option<&str>,
    ) -> AppResult<StaffVacation> {
        let row = sqlx::query_as::<_, StaffVacation>(
            r#"
            INSERT INTO staff_vacations (staff_id, establishment_id, start_date, end_date, vacation_type, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(staff_id)
        .bind(establishment_id)
        .bind(start_date)
        .bind(end_date)
        .bind(vacation_type)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Deactivate a leave period
    pub async fn schedules_deactivate_vacation(&self, establishment_id: i32, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE staff_vacations SET is_active = FALSE WHERE id = $1 AND establishment_id = $2",
        )
        .bind(id)
        .bind(establishment_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Staff leave {} not found", id)));
        }
        Ok(())
    }
}
