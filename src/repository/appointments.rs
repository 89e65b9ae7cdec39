//! Appointments repository
//!
//! Writes that must not race (new bookings, moves, status changes) run in
//! a transaction on a single connection; the functions taking a
//! `&mut PgConnection` are meant to be called with `&mut *tx`.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        appointment::{NewAppointment, NewNotification},
        outbox::COMPLETION_KIND,
        report::CompletedServiceRow,
        Appointment, AppointmentDetails, AppointmentStatus,
    },
    scheduling::{triggers_completion, Occupied},
};

/// Advisory lock namespaces (first key of `pg_advisory_xact_lock(int, int)`)
const ESTABLISHMENT_LOCK: i32 = 1;
const STAFF_LOCK: i32 = 2;

const DETAILS_SELECT: &str = r#"
    SELECT a.id, a.establishment_id,
           a.client_id, c.name AS client_name,
           a.staff_id, st.name AS staff_name,
           a.service_id, sv.name AS service_name, sv.price,
           a.start_at, a.end_at, a.duration_minutes, a.status, a.notes
    FROM appointments a
    JOIN clients c ON c.id = a.client_id
    JOIN staff st ON st.id = a.staff_id
    JOIN services sv ON sv.id = a.service_id
"#;

/// Listing filter
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub establishment_id: i32,
    /// Restrict to one staff member
    pub staff_id: Option<i32>,
    /// `[start, end)` on the start instant
    pub range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub status: Option<AppointmentStatus>,
    pub page: i64,
    pub per_page: i64,
}

#[derive(Clone)]
pub struct AppointmentsRepository {
    pool: Pool<Postgres>,
}

impl AppointmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Start a transaction for a locked write
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// List appointments with filters and pagination
    pub async fn list(&self, filter: &AppointmentFilter) -> AppResult<(Vec<AppointmentDetails>, i64)> {
        let page = filter.page.max(1);
        let per_page = filter.per_page.clamp(1, 200);
        let offset = (page - 1) * per_page;

        let mut conditions = vec!["a.establishment_id = $1".to_string()];
        let mut idx = 2;

        if filter.staff_id.is_some() {
            conditions.push(format!("a.staff_id = ${}", idx));
            idx += 1;
        }
        if filter.range.is_some() {
            conditions.push(format!("a.start_at >= ${} AND a.start_at < ${}", idx, idx + 1));
            idx += 2;
        }
        if filter.status.is_some() {
            conditions.push(format!("a.status = ${}", idx));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let count_q = format!("SELECT COUNT(*) FROM appointments a {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q).bind(filter.establishment_id);
        if let Some(staff_id) = filter.staff_id { count_builder = count_builder.bind(staff_id); }
        if let Some((start, end)) = filter.range { count_builder = count_builder.bind(start).bind(end); }
        if let Some(status) = filter.status { count_builder = count_builder.bind(status); }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "{} {} ORDER BY a.start_at LIMIT {} OFFSET {}",
            DETAILS_SELECT, where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, AppointmentDetails>(&select_q).bind(filter.establishment_id);
        if let Some(staff_id) = filter.staff_id { builder = builder.bind(staff_id); }
        if let Some((start, end)) = filter.range { builder = builder.bind(start).bind(end); }
        if let Some(status) = filter.status { builder = builder.bind(status); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    /// Get an appointment of the establishment by ID
    pub async fn get_by_id(&self, establishment_id: i32, id: i32) -> AppResult<Appointment> {
        sqlx::query_as::<_, Appointment>(
            "SELECT * FROM appointments WHERE id = $1 AND establishment_id = $2",
        )
        .bind(id)
        .bind(establishment_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    /// Get an appointment by ID regardless of establishment (background work)
    pub async fn find(&self, id: i32) -> AppResult<Option<Appointment>> {
        let row = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Appointment with client, staff and service names
    pub async fn get_details(&self, establishment_id: i32, id: i32) -> AppResult<AppointmentDetails> {
        let query = format!("{} WHERE a.id = $1 AND a.establishment_id = $2", DETAILS_SELECT);
        sqlx::query_as::<_, AppointmentDetails>(&query)
            .bind(id)
            .bind(establishment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    /// Serialize quota checks of an establishment until the transaction ends
    pub async fn lock_establishment(conn: &mut PgConnection, establishment_id: i32) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(ESTABLISHMENT_LOCK)
            .bind(establishment_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Serialize slot checks of a staff member until the transaction ends
    pub async fn lock_staff(conn: &mut PgConnection, staff_id: i32) -> AppResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(STAFF_LOCK)
            .bind(staff_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Appointments holding time between `start` and `end`, for one staff
    /// member or the whole establishment
    pub async fn occupied_between<'e, E>(
        executor: E,
        establishment_id: i32,
        staff_id: Option<i32>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Occupied>>
    where
        E: PgExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE establishment_id = $1
              AND ($2::INTEGER IS NULL OR staff_id = $2)
              AND start_at < $4 AND end_at >= $3
              AND status <> 'cancelled'
            ORDER BY start_at
            "#,
        )
        .bind(establishment_id)
        .bind(staff_id)
        .bind(start)
        .bind(end)
        .fetch_all(executor)
        .await?;

        Ok(Occupied::from_appointments(&rows))
    }

    /// Pool-backed `occupied_between`, for read-only availability queries
    pub async fn occupied(
        &self,
        establishment_id: i32,
        staff_id: Option<i32>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Occupied>> {
        Self::occupied_between(&self.pool, establishment_id, staff_id, start, end).await
    }

    /// Appointments counted against the monthly quota (cancelled ones excluded)
    pub async fn count_between<'e, E>(
        executor: E,
        establishment_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<i64>
    where
        E: PgExecutor<'e>,
    {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM appointments
            WHERE establishment_id = $1
              AND start_at >= $2 AND start_at < $3
              AND status <> 'cancelled'
            "#,
        )
        .bind(establishment_id)
        .bind(start)
        .bind(end)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    pub async fn count(&self, establishment_id: i32, start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<i64> {
        Self::count_between(&self.pool, establishment_id, start, end).await
    }

    /// Insert a scheduled appointment and its notification
    pub async fn insert(
        conn: &mut PgConnection,
        data: &NewAppointment,
        notification: &NewNotification,
    ) -> AppResult<Appointment> {
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (
                establishment_id, client_id, staff_id, service_id,
                start_at, end_at, duration_minutes, status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(data.establishment_id)
        .bind(data.client_id)
        .bind(data.staff_id)
        .bind(data.service_id)
        .bind(data.start_at)
        .bind(data.end_at)
        .bind(data.duration_minutes)
        .bind(AppointmentStatus::Scheduled)
        .bind(&data.notes)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO notifications (establishment_id, appointment_id, staff_id, title, message)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(appointment.establishment_id)
        .bind(appointment.id)
        .bind(appointment.staff_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .execute(&mut *conn)
        .await?;

        Ok(appointment)
    }

    /// Rewrite the booking fields of an appointment
    pub async fn update(conn: &mut PgConnection, id: i32, data: &NewAppointment) -> AppResult<Appointment> {
        sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET client_id = $2, staff_id = $3, service_id = $4,
                start_at = $5, end_at = $6, duration_minutes = $7,
                notes = $8, updated_at = NOW()
            WHERE id = $1 AND establishment_id = $9
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.client_id)
        .bind(data.staff_id)
        .bind(data.service_id)
        .bind(data.start_at)
        .bind(data.end_at)
        .bind(data.duration_minutes)
        .bind(&data.notes)
        .bind(data.establishment_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))
    }

    /// Set the status in its own transaction. See [`Self::set_status`].
    pub async fn update_status(
        &self,
        establishment_id: i32,
        id: i32,
        status: AppointmentStatus,
    ) -> AppResult<(AppointmentStatus, Appointment, bool)> {
        let mut tx = self.pool.begin().await?;
        let result = Self::set_status(&mut *tx, establishment_id, id, status).await?;
        tx.commit().await?;
        Ok(result)
    }

    /// Set the status. When the change completes the appointment, its
    /// completion side effects are recorded in the outbox on the same
    /// connection, so both land in one transaction.
    ///
    /// Returns the previous status, the updated row and whether an outbox
    /// entry was created.
    pub async fn set_status(
        conn: &mut PgConnection,
        establishment_id: i32,
        id: i32,
        status: AppointmentStatus,
    ) -> AppResult<(AppointmentStatus, Appointment, bool)> {
        let previous: AppointmentStatus = sqlx::query_scalar(
            "SELECT status FROM appointments WHERE id = $1 AND establishment_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(establishment_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))?;

        let appointment = sqlx::query_as::<_, Appointment>(
            "UPDATE appointments SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut *conn)
        .await?;

        let mut enqueued = false;
        if triggers_completion(previous, status) {
            let result = sqlx::query(
                r#"
                INSERT INTO appointment_outbox (appointment_id, kind)
                VALUES ($1, $2)
                ON CONFLICT (appointment_id, kind) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(COMPLETION_KIND)
            .execute(&mut *conn)
            .await?;
            enqueued = result.rows_affected() > 0;
        }

        Ok((previous, appointment, enqueued))
    }

    /// Delete an appointment and its notifications
    pub async fn delete(&self, establishment_id: i32, id: i32) -> AppResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM notifications WHERE appointment_id = $1 AND establishment_id = $2")
            .bind(id)
            .bind(establishment_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query_as::<_, Appointment>(
            "DELETE FROM appointments WHERE id = $1 AND establishment_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(establishment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", id)))?;

        tx.commit().await?;
        Ok(deleted)
    }

    /// Completed appointments of a staff member starting in `[start, end)`
    pub async fn completed_for_staff(
        &self,
        establishment_id: i32,
        staff_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<CompletedServiceRow>> {
        let rows = sqlx::query_as::<_, CompletedServiceRow>(
            r#"
            SELECT a.id AS appointment_id, a.start_at,
                   c.name AS client_name, sv.name AS service_name, sv.price
            FROM appointments a
            JOIN clients c ON c.id = a.client_id
            JOIN services sv ON sv.id = a.service_id
            WHERE a.establishment_id = $1
              AND a.staff_id = $2
              AND a.status = $3
              AND a.start_at >= $4 AND a.start_at < $5
            ORDER BY a.start_at
            "#,
        )
        .bind(establishment_id)
        .bind(staff_id)
        .bind(AppointmentStatus::Completed)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
