//! Appointment lifecycle: booking, edits, status changes and deletion

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde_json::json;

use super::{
    notifier::{AppointmentSummary, Dispatcher, DomainEvent, EventKind},
    outbox::CompletionProcessor,
};
use crate::{
    config::SchedulingConfig,
    error::{AppError, AppResult, BookingRejection},
    models::{
        appointment::{AppointmentPage, AppointmentQuery, CreateAppointment, NewAppointment, UpdateAppointment},
        Appointment, AppointmentDetails, AppointmentStatus, Client, SalonService, Staff, UserClaims,
    },
    repository::{
        appointments::{AppointmentFilter, AppointmentsRepository},
        Repository,
    },
    scheduling::{
        calendar::{day_bounds, local_today, month_bounds, month_start, parse_month},
        ensure_quota, evaluate_quota, moves_into_month, occupied_end, parse_date_time, reclaims_slot,
        validate_booking, validate_revival, Occupied, SlotContext, StaffDay,
    },
};

const DEFAULT_PAGE_SIZE: i64 = 50;

/// Everything a booking is checked against, loaded before the locked section
struct BookingRequest {
    establishment_id: i32,
    tz: Tz,
    service: SalonService,
    client: Client,
    staff: Staff,
    date: NaiveDate,
    time: NaiveTime,
    notes: Option<String>,
}

impl BookingRequest {
    fn summary(&self) -> AppointmentSummary {
        AppointmentSummary {
            client_name: self.client.name.clone(),
            service_name: self.service.name.clone(),
            staff_name: self.staff.name.clone(),
            date: self.date,
            time: self.time.format("%H:%M").to_string(),
            price: self.service.price,
        }
    }
}

#[derive(Clone)]
pub struct AppointmentsService {
    repository: Repository,
    dispatcher: Dispatcher,
    completions: CompletionProcessor,
    scheduling: SchedulingConfig,
}

impl AppointmentsService {
    pub fn new(
        repository: Repository,
        dispatcher: Dispatcher,
        completions: CompletionProcessor,
        scheduling: SchedulingConfig,
    ) -> Self {
        Self {
            repository,
            dispatcher,
            completions,
            scheduling,
        }
    }

    async fn establishment_tz(&self, establishment_id: i32) -> AppResult<Tz> {
        let establishment = self.repository.establishments.get_by_id(establishment_id).await?;
        Ok(establishment.tz(self.scheduling.default_tz()))
    }

    /// Monthly appointment limit of the establishment's plan
    async fn max_monthly(&self, establishment_id: i32) -> AppResult<Option<i32>> {
        let plan = self.repository.establishments.get_plan(establishment_id).await?;
        Ok(plan.and_then(|p| p.max_monthly_appointments))
    }

    /// List appointments; staff members only see their own
    pub async fn list(&self, claims: &UserClaims, query: &AppointmentQuery) -> AppResult<AppointmentPage> {
        let staff_id = claims.staff_scope()?;

        let range = match query.month.as_deref() {
            Some(month) => {
                let first = parse_month(month)
                    .ok_or_else(|| AppError::Validation("Invalid month (use YYYY-MM)".to_string()))?;
                let tz = self.establishment_tz(claims.establishment_id).await?;
                Some(month_bounds(tz, first))
            }
            None => None,
        };

        let status = query
            .status
            .as_deref()
            .map(str::parse::<AppointmentStatus>)
            .transpose()
            .map_err(AppError::Validation)?;

        let filter = AppointmentFilter {
            establishment_id: claims.establishment_id,
            staff_id,
            range,
            status,
            page: query.page.unwrap_or(1),
            per_page: query.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
        };

        let (items, total) = self.repository.appointments.list(&filter).await?;
        Ok(AppointmentPage {
            items,
            total,
            page: filter.page.max(1),
            per_page: filter.per_page.clamp(1, 200),
        })
    }

    pub async fn get(&self, claims: &UserClaims, id: i32) -> AppResult<AppointmentDetails> {
        let details = self.repository.appointments.get_details(claims.establishment_id, id).await?;
        claims.require_staff_access(details.staff_id)?;
        Ok(details)
    }

    /// Load and check the parts of a booking that do not depend on other
    /// bookings
    async fn prepare(
        &self,
        establishment_id: i32,
        service_id: i32,
        client_id: i32,
        staff_id: i32,
        date: Option<&str>,
        time: Option<&str>,
        notes: Option<String>,
    ) -> AppResult<BookingRequest> {
        let service = self
            .repository
            .catalog
            .find_service(establishment_id, service_id)
            .await?
            .ok_or(BookingRejection::ServiceNotFound)?;

        let client = self.repository.catalog.get_client(establishment_id, client_id).await?;
        let staff = self.repository.catalog.get_staff(establishment_id, staff_id).await?;

        let (date, time) = parse_date_time(date, time)?;
        let tz = self.establishment_tz(establishment_id).await?;

        Ok(BookingRequest {
            establishment_id,
            tz,
            service,
            client,
            staff,
            date,
            time,
            notes,
        })
    }

    /// Run the booking rules against the staff member's current bookings.
    ///
    /// Must be called inside a transaction holding the staff lock.
    async fn check_slot(
        &self,
        conn: &mut sqlx::PgConnection,
        request: &BookingRequest,
        exclude: Option<i32>,
    ) -> AppResult<NewAppointment> {
        let business_hours = self.repository.schedules_business_hours(request.establishment_id).await?;
        let working_hours = self.repository.schedules_staff_hours(request.staff.id).await?;
        let vacations = self
            .repository
            .schedules_vacations_between(request.staff.id, request.date, request.date)
            .await?;

        let (day_start, day_end) = day_bounds(request.tz, request.date);
        let booked = AppointmentsRepository::occupied_between(
            &mut *conn,
            request.establishment_id,
            Some(request.staff.id),
            day_start,
            day_end,
        )
        .await?;

        let ctx = SlotContext {
            date: request.date,
            tz: request.tz,
            now: Utc::now(),
            duration_minutes: request.service.duration_minutes,
            step_minutes: self.scheduling.slot_step_minutes,
        };
        let staff_day = StaffDay {
            working_hours: &working_hours,
            vacations: &vacations,
            is_active: request.staff.is_active,
        };
        let start_at = validate_booking(&ctx, request.time, &business_hours, staff_day, &booked, exclude)?;

        Ok(NewAppointment {
            establishment_id: request.establishment_id,
            client_id: request.client.id,
            staff_id: request.staff.id,
            service_id: request.service.id,
            start_at,
            end_at: occupied_end(start_at, request.service.duration_minutes),
            duration_minutes: request.service.duration_minutes,
            notes: request.notes.clone(),
        })
    }

    /// Book an appointment
    pub async fn create(&self, claims: &UserClaims, data: CreateAppointment) -> AppResult<AppointmentDetails> {
        claims.require_staff_access(data.staff_id)?;
        let establishment_id = claims.establishment_id;

        let request = self
            .prepare(
                establishment_id,
                data.service_id,
                data.client_id,
                data.staff_id,
                data.date.as_deref(),
                data.time.as_deref(),
                data.notes,
            )
            .await?;
        let max_monthly = self.max_monthly(establishment_id).await?;

        let mut tx = self.repository.appointments.begin().await?;
        AppointmentsRepository::lock_establishment(&mut *tx, establishment_id).await?;
        AppointmentsRepository::lock_staff(&mut *tx, request.staff.id).await?;

        let new = self.check_slot(&mut *tx, &request, None).await?;

        let (month_from, month_to) = month_bounds(request.tz, local_today(request.tz, Utc::now()));
        let current = AppointmentsRepository::count_between(&mut *tx, establishment_id, month_from, month_to).await?;
        ensure_quota(evaluate_quota(current, max_monthly))?;

        let summary = request.summary();
        let appointment = AppointmentsRepository::insert(&mut *tx, &new, &summary.notification()).await?;
        tx.commit().await?;

        tracing::info!(
            "Appointment {} booked for staff {} at {}",
            appointment.id,
            appointment.staff_id,
            appointment.start_at
        );

        let details = self.repository.appointments.get_details(establishment_id, appointment.id).await?;
        self.dispatcher.spawn(
            DomainEvent::new(EventKind::AppointmentCreated, establishment_id, json!(details))
                .for_staff(appointment.staff_id)
                .with_summary(summary),
        );
        Ok(details)
    }

    /// Edit an appointment. Moving it (new date, time, service or staff
    /// member) re-runs the booking rules, ignoring its own current slot.
    /// A move into the current month from another one is also checked
    /// against the monthly quota.
    pub async fn update(&self, claims: &UserClaims, id: i32, data: UpdateAppointment) -> AppResult<AppointmentDetails> {
        let establishment_id = claims.establishment_id;
        let current = self.repository.appointments.get_by_id(establishment_id, id).await?;
        claims.require_staff_access(current.staff_id)?;
        if let Some(staff_id) = data.staff_id {
            claims.require_staff_access(staff_id)?;
        }

        let moves = data.date.is_some()
            || data.time.is_some()
            || data.service_id.is_some_and(|s| s != current.service_id)
            || data.staff_id.is_some_and(|s| s != current.staff_id);

        let tz = self.establishment_tz(establishment_id).await?;
        let local_start = current.start_at.with_timezone(&tz);
        let date = data
            .date
            .unwrap_or_else(|| local_start.date_naive().format("%Y-%m-%d").to_string());
        let time = data
            .time
            .unwrap_or_else(|| local_start.time().format("%H:%M").to_string());

        let request = self
            .prepare(
                establishment_id,
                data.service_id.unwrap_or(current.service_id),
                data.client_id.unwrap_or(current.client_id),
                data.staff_id.unwrap_or(current.staff_id),
                Some(&date),
                Some(&time),
                data.notes.or_else(|| current.notes.clone()),
            )
            .await?;

        let this_month = month_start(local_today(tz, Utc::now()));
        let joins_month = moves
            && current.status.occupies_slot()
            && moves_into_month(local_start.date_naive(), request.date, this_month);
        let max_monthly = match joins_month {
            true => self.max_monthly(establishment_id).await?,
            false => None,
        };

        let mut tx = self.repository.appointments.begin().await?;
        let updated: Appointment = if moves {
            if joins_month {
                AppointmentsRepository::lock_establishment(&mut *tx, establishment_id).await?;
            }
            AppointmentsRepository::lock_staff(&mut *tx, request.staff.id).await?;
            let new = self.check_slot(&mut *tx, &request, Some(id)).await?;
            if joins_month {
                let (month_from, month_to) = month_bounds(tz, this_month);
                let count =
                    AppointmentsRepository::count_between(&mut *tx, establishment_id, month_from, month_to).await?;
                ensure_quota(evaluate_quota(count, max_monthly))?;
            }
            AppointmentsRepository::update(&mut *tx, id, &new).await?
        } else {
            let unchanged = NewAppointment {
                establishment_id,
                client_id: request.client.id,
                staff_id: current.staff_id,
                service_id: current.service_id,
                start_at: current.start_at,
                end_at: current.end_at,
                duration_minutes: current.duration_minutes,
                notes: request.notes.clone(),
            };
            AppointmentsRepository::update(&mut *tx, id, &unchanged).await?
        };
        tx.commit().await?;

        tracing::info!("Appointment {} updated", updated.id);

        let details = self.repository.appointments.get_details(establishment_id, id).await?;
        self.dispatcher.spawn(
            DomainEvent::new(EventKind::AppointmentUpdated, establishment_id, json!(details))
                .for_staff(updated.staff_id),
        );
        Ok(details)
    }

    /// Change the status. Completing an open appointment records its
    /// revenue and loyalty points exactly once.
    pub async fn update_status(
        &self,
        claims: &UserClaims,
        id: i32,
        status: AppointmentStatus,
    ) -> AppResult<AppointmentDetails> {
        let establishment_id = claims.establishment_id;
        let current = self.repository.appointments.get_by_id(establishment_id, id).await?;
        claims.require_staff_access(current.staff_id)?;

        let (previous, updated, completion_queued) = if reclaims_slot(current.status, status) {
            self.revive(&current, status).await?
        } else {
            self.repository
                .appointments
                .update_status(establishment_id, id, status)
                .await?
        };

        tracing::info!("Appointment {} status {} -> {}", id, previous, updated.status);

        if completion_queued {
            let completions = self.completions.clone();
            tokio::spawn(async move {
                if let Err(e) = completions.process_appointment(id).await {
                    tracing::warn!("Completion of appointment {} deferred to worker: {}", id, e);
                }
            });
        }

        let details = self.repository.appointments.get_details(establishment_id, id).await?;
        self.dispatcher.spawn(
            DomainEvent::new(
                EventKind::AppointmentStatusChanged,
                establishment_id,
                json!({ "appointment": details, "previous_status": previous }),
            )
            .for_staff(updated.staff_id),
        );
        Ok(details)
    }

    /// Take a cancelled appointment's slot back, under the same locks and
    /// checks a new booking gets
    async fn revive(
        &self,
        current: &Appointment,
        status: AppointmentStatus,
    ) -> AppResult<(AppointmentStatus, Appointment, bool)> {
        let establishment_id = current.establishment_id;
        let max_monthly = self.max_monthly(establishment_id).await?;
        let tz = self.establishment_tz(establishment_id).await?;

        let mut tx = self.repository.appointments.begin().await?;
        AppointmentsRepository::lock_establishment(&mut *tx, establishment_id).await?;
        AppointmentsRepository::lock_staff(&mut *tx, current.staff_id).await?;

        let booked = AppointmentsRepository::occupied_between(
            &mut *tx,
            establishment_id,
            Some(current.staff_id),
            current.start_at,
            current.end_at + Duration::minutes(1),
        )
        .await?;
        let (month_from, month_to) = month_bounds(tz, local_today(tz, Utc::now()));
        let count = AppointmentsRepository::count_between(&mut *tx, establishment_id, month_from, month_to).await?;

        let slot = Occupied {
            appointment_id: current.id,
            start: current.start_at,
            duration_minutes: current.duration_minutes,
        };
        validate_revival(&slot, &booked, evaluate_quota(count, max_monthly))?;

        let result = AppointmentsRepository::set_status(&mut *tx, establishment_id, current.id, status).await?;
        tx.commit().await?;
        Ok(result)
    }

    /// Delete an appointment with its notifications
    pub async fn delete(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        let establishment_id = claims.establishment_id;
        let current = self.repository.appointments.get_by_id(establishment_id, id).await?;
        claims.require_staff_access(current.staff_id)?;

        let deleted = self.repository.appointments.delete(establishment_id, id).await?;
        tracing::info!("Appointment {} deleted", deleted.id);

        self.dispatcher.spawn(
            DomainEvent::new(EventKind::AppointmentDeleted, establishment_id, json!({ "id": deleted.id }))
                .for_staff(deleted.staff_id),
        );
        Ok(())
    }
}
