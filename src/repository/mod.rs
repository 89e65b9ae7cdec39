//! Repository layer for database operations

pub mod appointments;
pub mod catalog;
pub mod establishments;
pub mod finances;
pub mod loyalty;
pub mod outbox;
pub mod schedules;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub appointments: appointments::AppointmentsRepository,
    pub catalog: catalog::CatalogRepository,
    pub establishments: establishments::EstablishmentsRepository,
    pub finances: finances::FinancesRepository,
    pub loyalty: loyalty::LoyaltyRepository,
    pub outbox: outbox::OutboxRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            appointments: appointments::AppointmentsRepository::new(pool.clone()),
            catalog: catalog::CatalogRepository::new(pool.clone()),
            establishments: establishments::EstablishmentsRepository::new(pool.clone()),
            finances: finances::FinancesRepository::new(pool.clone()),
            loyalty: loyalty::LoyaltyRepository::new(pool.clone()),
            outbox: outbox::OutboxRepository::new(pool.clone()),
            pool,
        }
    }
}
