//! Salon appointment scheduling server
//!
//! Multi-tenant REST JSON API for booking appointments against business
//! hours, staff schedules and leave, with completion side effects
//! (revenue, loyalty points) and event fan-out to Redis, email and
//! webhooks.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduling;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
