//! Salon Server - appointment scheduling for multi-tenant salons

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salon_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::{outbox::spawn_outbox_worker, redis::RedisService, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config.logging);

    tracing::info!("Starting Salon Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let redis_service = RedisService::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;

    tracing::info!("Connected to Redis");

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );
    let poll_interval = Duration::from_secs(config.outbox.poll_interval_secs.max(1));

    let repository = Repository::new(pool);
    let services = Services::new(repository, &config, redis_service).context("Failed to create services")?;

    let worker = spawn_outbox_worker(services.completions.clone(), poll_interval);

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    worker.abort();
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("salon_server={},tower_http=debug", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Static appointment paths are matched ahead of `/appointments/:id`
    let api_v1 = Router::new()
        // Health
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Appointments
        .route(
            "/appointments",
            get(api::appointments::list_appointments).post(api::appointments::create_appointment),
        )
        .route("/appointments/available-slots", get(api::availability::available_slots))
        .route("/appointments/quota", get(api::quota::get_quota))
        .route(
            "/appointments/:id",
            get(api::appointments::get_appointment)
                .put(api::appointments::update_appointment)
                .delete(api::appointments::delete_appointment),
        )
        .route("/appointments/:id/status", patch(api::appointments::update_appointment_status))
        // Staff
        .route("/staff/commission", post(api::commission::commission_report))
        .route(
            "/staff/:id/working-hours",
            get(api::schedules::get_staff_hours).put(api::schedules::update_staff_hours),
        )
        .route(
            "/staff/:id/vacations",
            get(api::schedules::list_vacations).post(api::schedules::create_vacation),
        )
        .route("/staff/vacations/:id", delete(api::schedules::delete_vacation))
        // Business hours
        .route(
            "/business-hours",
            get(api::schedules::get_business_hours).put(api::schedules::update_business_hours),
        )
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
}
