pub(crate) mod controllers;
pub(crate) mod core;
pub(crate) mod routes;
pub mod token;
pub(crate) mod types;
pub(crate) mod utils;

use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use crate::core::error::ConfigError as Error;
use crate::core::{config::Args, state::AppState};

pub async fn run() -> Result<(), Error> {
    let config = Args::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.log_level).unwrap_or_default())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url())
        .await
        .map_err(Error::DatabaseConnection)?;

    if config.run_migrations {
        sqlx::migrate!().run(&pool).await?;
    }

    let state = AppState::new(pool, &config)?;
    let app = routes::router::routes(state, config.rate_limit_per_second);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!("listening on port {}", config.port);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
