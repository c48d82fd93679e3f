use std::path::Path;
use std::sync::Arc;

use crate::generation::{CourseGenerator, CoursePipeline, GeminiGenerator};
use crate::model::{DbConnection, ModelManager};
use crate::utils::signal::shutdown_signal;
use crate::video::{CacheLayer, VideoResolver, VideoSearch, YouTubeSearch};
use crate::{error::AppResult, web::AppState};
use axum::Router;
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod error;
pub mod generation;
pub mod model;
pub mod utils;
pub mod video;
pub mod web;

static APPLICATION_NAME: &str = "coursegen";

/// Builds the generation pipeline (LLM adapter, video search, cache) out of the config.
pub async fn build_pipeline(config: &'static Config, db: &DbConnection) -> AppResult<CoursePipeline> {
    let api_key = config
        .generator()
        .api_key()
        .ok_or(ConfigError::MissingApiKey("GEMINI_API_KEY"))?;
    let generator: Arc<dyn CourseGenerator> =
        Arc::new(GeminiGenerator::new(config.generator(), api_key)?);

    let search: Option<Arc<dyn VideoSearch>> = match config.video().api_key() {
        Some(key) => Some(Arc::new(YouTubeSearch::new(config.video(), key)?)),
        None => {
            tracing::warn!("YOUTUBE_API_KEY not set, video references stay as search terms.");
            None
        }
    };

    let cache = CacheLayer::from_config(config.cache(), db).await;
    let resolver = VideoResolver::new(search, cache, config.cache().ttl());

    Ok(CoursePipeline::new(generator, resolver))
}

pub async fn build_server() -> AppResult<(AppState, Router)> {
    let use_local = cfg!(debug_assertions);
    let config = config::Config::get_or_init(use_local).await;
    let db = DbConnection::connect(config.app().database_uri())?;

    let migrator = Migrator::new(Path::new("./migrations"))
        .await
        .map_err(model::DatabaseError::from)?;
    tracing::debug!("applying migrations...");
    migrator
        .run(db.pool())
        .await
        .map_err(model::DatabaseError::from)?;

    let pipeline = build_pipeline(config, &db).await?;
    let mm = ModelManager::new(db);
    let state = AppState::new(mm, pipeline);
    let app = web::routes::build_app(state.clone(), config);
    Ok((state, app))
}

/// Builds the router around an existing pool and a caller-provided pipeline.
/// Used by the integration tests to swap the external APIs for stubs.
pub async fn build_server_with_pipeline(
    db: DbConnection,
    pipeline: CoursePipeline,
) -> AppResult<(AppState, Router)> {
    let config = config::Config::get_or_init(true).await;

    let mm = ModelManager::new(db);
    let state = AppState::new(mm, pipeline);
    let app = web::routes::build_app(state.clone(), config);
    Ok((state, app))
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let (_, app) = build_server().await?;
    let config = Config::get_or_init(false).await;
    let listener = TcpListener::bind(config.host().bindto()).await?;

    tracing::info!("axum is starting at: {}", config.host().bindto());
    let axum_handle = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal());

    axum_handle.await?;
    Ok(())
}

pub fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}
