//! # taskboard: a project & task management API
//!
//! `taskboard` is a single-binary HTTP API for managing users, projects, and
//! tasks, backed by PostgreSQL. It provides JWT-based authentication, audit
//! stamping on every write, and live task change notifications over
//! WebSockets.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL (via sqlx) for all persistence.
//!
//! The **API layer** ([`api`]) exposes public authentication endpoints at
//! `/authentication/*` and the resource API at `/api/v1/*`. Project and task
//! reads are public; writes require a bearer token, extracted per-handler by
//! [`auth::AuthenticatedUser`].
//!
//! The **database layer** ([`db`]) uses the repository pattern: each entity
//! has a repository over a `PgConnection` implementing
//! [`db::handlers::Repository`], and every write is stamped with the acting
//! user's id.
//!
//! Two in-process components hang off [`AppState`]: a TTL cache for the
//! project picker list ([`cache::ProjectLookupCache`]) and a broadcast hub for
//! task change events ([`notifications::TaskEvents`]), streamed to clients at
//! `/api/v1/events/tasks`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use taskboard::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = taskboard::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     taskboard::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! Migrations are embedded and run automatically on startup.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod notifications;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::cache::ProjectLookupCache;
use crate::config::CorsOrigin;
use crate::notifications::TaskEvents;
use crate::openapi::ApiDoc;
use axum::http::HeaderValue;
use axum::{
    Router, http,
    routing::{delete, get, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{ProjectId, TaskId, UserId};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool
/// - `config`: Application configuration loaded from file/environment
/// - `project_lookup`: TTL cache for the project picker list
/// - `task_events`: Broadcast hub for task change notifications
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .project_lookup(cache)
///     .task_events(events)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub project_lookup: ProjectLookupCache,
    pub task_events: TaskEvents,
}

/// Get the taskboard database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect to PostgreSQL and run pending migrations.
pub async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;

    migrator().run(&pool).await?;

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials)
        .allow_headers(vec![http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::PUT,
            http::Method::DELETE,
        ])
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// - Authentication routes at the root (`/authentication/*`)
/// - Resource API nested under `/api/v1`
/// - Interactive API docs at `/docs`
/// - CORS and tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    // Authentication routes (at root level, public)
    let auth_routes = Router::new()
        .route("/authentication/register", post(api::handlers::auth::register))
        .route("/authentication/login", post(api::handlers::auth::login))
        .with_state(state.clone());

    // API routes
    let api_routes = Router::new()
        // Users (authenticated reads)
        .route("/users/lookup", get(api::handlers::users::lookup_users))
        .route("/users/{id}", get(api::handlers::users::get_user))
        // Projects (public reads, owner-gated writes)
        .route("/projects", get(api::handlers::projects::list_projects))
        .route("/projects", post(api::handlers::projects::create_project))
        .route("/projects/lookup", get(api::handlers::projects::lookup_projects))
        .route("/projects/{id}", get(api::handlers::projects::get_project))
        .route("/projects/{id}", put(api::handlers::projects::update_project))
        .route("/projects/{id}", delete(api::handlers::projects::delete_project))
        .route("/projects/{id}/statistics", get(api::handlers::projects::project_statistics))
        // Tasks (public reads, authenticated writes)
        .route("/tasks", get(api::handlers::tasks::list_tasks))
        .route("/tasks", post(api::handlers::tasks::create_task))
        .route("/tasks/statistics", get(api::handlers::tasks::task_statistics))
        .route("/tasks/{id}", get(api::handlers::tasks::get_task))
        .route("/tasks/{id}", put(api::handlers::tasks::update_task))
        .route("/tasks/{id}", delete(api::handlers::tasks::delete_task))
        // Live task change events
        .route("/events/tasks", get(api::handlers::events::task_events))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    Ok(router.layer(cors_layer).layer(TraceLayer::new_for_http()))
}

/// A fully initialized taskboard server, ready to serve requests.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting taskboard with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;

        let state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .project_lookup(ProjectLookupCache::new(config.cache.project_lookup_ttl))
            .task_events(TaskEvents::new())
            .build();

        let router = build_router(&state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Taskboard listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
