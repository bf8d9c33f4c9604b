// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod handlers;
mod scheduler;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use innsync_api::{ApiError, SyncJobConfig};
use innsync_channel::{ChannelClientFactory, HttpClientFactory};
use innsync_persistence::{Persistence, PersistenceError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// `InnSync` Server - availability, bulk edit and channel sync for hotels
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Base URL of the channel manager gateway
    #[arg(long, default_value = "https://kapi.wubook.net")]
    channel_base_url: String,

    /// Timeout for one channel manager request, in seconds
    #[arg(long, default_value_t = 30)]
    channel_timeout_secs: u64,

    /// Seconds between incremental (pending-only) sync runs
    #[arg(long, default_value_t = 300)]
    incremental_interval_secs: u64,

    /// Seconds between full bidirectional sync runs
    #[arg(long, default_value_t = 86_400)]
    full_interval_secs: u64,

    /// Seconds between error recovery runs
    #[arg(long, default_value_t = 3_600)]
    recovery_interval_secs: u64,

    /// Cells pushed per provider call in scheduled runs
    #[arg(long, default_value_t = 50)]
    batch_size: usize,

    /// Pending cells pushed per configuration in one incremental run
    #[arg(long, default_value_t = 500)]
    max_pending: usize,

    /// Serve HTTP only; do not start the periodic sync jobs
    #[arg(long)]
    disable_jobs: bool,
}

impl Args {
    fn job_config(&self) -> SyncJobConfig {
        SyncJobConfig {
            incremental_interval: Duration::from_secs(self.incremental_interval_secs),
            full_interval: Duration::from_secs(self.full_interval_secs),
            recovery_interval: Duration::from_secs(self.recovery_interval_secs),
            max_pending_per_run: self.max_pending,
            batch_size: self.batch_size,
            ..SyncJobConfig::default()
        }
    }
}

/// Application state shared across handlers and scheduled jobs.
///
/// The persistence layer sits behind a single async mutex. Work against it
/// runs on the blocking pool while the owned guard is held.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Builds channel manager clients per configuration.
    factory: Arc<dyn ChannelClientFactory>,
    /// Scheduled job settings.
    job_config: SyncJobConfig,
}

impl AppState {
    fn new(
        persistence: Persistence,
        factory: Arc<dyn ChannelClientFactory>,
        job_config: SyncJobConfig,
    ) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            factory,
            job_config,
        }
    }

    /// Runs `work` on the blocking pool with exclusive access to persistence.
    async fn run_blocking<T, F>(&self, work: F) -> Result<T, HttpError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Persistence, &dyn ChannelClientFactory, &SyncJobConfig) -> T
            + Send
            + 'static,
    {
        let mut guard: OwnedMutexGuard<Persistence> =
            Arc::clone(&self.persistence).lock_owned().await;
        let factory: Arc<dyn ChannelClientFactory> = Arc::clone(&self.factory);
        let job_config: SyncJobConfig = self.job_config.clone();

        tokio::task::spawn_blocking(move || work(&mut *guard, factory.as_ref(), &job_config))
            .await
            .map_err(|e| {
                error!(error = %e, "Blocking task failed");
                HttpError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: format!("Worker task failed: {e}"),
                }
            })
    }
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/bulk_edit", post(handlers::handle_bulk_edit))
        .route(
            "/availability/calendar",
            get(handlers::handle_availability_calendar),
        )
        .route("/availability/check", post(handlers::handle_availability_check))
        .route("/parking/availability", post(handlers::handle_parking_availability))
        .route("/sync/manual", post(handlers::handle_manual_sync))
        .route("/sync/test_connection", post(handlers::handle_test_connection))
        .route("/sync/rooms", post(handlers::handle_room_sync))
        .route("/sync/recover", post(handlers::handle_error_recovery))
        .route("/sync/health", get(handlers::handle_sync_health))
        .with_state(app_state)
}

fn open_persistence(database: Option<&str>) -> Result<Persistence, PersistenceError> {
    if let Some(db_path) = database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing InnSync Server");

    let persistence: Persistence = open_persistence(args.database.as_deref())?;
    let factory: Arc<dyn ChannelClientFactory> = Arc::new(HttpClientFactory::new(
        args.channel_base_url.clone(),
        Duration::from_secs(args.channel_timeout_secs),
    ));
    let app_state: AppState = AppState::new(persistence, factory, args.job_config());

    if args.disable_jobs {
        info!("Scheduled sync jobs disabled");
    } else {
        let jobs: Vec<JoinHandle<()>> = scheduler::spawn_jobs(&app_state);
        info!(jobs = jobs.len(), "Sync scheduler started");
    }

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
