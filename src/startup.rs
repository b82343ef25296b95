//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use chrono::{Offset, Utc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::application::services::{
    DrawService, DrawServiceConfig, EnvironmentTimer, EnvironmentTimerConfig,
};
use crate::config::Settings;
use crate::domain::{Notifier, Persistence};
use crate::infrastructure::{database, HttpNotifier, PersistenceAdapter};
use crate::presentation::http::{create_router, handlers::health};
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};
use crate::shared::clock::{SharedClock, SystemClock};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub timer: EnvironmentTimer,
    pub draws: DrawService,
    pub store: Arc<dyn Persistence>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the services over the given collaborators.
    pub fn new(
        settings: Settings,
        store: Arc<dyn Persistence>,
        notifier: Arc<dyn Notifier>,
        clock: SharedClock,
    ) -> Result<Self> {
        let timer = EnvironmentTimer::new(
            EnvironmentTimerConfig::from_settings(&settings),
            store.clone(),
            notifier.clone(),
            clock.clone(),
        )?;
        let draws = DrawService::new(
            DrawServiceConfig::from_settings(&settings),
            store.clone(),
            notifier,
            clock,
        )?;

        Ok(Self {
            timer,
            draws,
            store,
            settings: Arc::new(settings),
        })
    }

    /// Router with middleware applied.
    pub fn router(&self) -> Router {
        create_router(self.clone())
            .layer(create_trace_layer())
            .layer(create_cors_layer(&self.settings.cors))
    }
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        let pool = match database::create_pool(&settings.database).await {
            Ok(Some(pool)) => {
                info!("Database connection pool created");
                Some(pool)
            }
            Ok(None) => {
                warn!("No database configured, persistence disabled");
                None
            }
            Err(e) => {
                warn!(error = %e, "Database unreachable, persistence disabled");
                None
            }
        };

        if let (Some(pool), true) = (&pool, settings.database.run_migrations) {
            match database::run_migrations(pool).await {
                Ok(()) => info!("Database migrations applied"),
                Err(e) => warn!(error = %e, "Database migrations failed"),
            }
        }

        let store: Arc<dyn Persistence> = Arc::new(PersistenceAdapter::new(pool));
        let offset = settings.clock.offset().unwrap_or_else(|| Utc.fix());
        let notifier = HttpNotifier::new(&settings.notifier, offset)?;
        if !notifier.is_configured() {
            warn!("No notification endpoint configured, events will not be sent");
        }

        let state = AppState::new(
            settings.clone(),
            store.clone(),
            Arc::new(notifier),
            Arc::new(SystemClock),
        )?;

        store.prune_expired().await;
        let interval = state.timer.load_interval().await;
        let tick = state.draws.load_tick_interval().await;
        info!(interval_minutes = interval, tick_seconds = tick, "Timers configured");

        let router = state.router();

        let addr = settings.server_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("Listening on {}", addr);

        Ok(Self {
            listener,
            router,
            state,
        })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        // A run interrupted by shutdown still gets its sequence persisted.
        self.state.draws.stop().await;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
