use crate::config::Config;
use crate::error::Result;
use crate::handlers::{list_items, request_stats, submit_item, AppState, SharedState};
use crate::middleware::{count_requests, logging_middleware};
use axum::routing::{get, post};
use axum::{middleware, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// CORS sits outside the counting hook, so preflight requests are answered
/// without being counted. Everything else, static files included, is.
pub fn create_app(state: SharedState, static_dir: &Path) -> Router {
    let counter = state.counter.clone();

    Router::new()
        // Submission and read endpoints
        .route("/api/log", post(submit_item))
        .route("/api/logs/requests", get(list_items))
        .route("/api/logs/requests/stats", get(request_stats))
        // Static UI for everything else
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(logging_middleware))
                .layer(middleware::from_fn_with_state(counter, count_requests)),
        )
}

pub struct Server {
    config: Config,
    state: SharedState,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: AppState::shared(),
        }
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// The periodic counter tick starts here and is left running afterwards.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_app(self.state.clone(), &self.config.static_dir);

        // Counter ticks independently of traffic
        let _ticker = self.state.counter.spawn_periodic(self.config.tick_interval());

        tracing::info!("Request logger listening on {}", listener.local_addr()?);
        tracing::info!("Serving static files from {}", self.config.static_dir.display());
        tracing::info!(
            "Periodic request counter tick every {}s",
            self.config.counter_tick_secs
        );

        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}
