//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use converter_types::{CacheBackend, ConversionRepository, RateProvider};

use super::handlers::{self, AppState};
use super::rate_limit::{
    PRUNE_INTERVAL, RateLimiterState, prune_idle_callers, rate_limit_middleware,
};
use crate::CurrencyConverterService;
use crate::openapi::ApiDoc;

/// Versioned prefix of the conversion API.
pub const API_PREFIX: &str = "/currencyConverter/v1";

pub const HEALTHCHECK_PATH: &str = "/healthcheck";

/// HTTP Server for the Currency Converter API.
pub struct HttpServer<C, P, R>
where
    C: CacheBackend,
    P: RateProvider,
    R: ConversionRepository,
{
    state: Arc<AppState<C, P, R>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<C, P, R> HttpServer<C, P, R>
where
    C: CacheBackend,
    P: RateProvider,
    R: ConversionRepository,
{
    /// Creates a new HTTP server with the default per-user quota.
    pub fn new(service: CurrencyConverterService<C, P, R>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Arc::new(RateLimiterState::default()),
        }
    }

    /// Creates a new HTTP server allowing `requests_per_minute` per user.
    pub fn with_rate_limit(
        service: CurrencyConverterService<C, P, R>,
        requests_per_minute: u32,
    ) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Arc::new(RateLimiterState::per_minute(requests_per_minute)),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Uses the globally set MeterProvider
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let api = Router::new()
            .route("/convert", post(handlers::convert::<C, P, R>))
            .route("/conversions", get(handlers::list_conversions::<C, P, R>));

        Router::new()
            .route(HEALTHCHECK_PATH, get(handlers::health))
            .nest(API_PREFIX, api)
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    }

    /// Runs the server on the given address with graceful shutdown.
    ///
    /// Idle callers are pruned from the rate limiter while the server runs.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let pruner = tokio::spawn(prune_idle_callers(
            self.rate_limiter.clone(),
            PRUNE_INTERVAL,
        ));

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await;
        pruner.abort();

        served?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
