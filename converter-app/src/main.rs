//! # Currency Converter Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the cache, rate provider client and repository adapters
//! - Create the conversion service
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use converter_hex::{CurrencyConverterService, inbound::HttpServer};
use converter_repo::{MemoryCache, build_repo};
use exchange_rates::ExchangeRatesClient;

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("currency-converter"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (otel_tracer, otel_provider) = init_tracer()?;
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,converter_app=debug,converter_hex=debug,exchange_rates=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    let config = config::Config::from_env()?;

    tracing::info!("Starting currency converter on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);
    tracing::info!("Using rates provider: {}", config.api_url);

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    let provider = ExchangeRatesClient::new(config.exchange_rates_config())?;
    let cache = MemoryCache::new();

    let service = CurrencyConverterService::new(cache, provider, repo, config.service_config());

    let server = HttpServer::with_rate_limit(service, config.rate_limit_per_minute);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    let _ = otel_provider.shutdown();
    Ok(())
}
