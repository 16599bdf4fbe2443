//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use converter_types::domain::TransactionId;
use converter_types::dto::{ConversionResponse, ConvertRequest};

// Stand-ins for the real handlers, used only for path generation.

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = inline(serde_json::Value), example = json!({"status": "Health"}))
    )
)]
async fn healthcheck() {}

/// Convert an amount between two currencies
#[utoipa::path(
    post,
    path = "/currencyConverter/v1/convert",
    tag = "conversions",
    request_body = ConvertRequest,
    params(
        ("user-id" = String, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Conversion recorded", body = ConversionResponse),
        (status = 400, description = "Invalid currency code, amount below 0.1 or missing user-id"),
        (status = 404, description = "Currency does not exist"),
        (status = 429, description = "Rate limit exceeded"),
        (status = 503, description = "Exchange rates provider unavailable")
    )
)]
async fn convert() {}

/// List recorded conversions
#[utoipa::path(
    get,
    path = "/currencyConverter/v1/conversions",
    tag = "conversions",
    params(
        ("user_id" = Option<String>, Query, description = "Only this user's conversions")
    ),
    responses(
        (status = 200, description = "Conversions in insertion order, possibly empty", body = Vec<ConversionResponse>)
    )
)]
async fn list_conversions() {}

/// OpenAPI documentation for the Currency Converter API.
#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "Currency Converter API",
        version = "1.0.0",
        description = "Converts amounts between currencies using daily provider rates and keeps a history of every conversion.\n\nEvery conversion request carries the caller identity in the `user-id` header.",
        license(name = "MIT"),
    ),
    paths(healthcheck, convert, list_conversions),
    components(schemas(ConvertRequest, ConversionResponse, TransactionId)),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "conversions", description = "Currency conversion and history"),
    )
)]
pub struct ApiDoc;
