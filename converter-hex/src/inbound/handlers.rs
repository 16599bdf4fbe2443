//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use converter_types::{
    AppError, CacheBackend, ConversionRepository, ConversionResponse, ConversionsQuery,
    ConvertRequest, MIN_SOURCE_CURRENCY_VALUE, RateProvider, USER_ID_HEADER,
};

use crate::CurrencyConverterService;

/// Application state shared across handlers.
pub struct AppState<C, P, R>
where
    C: CacheBackend,
    P: RateProvider,
    R: ConversionRepository,
{
    pub service: CurrencyConverterService<C, P, R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<converter_types::ConversionError> for ApiError {
    fn from(err: converter_types::ConversionError) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "Health" }))
}

fn caller_id(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest(format!("Missing `{USER_ID_HEADER}` header")))
}

/// Convert an amount and record the transaction.
#[tracing::instrument(
    skip(state, headers, req),
    fields(
        source = %req.source_currency_code,
        target = %req.target_currency_code,
        amount = req.source_currency_value
    )
)]
pub async fn convert<C, P, R>(
    State(state): State<Arc<AppState<C, P, R>>>,
    headers: HeaderMap,
    Json(req): Json<ConvertRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: CacheBackend,
    P: RateProvider,
    R: ConversionRepository,
{
    let user_id = caller_id(&headers)?;

    let value = req.source_currency_value;
    if !value.is_finite() || value < MIN_SOURCE_CURRENCY_VALUE {
        return Err(AppError::BadRequest(format!(
            "The minimum allowed value is {MIN_SOURCE_CURRENCY_VALUE}"
        ))
        .into());
    }

    let tx = state
        .service
        .convert(
            &req.source_currency_code,
            value,
            &req.target_currency_code,
            &user_id,
        )
        .await?;

    Ok(Json(ConversionResponse::from(tx)))
}

/// List recorded conversions, optionally for one user.
#[tracing::instrument(skip(state))]
pub async fn list_conversions<C, P, R>(
    State(state): State<Arc<AppState<C, P, R>>>,
    Query(query): Query<ConversionsQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    C: CacheBackend,
    P: RateProvider,
    R: ConversionRepository,
{
    let user_id = query.user_id.as_deref().filter(|id| !id.trim().is_empty());

    let conversions = state.service.get_conversions(user_id).await?;
    let response: Vec<ConversionResponse> = conversions
        .into_iter()
        .map(ConversionResponse::from)
        .collect();

    Ok(Json(response))
}
