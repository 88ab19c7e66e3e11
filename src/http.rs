use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::{routing::get, routing::post, Extension, Json, Router};
use tracing::{info, Instrument};

use crate::broker::BrokerResult;
use crate::error::{attach_correlation, AppError};
use crate::models::{DeliveredResponse, SecretRequest};
use crate::state::AppState;
use crate::telemetry::{correlation_layer, request_span, CorrelationId};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/request/secret", post(request_secret))
        .route("/receive/secret", post(receive_secret))
        .layer(middleware::from_fn(correlation_layer))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn request_secret(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(request): Json<SecretRequest>,
) -> Result<impl IntoResponse, AppError> {
    let span = request_span("http.request_secret", &correlation.0);
    async move {
        if request.secret_name.is_empty() {
            return Err(AppError::bad_request("secretName must not be empty"));
        }

        // Fixed messages only: the body must not reveal which secrets exist
        // or which receivers are listed.
        match state.broker.handle(&request).await {
            BrokerResult::Delivered => Ok((StatusCode::OK, Json(DeliveredResponse::new()))),
            BrokerResult::SecretUnknown => Err(AppError::not_found()),
            BrokerResult::Forbidden => Err(AppError::forbidden("delivery not permitted")),
            BrokerResult::DeliveryFailed => Err(AppError::internal("delivery failed")),
        }
    }
    .instrument(span)
    .await
    .map_err(|err: AppError| attach_correlation(err, &correlation))
}

/// Receiver-side acknowledgment endpoint: logs receipt and nothing else.
/// The payload itself is never logged.
async fn receive_secret(
    Extension(correlation): Extension<CorrelationId>,
    body: Bytes,
) -> impl IntoResponse {
    info!(
        correlation_id = %correlation.0,
        bytes = body.len(),
        "received secret"
    );
    StatusCode::OK
}
