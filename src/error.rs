use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::telemetry::{correlation_header_value, CorrelationId, CORRELATION_ID_HEADER};

#[derive(Debug, Error)]
pub enum AppErrorKind {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found")]
    NotFound,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("unexpected error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
#[error("{kind}")]
pub struct AppError {
    kind: AppErrorKind,
    correlation_id: Option<String>,
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            correlation_id: None,
        }
    }

    pub fn with_correlation(mut self, id: String) -> Self {
        self.correlation_id = Some(id);
        self
    }

    fn status(&self) -> StatusCode {
        match self.kind {
            AppErrorKind::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppErrorKind::NotFound => StatusCode::NOT_FOUND,
            AppErrorKind::Forbidden(_) => StatusCode::FORBIDDEN,
            AppErrorKind::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        Self::new(AppErrorKind::BadRequest(message.into()))
    }

    pub fn not_found() -> Self {
        Self::new(AppErrorKind::NotFound)
    }

    pub fn forbidden<T: Into<String>>(message: T) -> Self {
        Self::new(AppErrorKind::Forbidden(message.into()))
    }

    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::new(AppErrorKind::Internal(message.into()))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    correlation_id: Option<&'a str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let correlation = self.correlation_id.clone();
        let body = Json(ErrorBody {
            error: match &self.kind {
                AppErrorKind::BadRequest(_) => "bad_request",
                AppErrorKind::NotFound => "not_found",
                AppErrorKind::Forbidden(_) => "forbidden",
                AppErrorKind::Internal(_) => "internal",
            },
            message: self.kind.to_string(),
            correlation_id: correlation.as_deref(),
        });

        let mut response = (status, body).into_response();
        if let Some(id) = correlation {
            response
                .headers_mut()
                .insert(CORRELATION_ID_HEADER, correlation_header_value(&id));
        }
        response
    }
}

pub fn attach_correlation(err: AppError, correlation: &CorrelationId) -> AppError {
    err.with_correlation(correlation.0.clone())
}
