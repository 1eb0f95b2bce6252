//! Response envelope and the mapping of every layer's errors onto it.
//!
//! Success: `{"success": true, "data": ...}`.
//! Failure: `{"success": false, "error": "...", "details": "..."}`.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use sitebook_auth::AuthzError;
use sitebook_core::DomainError;
use sitebook_infra::receiving::ReceiveError;
use sitebook_infra::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("unauthorized")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(details) => {
                json_error(StatusCode::BAD_REQUEST, "Validation failed", Some(details))
            }
            ApiError::InvalidId(details) => {
                json_error(StatusCode::BAD_REQUEST, "Invalid identifier", Some(details))
            }
            ApiError::Unauthenticated => json_error(StatusCode::UNAUTHORIZED, "Unauthorized", None),
            ApiError::Forbidden(details) => {
                json_error(StatusCode::FORBIDDEN, "Forbidden", Some(details))
            }
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, "Not found", None),
            ApiError::Conflict(details) => json_error(StatusCode::CONFLICT, "Conflict", Some(details)),
            ApiError::Internal(details) => {
                tracing::error!("request failed: {details}");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    Some(details),
                )
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { field, message } => {
                ApiError::Validation(format!("{field}: {message}"))
            }
            DomainError::InvalidId(msg) => ApiError::InvalidId(msg),
            DomainError::NotFound => ApiError::NotFound,
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Duplicate(id) => ApiError::Conflict(format!("record {id} already exists")),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::TenantMismatch => ApiError::Forbidden("tenant mismatch".into()),
            AuthzError::Forbidden(perm) => ApiError::Forbidden(format!("missing permission '{perm}'")),
        }
    }
}

impl From<ReceiveError> for ApiError {
    fn from(err: ReceiveError) -> Self {
        match err {
            ReceiveError::Domain(e) => e.into(),
            ReceiveError::Store(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("response encoding failed: {err}"))
    }
}

#[derive(Serialize)]
struct Success<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct Failure<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

pub fn ok<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(Success { success: true, data })).into_response()
}

pub fn json_error(status: StatusCode, error: &str, details: Option<String>) -> Response {
    (
        status,
        Json(Failure {
            success: false,
            error,
            details,
        }),
    )
        .into_response()
}

/// JSON body extractor whose rejections use the error envelope.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string extractor whose rejections use the error envelope.
pub struct ApiQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}
