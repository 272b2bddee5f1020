//! JSON error responses and the extractors that produce them.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use crate::auth::AuthError;
use crate::domain::aggregates::checkout::CheckoutError;
use crate::domain::aggregates::{CartError, WigError};
use crate::domain::validation::FieldErrors;
use crate::sessions::CartSessionError;
use crate::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    Invalid { status: StatusCode, message: String, fields: FieldErrors },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal server error")]
    Internal,
}

impl ApiError {
    /// 400 carrying field-level messages.
    pub fn fields(fields: FieldErrors) -> Self {
        Self::Invalid { status: StatusCode::BAD_REQUEST, message: "validation failed".to_string(), fields }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Invalid { status, .. } => *status,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Invalid { message, fields, .. } => json!({ "error": message, "fields": fields }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::WigNotFound(_) => Self::NotFound("wig not found".to_string()),
            StoreError::OrderNotFound(_) => Self::NotFound("order not found".to_string()),
            StoreError::DuplicateSlug(_) => Self::Conflict(err.to_string()),
            StoreError::Wig(e) => e.into(),
            StoreError::Order(e) => Self::Conflict(e.to_string()),
            StoreError::Storage(_) | StoreError::Corrupt(_) => {
                tracing::error!(error = %err, "store failure");
                Self::Internal
            }
        }
    }
}

impl From<WigError> for ApiError {
    fn from(err: WigError) -> Self {
        match err {
            WigError::Invalid(fields) => Self::fields(fields),
            WigError::InvalidSlug => Self::BadRequest(err.to_string()),
            WigError::InsufficientStock { .. } => Self::Conflict(err.to_string()),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::EmptyCart => Self::BadRequest(err.to_string()),
            CheckoutError::Incomplete { step, errors } => Self::Invalid {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: format!("{} step is incomplete", step.as_str()),
                fields: errors,
            },
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        let mut fields = FieldErrors::default();
        fields.insert("quantity", err.to_string());
        Self::Invalid { status: StatusCode::UNPROCESSABLE_ENTITY, message: err.to_string(), fields }
    }
}

impl From<CartSessionError> for ApiError {
    fn from(err: CartSessionError) -> Self { Self::BadRequest(err.to_string()) }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self { Self::Unauthorized(err.to_string()) }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

/// `axum::Json` with rejections rendered as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
