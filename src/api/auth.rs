use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;
use super::error::{ApiError, ApiJson};
use super::AppState;
use crate::auth::{bearer_token, AdminSession};

/// Verified admin session, taken from the `Authorization: Bearer` header.
pub struct AdminUser(pub AdminSession);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        let token = bearer_token(header)?;
        Ok(Self(state.admins.verify(token).await?))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

pub async fn login(State(s): State<AppState>, ApiJson(r): ApiJson<LoginRequest>) -> Result<Json<AdminSession>, ApiError> {
    r.validate().map_err(|e| ApiError::fields(e.into()))?;
    Ok(Json(s.admins.login(&r.email, &r.password).await?))
}

pub async fn verify(AdminUser(session): AdminUser) -> Json<Value> {
    Json(json!({ "valid": true, "user": session.user, "expiresAt": session.expires_at }))
}

pub async fn logout(State(s): State<AppState>, AdminUser(session): AdminUser) -> Json<Value> {
    s.admins.logout(&session.token).await;
    tracing::info!(email = %session.user.email, "admin logged out");
    Json(json!({ "message": "Logged out" }))
}
