//! Back-office authentication.
//!
//! One admin account, configured through the environment. A successful login
//! yields an opaque bearer token kept in process memory until it expires or
//! is revoked.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::config::AdminConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("missing token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub token: String,
    pub user: AdminProfile,
    pub expires_at: DateTime<Utc>,
}

pub struct AdminSessions {
    config: AdminConfig,
    sessions: RwLock<HashMap<String, AdminSession>>,
}

impl AdminSessions {
    pub fn new(config: AdminConfig) -> Self {
        if config.password_sha256.is_none() {
            tracing::warn!("ADMIN_PASSWORD_SHA256 is not set; admin login is disabled");
        }
        Self { config, sessions: RwLock::new(HashMap::new()) }
    }

    fn profile(&self) -> AdminProfile {
        AdminProfile { id: "admin".to_string(), email: self.config.email.clone(), name: self.config.name.clone(), role: "admin".to_string() }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AdminSession, AuthError> {
        let Some(expected) = &self.config.password_sha256 else { return Err(AuthError::InvalidCredentials) };
        let email_ok = email.trim().eq_ignore_ascii_case(&self.config.email);
        if !email_ok || !digests_match(&sha256::digest(password), expected) {
            tracing::warn!(email = %email, "admin login rejected");
            return Err(AuthError::InvalidCredentials);
        }
        let session = AdminSession {
            token: Uuid::new_v4().simple().to_string(),
            user: self.profile(),
            expires_at: Utc::now() + self.config.token_ttl,
        };
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session.token.clone(), session.clone());
        tracing::info!(email = %session.user.email, "admin logged in");
        Ok(session)
    }

    pub async fn verify(&self, token: &str) -> Result<AdminSession, AuthError> {
        let sessions = self.sessions.read().await;
        match sessions.get(token) {
            Some(s) if s.expires_at > Utc::now() => Ok(s.clone()),
            _ => Err(AuthError::InvalidToken),
        }
    }

    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    #[cfg(test)]
    async fn expire_all(&self) {
        for s in self.sessions.write().await.values_mut() { s.expires_at = Utc::now() - chrono::Duration::seconds(1); }
    }
}

/// Compares two hex digests without short-circuiting on the first mismatch.
fn digests_match(actual: &str, expected: &str) -> bool {
    actual.len() == expected.len()
        && actual.bytes().zip(expected.bytes()).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// Token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.ok_or(AuthError::MissingToken)?;
    let token = value.strip_prefix("Bearer ").ok_or(AuthError::InvalidToken)?.trim();
    if token.is_empty() { return Err(AuthError::MissingToken); }
    Ok(token)
}
