// src/middleware.rs

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::auth::Session;
use crate::error::VaultError;
use crate::service::VaultService;

/// Состояние приложения
pub type AppState = Arc<VaultService>;

/// Токен из заголовка `Authorization: Bearer ...`
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Извлечение `Session` из JWT.
/// Обработчики берут `Option<Session>`: отсутствие сессии решает конвейер.
#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = VaultError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(VaultError::unauthorized)?;

        state.sessions().validate(token).map_err(|e| {
            tracing::debug!("rejected bearer token: {}", e);
            VaultError::Auth("Invalid or expired token".to_string())
        })
    }
}
