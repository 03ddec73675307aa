// src/error.rs

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::store::StoreError;

/// Ошибки конвейера изменений и границы API
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("Invalid verification code")]
    TwoFactor,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl VaultError {
    pub fn validation(msg: impl Into<String>) -> Self {
        VaultError::Validation(msg.into())
    }

    pub fn unauthorized() -> Self {
        VaultError::Auth("Unauthorized".to_string())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        VaultError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        VaultError::Conflict(msg.into())
    }

    /// HTTP-код, соответствующий виду ошибки
    pub fn status_code(&self) -> u16 {
        match self {
            VaultError::Validation(_) => 400,
            VaultError::Auth(_) | VaultError::TwoFactor => 401,
            VaultError::Forbidden(_) => 403,
            VaultError::NotFound(_) => 404,
            VaultError::Conflict(_) => 409,
            VaultError::Crypto(_) | VaultError::Persistence(_) => 500,
        }
    }
}

impl From<StoreError> for VaultError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => VaultError::NotFound(msg),
            StoreError::AlreadyExists(msg) | StoreError::Referenced(msg) => VaultError::Conflict(msg),
            other => VaultError::Persistence(other.to_string()),
        }
    }
}

/// Проверка обязательных полей: присутствуют и не пустые
pub fn require(fields: &[(&str, &str)]) -> Result<(), VaultError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(VaultError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Для частичных обновлений: отсутствующее поле допустимо, пустое нет
pub fn require_if_present(fields: &[(&str, Option<&String>)]) -> Result<(), VaultError> {
    for (name, value) in fields {
        if let Some(v) = value {
            if v.is_empty() {
                return Err(VaultError::Validation(format!("Field {} cannot be empty", name)));
            }
        }
    }
    Ok(())
}
