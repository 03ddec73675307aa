// src/two_factor.rs

use axum::async_trait;
use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use totp_rs::{Algorithm, TOTP};

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("secret is not valid base32")]
    InvalidSecret,

    #[error("digits must be 6 or 8")]
    UnsupportedDigits,

    #[error("period must be greater than zero")]
    InvalidPeriod,

    #[error("authenticator unavailable: {0}")]
    Unavailable(String),
}

/// Внешний аутентификатор, который решает, принят ли код
#[async_trait]
pub trait CodeVerifier: Send + Sync {
    async fn verify(&self, code: &str) -> Result<bool, VerifierError>;
}

/// Проверка одноразового кода перед любым изменением.
///
/// Коды не генерирует и не хранит: только спрашивает аутентификатор.
#[derive(Clone)]
pub struct TwoFactorGate {
    verifier: Arc<dyn CodeVerifier>,
}

impl TwoFactorGate {
    pub fn new(verifier: Arc<dyn CodeVerifier>) -> Self {
        Self { verifier }
    }

    pub async fn check(&self, code: &str) -> bool {
        match self.verifier.verify(code.trim()).await {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::warn!("verification code check failed: {}", e);
                false
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TotpAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl From<TotpAlgorithm> for Algorithm {
    fn from(value: TotpAlgorithm) -> Self {
        match value {
            TotpAlgorithm::Sha1 => Algorithm::SHA1,
            TotpAlgorithm::Sha256 => Algorithm::SHA256,
        }
    }
}

/// TOTP (RFC 6238) по общему секрету с приложением-аутентификатором
pub struct TotpVerifier {
    totp: TOTP,
    digits: usize,
    period: u64,
    skew: u64,
}

impl TotpVerifier {
    pub fn new(
        secret_base32: &str,
        algorithm: TotpAlgorithm,
        digits: u32,
        period: u64,
        skew: u64,
    ) -> Result<Self, VerifierError> {
        if digits != 6 && digits != 8 {
            return Err(VerifierError::UnsupportedDigits);
        }
        if period == 0 {
            return Err(VerifierError::InvalidPeriod);
        }

        let normalized: String = secret_base32
            .chars()
            .filter(|c| !c.is_ascii_whitespace() && *c != '=')
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let secret = BASE32_NOPAD
            .decode(normalized.as_bytes())
            .map_err(|_| VerifierError::InvalidSecret)?;
        if secret.is_empty() {
            return Err(VerifierError::InvalidSecret);
        }

        // Окно допуска в verify_at; секрет короче 128 бит допустим
        let totp = TOTP::new_unchecked(algorithm.into(), digits as usize, 0, period, secret);
        Ok(Self {
            totp,
            digits: digits as usize,
            period,
            skew,
        })
    }

    /// Код для момента времени (секунды UNIX)
    pub fn code_at(&self, unix_secs: u64) -> String {
        self.totp.generate(unix_secs)
    }

    /// Проверить код с допуском ±skew периодов
    pub fn verify_at(&self, code: &str, unix_secs: u64) -> bool {
        if code.len() != self.digits || !code.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        let current = unix_secs / self.period;
        let first = current.saturating_sub(self.skew);
        (first..=current + self.skew)
            .any(|step| self.code_at(step * self.period) == code)
    }
}

#[async_trait]
impl CodeVerifier for TotpVerifier {
    async fn verify(&self, code: &str) -> Result<bool, VerifierError> {
        let now = chrono::Utc::now().timestamp();
        let now = u64::try_from(now).map_err(|_| VerifierError::Unavailable("clock before epoch".into()))?;
        Ok(self.verify_at(code, now))
    }
}
