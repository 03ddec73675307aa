// src/auth.rs

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{ConfigError, JwtConfig};
use crate::models::{AdminAccount, AdminRole};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("token subject is not a valid id")]
    BadSubject,
}

// === Claims ===

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // admin id
    pub role: AdminRole,
    pub exp: usize,
    pub iat: usize,
}

/// Сессия администратора, извлечённая из действительного токена
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub admin_id: Uuid,
    pub role: AdminRole,
}

/// Ключи подписи JWT (HS256) и время жизни токена
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Result<Self, ConfigError> {
        let secret = config
            .secret_key
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("security.jwt.secret_key"))?;
        let ttl = parse_duration(&config.token_expiry)
            .ok_or_else(|| ConfigError::Invalid("security.jwt.token_expiry", config.token_expiry.clone()))?;
        Ok(Self::new(secret.as_bytes(), ttl))
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn issue(&self, admin: &AdminAccount) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: admin.id.to_string(),
            role: admin.role,
            exp: now + self.ttl.num_seconds() as usize,
            iat: now,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn validate(&self, token: &str) -> Result<Session, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        let admin_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::BadSubject)?;
        Ok(Session {
            admin_id,
            role: data.claims.role,
        })
    }
}

/// "24h", "30m", "90s" или число секунд
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (digits, unit) = match value.char_indices().last()? {
        (i, c) if c.is_ascii_alphabetic() => (&value[..i], c),
        _ => (value, 's'),
    };
    let amount: i64 = digits.parse().ok()?;
    if amount <= 0 {
        return None;
    }
    match unit.to_ascii_lowercase() {
        's' => Some(Duration::seconds(amount)),
        'm' => Some(Duration::minutes(amount)),
        'h' => Some(Duration::hours(amount)),
        'd' => Some(Duration::days(amount)),
        _ => None,
    }
}
