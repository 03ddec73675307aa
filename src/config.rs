// src/config.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::crypto::{AdminCredentialStore, CipherConfig, CryptoError};
use crate::two_factor::{TotpAlgorithm, TotpVerifier, VerifierError};
use crate::vault_db::MasterKey;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to write configuration: {0}")]
    Write(String),

    #[error("invalid key material: {0}")]
    Key(#[from] CryptoError),

    #[error("invalid two-factor settings: {0}")]
    TwoFactor(#[from] VerifierError),

    #[error("missing setting: {0}")]
    Missing(&'static str),

    #[error("invalid setting {0}: {1}")]
    Invalid(&'static str, String),
}

/// Префикс переменных окружения: ACCSTORAGE_CRYPTO__FIELD_KEY_HEX и т.п.
pub const ENV_PREFIX: &str = "ACCSTORAGE";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub master_key_hex: String,

    pub crypto: CryptoConfig,

    #[serde(default)]
    pub web_server: ServerConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            max_request_size: default_max_request_size(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_request_size() -> usize {
    10 * 1024 * 1024 // 10 MB
}

/// Ключ и IV шифрования полей, стоимость bcrypt
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CryptoConfig {
    pub field_key_hex: String,
    pub field_iv_hex: String,
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,
}

fn default_hash_cost() -> u32 {
    AdminCredentialStore::DEFAULT_COST
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct SecurityConfig {
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub two_factor: TwoFactorConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtConfig {
    pub secret_key: Option<String>,
    #[serde(default = "default_token_expiry")]
    pub token_expiry: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            token_expiry: default_token_expiry(),
        }
    }
}

fn default_token_expiry() -> String {
    "24h".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TwoFactorConfig {
    /// Общий секрет TOTP в base32
    pub secret: Option<String>,
    #[serde(default)]
    pub algorithm: TotpAlgorithm,
    #[serde(default = "default_digits")]
    pub digits: u32,
    #[serde(default = "default_period")]
    pub period: u64,
    #[serde(default = "default_skew")]
    pub skew: u64,
}

impl Default for TwoFactorConfig {
    fn default() -> Self {
        Self {
            secret: None,
            algorithm: TotpAlgorithm::default(),
            digits: default_digits(),
            period: default_period(),
            skew: default_skew(),
        }
    }
}

fn default_digits() -> u32 { 6 }
fn default_period() -> u64 { 30 }
fn default_skew() -> u64 { 1 }

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub enable_json_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            enable_json_output: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// YAML-файл, поверх него переменные окружения (и `.env`)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = path.as_ref().to_string_lossy().into_owned();
        let settings = config::Config::builder()
            .add_source(config::File::new(&path, config::FileFormat::Yaml).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self).map_err(|e| ConfigError::Write(e.to_string()))?;
        fs::write(path, content).map_err(|e| ConfigError::Write(e.to_string()))?;
        Ok(())
    }

    pub fn master_key(&self) -> Result<MasterKey, ConfigError> {
        let mut key = [0u8; 32];
        hex::decode_to_slice(self.master_key_hex.trim(), &mut key)
            .map_err(|e| ConfigError::Invalid("master_key_hex", e.to_string()))?;
        Ok(key)
    }

    pub fn cipher_config(&self) -> Result<CipherConfig, ConfigError> {
        Ok(CipherConfig::from_hex(&self.crypto.field_key_hex, &self.crypto.field_iv_hex)?)
    }

    pub fn credential_store(&self) -> Result<AdminCredentialStore, ConfigError> {
        Ok(AdminCredentialStore::new(self.crypto.hash_cost)?)
    }

    pub fn totp_verifier(&self) -> Result<TotpVerifier, ConfigError> {
        let tf = &self.security.two_factor;
        let secret = tf.secret.as_deref().ok_or(ConfigError::Missing("security.two_factor.secret"))?;
        Ok(TotpVerifier::new(secret, tf.algorithm, tf.digits, tf.period, tf.skew)?)
    }
}
