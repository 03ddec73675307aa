// src/crypto/digest.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use super::CryptoError;

/// Хеш bcrypt вида "$2b$10$...", соль хранится внутри самого хеша
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Digest(..)")
    }
}

/// Необратимое хеширование идентификаторов и паролей администраторов.
///
/// Никогда не используется для полей записей: для них есть `CredentialCipher`.
#[derive(Clone, Copy, Debug)]
pub struct AdminCredentialStore {
    cost: u32,
}

impl AdminCredentialStore {
    pub const DEFAULT_COST: u32 = 10;

    pub fn new(cost: u32) -> Result<Self, CryptoError> {
        if !(4..=31).contains(&cost) {
            return Err(CryptoError::InvalidKey(format!(
                "bcrypt cost must be within 4..=31, got {}",
                cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn hash(&self, secret: &str) -> Result<Digest, CryptoError> {
        bcrypt::hash(secret, self.cost)
            .map(Digest)
            .map_err(|e| CryptoError::Hash(e.to_string()))
    }

    pub fn verify(&self, secret: &str, digest: &Digest) -> bool {
        match bcrypt::verify(secret, digest.as_str()) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("stored digest could not be verified: {}", e);
                false
            }
        }
    }
}

impl Default for AdminCredentialStore {
    fn default() -> Self {
        Self { cost: Self::DEFAULT_COST }
    }
}
