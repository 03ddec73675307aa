// src/crypto/mod.rs

//! Два разных примитива: обратимое шифрование полей записей
//! и необратимое хеширование секретов администраторов.

pub mod cipher;
pub mod digest;

pub use cipher::{CipherConfig, Ciphertext, CredentialCipher};
pub use digest::{AdminCredentialStore, Digest};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("ciphertext is not valid hex-encoded cipher output")]
    MalformedCiphertext,

    #[error("ciphertext was not produced under the configured key/IV")]
    KeyMismatch,

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("hashing failed: {0}")]
    Hash(String),
}
