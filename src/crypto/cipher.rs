// src/crypto/cipher.rs

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const BLOCK_SIZE: usize = 16;

/// Ключ и IV шифрования полей (AES-256-CBC).
///
/// Загружаются один раз при старте и не меняются. IV фиксирован, поэтому
/// шифрование детерминировано: одинаковый текст даёт одинаковый шифротекст.
#[derive(Clone)]
pub struct CipherConfig {
    key: [u8; 32],
    iv: [u8; 16],
}

impl CipherConfig {
    pub fn new(key: [u8; 32], iv: [u8; 16]) -> Self {
        Self { key, iv }
    }

    /// Разобрать ключ (64 hex-символа) и IV (32 hex-символа)
    pub fn from_hex(key_hex: &str, iv_hex: &str) -> Result<Self, CryptoError> {
        let mut key = [0u8; 32];
        hex::decode_to_slice(key_hex.trim(), &mut key)
            .map_err(|e| CryptoError::InvalidKey(format!("field key: {}", e)))?;

        let mut iv = [0u8; 16];
        hex::decode_to_slice(iv_hex.trim(), &mut iv)
            .map_err(|e| CryptoError::InvalidKey(format!("field IV: {}", e)))?;

        Ok(Self { key, iv })
    }
}

impl fmt::Debug for CipherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherConfig { .. }")
    }
}

/// Шифротекст поля записи (hex), результат `CredentialCipher::encrypt`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Ciphertext(String);

impl Ciphertext {
    /// Принять уже зашифрованное значение как есть (импорт зашифрованного CSV)
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Обратимое шифрование отдельных текстовых полей
#[derive(Clone, Debug)]
pub struct CredentialCipher {
    config: CipherConfig,
}

impl CredentialCipher {
    pub fn new(config: CipherConfig) -> Self {
        Self { config }
    }

    pub fn encrypt(&self, plaintext: &str) -> Ciphertext {
        let encryptor = Aes256CbcEnc::new(
            GenericArray::from_slice(&self.config.key),
            GenericArray::from_slice(&self.config.iv),
        );
        let bytes = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        Ciphertext(hex::encode(bytes))
    }

    pub fn decrypt(&self, ciphertext: &Ciphertext) -> Result<String, CryptoError> {
        self.decrypt_str(ciphertext.as_str())
    }

    pub fn decrypt_str(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let bytes = hex::decode(ciphertext).map_err(|_| CryptoError::MalformedCiphertext)?;
        if bytes.is_empty() || bytes.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::MalformedCiphertext);
        }

        let decryptor = Aes256CbcDec::new(
            GenericArray::from_slice(&self.config.key),
            GenericArray::from_slice(&self.config.iv),
        );
        let plain = decryptor
            .decrypt_padded_vec_mut::<Pkcs7>(&bytes)
            .map_err(|_| CryptoError::KeyMismatch)?;

        String::from_utf8(plain).map_err(|_| CryptoError::KeyMismatch)
    }
}
