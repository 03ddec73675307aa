// src/vault_db.rs

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum VaultDbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Cache lock poisoned")]
    Poisoned,
}

/// Ключ хранения (32 байта = 256 бит)
pub type MasterKey = [u8; 32];

/// Одна операция внутри пакета записи
#[derive(Debug, Clone)]
pub enum WriteOp {
    Put(String, Vec<u8>),
    Delete(String),
}

/// VaultDb: встроенное key-value хранилище, зашифрованное на диске AES-256-GCM.
///
/// Все изменения проходят через `apply`: пакет либо записан целиком, либо нет.
pub struct VaultDb {
    path: Option<PathBuf>,
    cipher: Aes256Gcm,
    cache: RwLock<HashMap<String, Vec<u8>>>,
}

impl VaultDb {
    /// Открыть базу по пути с ключом хранения
    pub fn open<P: AsRef<Path>>(path: P, key: &MasterKey) -> Result<Self, VaultDbError> {
        let db = Self {
            path: Some(path.as_ref().to_path_buf()),
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
            cache: RwLock::new(HashMap::new()),
        };
        db.load()?;
        Ok(db)
    }

    /// База без файла (тесты, одноразовые запуски)
    pub fn in_memory(key: &MasterKey) -> Self {
        Self {
            path: None,
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn load(&self) -> Result<(), VaultDbError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !path.exists() {
            return Ok(()); // файла нет → пустая база
        }

        let mut file = OpenOptions::new().read(true).open(path)?;
        let mut sealed = Vec::new();
        file.read_to_end(&mut sealed)?;

        if sealed.is_empty() {
            return Ok(());
        }
        if sealed.len() < NONCE_LEN {
            return Err(VaultDbError::Decryption("File too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), Payload { msg: ciphertext, aad: &[] })
            .map_err(|_| VaultDbError::Decryption("AES-GCM decryption failed".to_string()))?;

        let data: HashMap<String, Vec<u8>> = bincode::deserialize(&plaintext)
            .map_err(|e| VaultDbError::Serialization(e.to_string()))?;

        let mut cache = self.cache.write().map_err(|_| VaultDbError::Poisoned)?;
        *cache = data;
        Ok(())
    }

    fn persist(&self, data: &HashMap<String, Vec<u8>>) -> Result<(), VaultDbError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let plaintext =
            bincode::serialize(data).map_err(|e| VaultDbError::Serialization(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), Payload { msg: &plaintext, aad: &[] })
            .map_err(|_| VaultDbError::Encryption("AES-GCM encryption failed".to_string()))?;

        // Пишем во временный файл и переименовываем: на диске всегда целая база
        let tmp = path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)?;
            file.write_all(&nonce_bytes)?;
            file.write_all(&ciphertext)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Получить значение по ключу
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, VaultDbError> {
        let cache = self.cache.read().map_err(|_| VaultDbError::Poisoned)?;
        Ok(cache.get(key).cloned())
    }

    /// Все ключи с указанным префиксом
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, VaultDbError> {
        let cache = self.cache.read().map_err(|_| VaultDbError::Poisoned)?;
        Ok(cache.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
    }

    /// Применить пакет операций и сохранить на диск одной записью.
    /// При ошибке сохранения кэш остаётся прежним.
    pub fn apply(&self, ops: Vec<WriteOp>) -> Result<(), VaultDbError> {
        let mut cache = self.cache.write().map_err(|_| VaultDbError::Poisoned)?;

        let mut next = cache.clone();
        for op in ops {
            match op {
                WriteOp::Put(key, value) => {
                    next.insert(key, value);
                }
                WriteOp::Delete(key) => {
                    next.remove(&key);
                }
            }
        }

        self.persist(&next)?;
        *cache = next;
        Ok(())
    }
}
