// src/models/record.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::{Ciphertext, CredentialCipher, CryptoError};

/// Хранимая запись: имя, фамилия, логин и пароль только в виде шифротекста
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CredentialRecord {
    pub id: Uuid,
    #[serde(rename = "entrepriseId")]
    pub organization_id: Uuid,
    #[serde(rename = "nom")]
    pub last_name: Ciphertext,
    #[serde(rename = "prenom")]
    pub first_name: Ciphertext,
    #[serde(rename = "typeInfo")]
    pub category: String,
    #[serde(rename = "identifiant")]
    pub login: Ciphertext,
    #[serde(rename = "motDePasse")]
    pub password: Ciphertext,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<Utc>,
}

/// Зашифрованные поля записи, готовые к сохранению
#[derive(Debug, Clone)]
pub struct SealedFields {
    pub last_name: Ciphertext,
    pub first_name: Ciphertext,
    pub login: Ciphertext,
    pub password: Ciphertext,
}

impl CredentialRecord {
    pub fn new(organization_id: Uuid, category: String, fields: SealedFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            last_name: fields.last_name,
            first_name: fields.first_name,
            category,
            login: fields.login,
            password: fields.password,
            created_at: now,
            updated_at: now,
        }
    }

    /// Расшифровать все поля; при любой ошибке ничего не возвращается
    pub fn reveal(&self, cipher: &CredentialCipher) -> Result<ClearRecord, CryptoError> {
        Ok(ClearRecord {
            id: self.id,
            organization_id: self.organization_id,
            last_name: cipher.decrypt(&self.last_name)?,
            first_name: cipher.decrypt(&self.first_name)?,
            category: self.category.clone(),
            login: cipher.decrypt(&self.login)?,
            password: cipher.decrypt(&self.password)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Расшифрованное представление записи (выдача и экспорт в открытом виде)
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ClearRecord {
    pub id: Uuid,
    #[serde(rename = "entrepriseId")]
    pub organization_id: Uuid,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "typeInfo")]
    pub category: String,
    #[serde(rename = "identifiant")]
    pub login: String,
    #[serde(rename = "motDePasse")]
    pub password: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct NewRecord {
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "typeInfo")]
    pub category: String,
    #[serde(rename = "identifiant")]
    pub login: String,
    #[serde(rename = "motDePasse")]
    pub password: String,
    #[serde(rename = "a2fCode")]
    pub code: String,
}

/// Частичное обновление записи. Пустой пароль означает «не менять».
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RecordUpdate {
    #[serde(rename = "nom")]
    pub last_name: Option<String>,
    #[serde(rename = "prenom")]
    pub first_name: Option<String>,
    #[serde(rename = "typeInfo")]
    pub category: Option<String>,
    #[serde(rename = "identifiant")]
    pub login: Option<String>,
    #[serde(rename = "motDePasse")]
    pub password: Option<String>,
    #[serde(rename = "a2fCode")]
    pub code: String,
}

impl RecordUpdate {
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Зашифровать и применить присутствующие поля
    pub fn apply_to(&self, record: &mut CredentialRecord, cipher: &CredentialCipher) {
        if let Some(v) = &self.last_name {
            record.last_name = cipher.encrypt(v);
        }
        if let Some(v) = &self.first_name {
            record.first_name = cipher.encrypt(v);
        }
        if let Some(v) = &self.category {
            record.category = v.clone();
        }
        if let Some(v) = &self.login {
            record.login = cipher.encrypt(v);
        }
        if let Some(v) = self.new_password() {
            record.password = cipher.encrypt(v);
        }
        record.updated_at = Utc::now();
    }
}
