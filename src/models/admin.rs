// src/models/admin.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::crypto::Digest;

/// Роль администратора
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRole {
    #[serde(rename = "superadmin")]
    Superadmin,
    #[serde(rename = "sous-admin", alias = "sub-admin")]
    SubAdmin,
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminRole::Superadmin => f.write_str("superadmin"),
            AdminRole::SubAdmin => f.write_str("sous-admin"),
        }
    }
}

/// Учётная запись администратора; логин и пароль хранятся только как хеши
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdminAccount {
    pub id: Uuid,
    pub last_name: String,
    pub first_name: String,
    pub login: Digest,
    pub password: Digest,
    pub role: AdminRole,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl AdminAccount {
    pub fn new(last_name: String, first_name: String, login: Digest, password: Digest, role: AdminRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            last_name,
            first_name,
            login,
            password,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == AdminRole::Superadmin
    }
}

/// Представление администратора без хешей
#[derive(Serialize, Debug, Clone)]
pub struct AdminView {
    pub id: Uuid,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    pub role: AdminRole,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<Utc>,
}

impl From<AdminAccount> for AdminView {
    fn from(admin: AdminAccount) -> Self {
        Self {
            id: admin.id,
            last_name: admin.last_name,
            first_name: admin.first_name,
            role: admin.role,
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct NewAdmin {
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "identifiant")]
    pub login: String,
    #[serde(rename = "motDePasse")]
    pub password: String,
    pub role: Option<AdminRole>,
    #[serde(rename = "a2fCode")]
    pub code: String,
}

/// Частичное обновление администратора. Пустые логин и пароль означают «не менять».
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AdminUpdate {
    #[serde(rename = "nom")]
    pub last_name: Option<String>,
    #[serde(rename = "prenom")]
    pub first_name: Option<String>,
    #[serde(rename = "identifiant")]
    pub login: Option<String>,
    #[serde(rename = "motDePasse")]
    pub password: Option<String>,
    pub role: Option<AdminRole>,
    #[serde(rename = "a2fCode")]
    pub code: String,
}

impl AdminUpdate {
    pub fn new_login(&self) -> Option<&str> {
        self.login.as_deref().filter(|v| !v.is_empty())
    }

    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|v| !v.is_empty())
    }
}
