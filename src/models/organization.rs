// src/models/organization.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Цвет значка по умолчанию
pub const DEFAULT_COLOR: &str = "#22c55e";

/// Организация-клиент, владелец записей
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Organization {
    pub id: Uuid,
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "adresse")]
    pub address: String,
    #[serde(rename = "telephone")]
    pub phone: String,
    #[serde(rename = "couleur")]
    pub color: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<Utc>,
}

impl Organization {
    pub fn new(name: String, address: String, phone: String, color: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            address,
            phone,
            color: color
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Запрос на создание организации
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct NewOrganization {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "adresse")]
    pub address: String,
    #[serde(rename = "telephone")]
    pub phone: String,
    #[serde(rename = "couleur")]
    pub color: Option<String>,
    #[serde(rename = "a2fCode")]
    pub code: String,
}

/// Частичное обновление: отсутствующее поле не меняется
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct OrganizationUpdate {
    #[serde(rename = "nom")]
    pub name: Option<String>,
    #[serde(rename = "adresse")]
    pub address: Option<String>,
    #[serde(rename = "telephone")]
    pub phone: Option<String>,
    #[serde(rename = "couleur")]
    pub color: Option<String>,
    #[serde(rename = "a2fCode")]
    pub code: String,
}

impl OrganizationUpdate {
    pub fn apply_to(&self, org: &mut Organization) {
        if let Some(name) = &self.name {
            org.name = name.clone();
        }
        if let Some(address) = &self.address {
            org.address = address.clone();
        }
        if let Some(phone) = &self.phone {
            org.phone = phone.clone();
        }
        if let Some(color) = self.color.as_ref().filter(|c| !c.trim().is_empty()) {
            org.color = color.clone();
        }
        org.updated_at = Utc::now();
    }
}
