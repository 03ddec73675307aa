// src/transfer/mod.rs

//! CSV-экспорт и импорт организаций и записей.
//! Проверка кода 2FA здесь не выполняется: её делает конвейер один раз на пакет.

mod organizations;
mod records;

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{AdminCredentialStore, CredentialCipher};
use crate::error::VaultError;
use crate::store::VaultStore;

pub const RECORD_COLUMNS: [&str; 9] = [
    "id",
    "nom",
    "prenom",
    "entrepriseId",
    "typeInfo",
    "identifiant",
    "motDePasse",
    "createdAt",
    "updatedAt",
];

pub const ORGANIZATION_COLUMNS: [&str; 7] =
    ["id", "nom", "adresse", "telephone", "couleur", "createdAt", "updatedAt"];

/// Режим экспорта записей
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    #[default]
    Encrypted,
    Clear,
}

impl ExportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMode::Encrypted => "encrypted",
            ExportMode::Clear => "clear",
        }
    }
}

/// Итог импорта
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl ImportReport {
    pub fn message(&self) -> String {
        format!(
            "Import finished: {} added, {} skipped, {} errors",
            self.added, self.skipped, self.errors
        )
    }
}

pub struct BulkTransferCodec {
    store: Arc<VaultStore>,
    cipher: CredentialCipher,
    hasher: AdminCredentialStore,
}

impl BulkTransferCodec {
    pub fn new(store: Arc<VaultStore>, cipher: CredentialCipher, hasher: AdminCredentialStore) -> Self {
        Self { store, cipher, hasher }
    }
}

pub(crate) fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Поле строки CSV: отсутствие и пустая строка равнозначны
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub(crate) fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new())
}

pub(crate) fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, VaultError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| VaultError::Persistence(format!("CSV write failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| VaultError::Persistence(format!("CSV is not UTF-8: {}", e)))
}

/// Обрезаются только заголовки: значения полей сохраняются как есть
pub(crate) fn csv_reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(input.as_bytes())
}

pub(crate) fn write_row<I, T>(writer: &mut csv::Writer<Vec<u8>>, row: I) -> Result<(), VaultError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    writer
        .write_record(row)
        .map_err(|e| VaultError::Persistence(format!("CSV write failed: {}", e)))
}
