// src/transfer/records.rs

use serde::Deserialize;
use uuid::Uuid;

use super::{csv_reader, csv_writer, finish, non_empty, timestamp, write_row};
use super::{BulkTransferCodec, ExportMode, ImportReport, RECORD_COLUMNS};
use crate::crypto::Ciphertext;
use crate::error::VaultError;
use crate::models::{CredentialRecord, SealedFields};

/// Строка импорта. Колонки id, entrepriseId и даты игнорируются.
#[derive(Deserialize, Debug, Default)]
struct RecordRow {
    nom: Option<String>,
    prenom: Option<String>,
    #[serde(rename = "typeInfo")]
    type_info: Option<String>,
    identifiant: Option<String>,
    #[serde(rename = "motDePasse")]
    mot_de_passe: Option<String>,
}

impl BulkTransferCodec {
    /// Экспорт записей организации.
    /// `clear` требует пароль суперадмина и расшифровывает всё целиком
    /// или не выдаёт ничего.
    pub async fn export_records(
        &self,
        organization_id: Uuid,
        mode: ExportMode,
        superadmin_password: Option<&str>,
    ) -> Result<String, VaultError> {
        if self.store.get_organization(organization_id).await?.is_none() {
            return Err(VaultError::not_found("Organization not found"));
        }

        if mode == ExportMode::Clear {
            let password = superadmin_password
                .filter(|p| !p.is_empty())
                .ok_or_else(|| VaultError::validation("The superadmin password is required for a clear export"))?;
            let superadmin = self
                .store
                .find_superadmin()
                .await?
                .ok_or_else(|| VaultError::not_found("Superadmin not found"))?;
            if !self.hasher.verify(password, &superadmin.password) {
                tracing::warn!(organization = %organization_id, "clear export refused: wrong superadmin password");
                return Err(VaultError::Auth("Incorrect superadmin password".to_string()));
            }
        }

        let records = self.store.list_records(organization_id).await?;

        let mut writer = csv_writer();
        write_row(&mut writer, RECORD_COLUMNS)?;
        for record in &records {
            let row = match mode {
                ExportMode::Encrypted => sealed_row(record),
                ExportMode::Clear => clear_row(record, self)?,
            };
            write_row(&mut writer, &row)?;
        }

        tracing::info!(
            organization = %organization_id,
            mode = mode.as_str(),
            count = records.len(),
            "records exported"
        );
        finish(writer)
    }

    /// Импорт записей в организацию. Ошибка строки только увеличивает
    /// счётчик `errors`; принятые строки пишутся одним пакетом.
    pub async fn import_records(
        &self,
        organization_id: Uuid,
        input: &str,
        already_encrypted: bool,
    ) -> Result<ImportReport, VaultError> {
        if self.store.get_organization(organization_id).await?.is_none() {
            return Err(VaultError::not_found("Organization not found"));
        }

        let mut report = ImportReport::default();
        let mut lines = Vec::new();
        let mut batch = Vec::new();
        let mut reader = csv_reader(input);

        for (line, row) in reader.deserialize::<RecordRow>().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(line = line + 2, error = %e, "unreadable record row");
                    report.errors += 1;
                    continue;
                }
            };

            let Some(record) = self.build_record(organization_id, &row, already_encrypted) else {
                tracing::warn!(line = line + 2, "record row is missing required fields");
                report.errors += 1;
                continue;
            };
            lines.push(line + 2);
            batch.push(record);
        }

        let outcomes = self.store.insert_records(&batch).await?;
        for (line, outcome) in lines.into_iter().zip(outcomes) {
            match outcome {
                Ok(()) => report.added += 1,
                Err(e) => {
                    tracing::warn!(line, error = %e, "record row not stored");
                    report.errors += 1;
                }
            }
        }

        Ok(report)
    }

    fn build_record(&self, organization_id: Uuid, row: &RecordRow, already_encrypted: bool) -> Option<CredentialRecord> {
        let last_name = non_empty(&row.nom)?;
        let first_name = non_empty(&row.prenom)?;
        let category = non_empty(&row.type_info)?;
        let login = non_empty(&row.identifiant)?;
        let password = non_empty(&row.mot_de_passe)?;

        let seal = |value: &str| {
            if already_encrypted {
                Ciphertext::from_stored(value)
            } else {
                self.cipher.encrypt(value)
            }
        };

        let fields = SealedFields {
            last_name: seal(last_name),
            first_name: seal(first_name),
            login: seal(login),
            password: seal(password),
        };
        Some(CredentialRecord::new(organization_id, category.to_string(), fields))
    }
}

fn sealed_row(record: &CredentialRecord) -> Vec<String> {
    vec![
        record.id.to_string(),
        record.last_name.as_str().to_string(),
        record.first_name.as_str().to_string(),
        record.organization_id.to_string(),
        record.category.clone(),
        record.login.as_str().to_string(),
        record.password.as_str().to_string(),
        timestamp(&record.created_at),
        timestamp(&record.updated_at),
    ]
}

fn clear_row(record: &CredentialRecord, codec: &BulkTransferCodec) -> Result<Vec<String>, VaultError> {
    let clear = record.reveal(&codec.cipher)?;
    Ok(vec![
        clear.id.to_string(),
        clear.last_name,
        clear.first_name,
        clear.organization_id.to_string(),
        clear.category,
        clear.login,
        clear.password,
        timestamp(&clear.created_at),
        timestamp(&clear.updated_at),
    ])
}
