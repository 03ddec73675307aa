// src/transfer/organizations.rs

use serde::Deserialize;

use super::{csv_reader, csv_writer, finish, non_empty, timestamp, write_row};
use super::{BulkTransferCodec, ImportReport, ORGANIZATION_COLUMNS};
use crate::error::VaultError;
use crate::models::Organization;
use crate::store::StoreError;

#[derive(Deserialize, Debug, Default)]
struct OrganizationRow {
    nom: Option<String>,
    adresse: Option<String>,
    telephone: Option<String>,
    couleur: Option<String>,
}

impl BulkTransferCodec {
    /// Все организации, по имени. Расшифровка не требуется.
    pub async fn export_organizations(&self) -> Result<String, VaultError> {
        let orgs = self.store.list_organizations().await?;

        let mut writer = csv_writer();
        write_row(&mut writer, ORGANIZATION_COLUMNS)?;
        for org in &orgs {
            write_row(
                &mut writer,
                [
                    org.id.to_string(),
                    org.name.clone(),
                    org.address.clone(),
                    org.phone.clone(),
                    org.color.clone(),
                    timestamp(&org.created_at),
                    timestamp(&org.updated_at),
                ],
            )?;
        }

        tracing::info!(count = orgs.len(), "organizations exported");
        finish(writer)
    }

    /// Импорт организаций. Имя, которое уже есть (в том числе добавленное
    /// выше в этом же файле), пропускается. Новые организации пишутся
    /// одним пакетом.
    pub async fn import_organizations(&self, input: &str) -> Result<ImportReport, VaultError> {
        let mut report = ImportReport::default();
        let mut lines = Vec::new();
        let mut batch = Vec::new();
        let mut reader = csv_reader(input);

        for (line, row) in reader.deserialize::<OrganizationRow>().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(line = line + 2, error = %e, "unreadable organization row");
                    report.errors += 1;
                    continue;
                }
            };

            let (Some(name), Some(address), Some(phone)) =
                (non_empty(&row.nom), non_empty(&row.adresse), non_empty(&row.telephone))
            else {
                tracing::warn!(line = line + 2, "organization row is missing required fields");
                report.errors += 1;
                continue;
            };

            lines.push(line + 2);
            batch.push(Organization::new(
                name.to_string(),
                address.to_string(),
                phone.to_string(),
                row.couleur.clone(),
            ));
        }

        let outcomes = self.store.insert_organizations(&batch).await?;
        for (line, outcome) in lines.into_iter().zip(outcomes) {
            match outcome {
                Ok(()) => report.added += 1,
                Err(StoreError::AlreadyExists(_)) => report.skipped += 1,
                Err(e) => {
                    tracing::warn!(line, error = %e, "organization row not stored");
                    report.errors += 1;
                }
            }
        }

        Ok(report)
    }
}
