// src/mutation/transfers.rs

use uuid::Uuid;

use super::MutationPipeline;
use crate::audit_log;
use crate::auth::Session;
use crate::error::{require, VaultError};
use crate::transfer::ImportReport;

/// Пакетный импорт: файл, код подтверждения и признак «уже зашифровано»
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    pub csv: Option<String>,
    pub code: String,
    pub already_encrypted: bool,
}

impl ImportRequest {
    fn file(&self) -> Result<&str, VaultError> {
        self.csv
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| VaultError::validation("No file provided"))
    }
}

impl MutationPipeline {
    /// Код проверяется один раз на весь файл
    pub async fn import_records(
        &self,
        session: Option<&Session>,
        organization_id: Uuid,
        req: ImportRequest,
    ) -> Result<ImportReport, VaultError> {
        let csv = req.file()?;
        require(&[("a2fCode", req.code.as_str())])?;

        let actor = self.authorize(session, &req.code).await?;

        if self.store.get_organization(organization_id).await?.is_none() {
            return Err(VaultError::not_found("Organization not found"));
        }

        let report = self.codec.import_records(organization_id, csv, req.already_encrypted).await?;

        tracing::info!(
            organization = %organization_id,
            added = report.added,
            errors = report.errors,
            "records imported"
        );
        audit_log!(self.events, "records.imported", Some(actor.id), Some(organization_id),
            "added" => report.added,
            "errors" => report.errors,
            "already_encrypted" => req.already_encrypted);
        Ok(report)
    }

    pub async fn import_organizations(
        &self,
        session: Option<&Session>,
        req: ImportRequest,
    ) -> Result<ImportReport, VaultError> {
        let csv = req.file()?;
        require(&[("a2fCode", req.code.as_str())])?;

        let actor = self.authorize(session, &req.code).await?;

        let report = self.codec.import_organizations(csv).await?;

        tracing::info!(
            added = report.added,
            skipped = report.skipped,
            errors = report.errors,
            "organizations imported"
        );
        audit_log!(self.events, "organizations.imported", Some(actor.id), None,
            "added" => report.added,
            "skipped" => report.skipped,
            "errors" => report.errors);
        Ok(report)
    }
}
