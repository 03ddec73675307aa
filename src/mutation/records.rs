// src/mutation/records.rs

use uuid::Uuid;

use super::MutationPipeline;
use crate::audit_log;
use crate::auth::Session;
use crate::error::{require, require_if_present, VaultError};
use crate::models::{CredentialRecord, NewRecord, RecordUpdate, SealedFields};

impl MutationPipeline {
    pub async fn create_record(
        &self,
        session: Option<&Session>,
        organization_id: Uuid,
        req: NewRecord,
    ) -> Result<CredentialRecord, VaultError> {
        require(&[
            ("nom", req.last_name.as_str()),
            ("prenom", req.first_name.as_str()),
            ("typeInfo", req.category.as_str()),
            ("identifiant", req.login.as_str()),
            ("motDePasse", req.password.as_str()),
            ("a2fCode", req.code.as_str()),
        ])?;

        let actor = self.authorize(session, &req.code).await?;

        if self.store.get_organization(organization_id).await?.is_none() {
            return Err(VaultError::not_found("Organization not found"));
        }

        let fields = SealedFields {
            last_name: self.cipher.encrypt(&req.last_name),
            first_name: self.cipher.encrypt(&req.first_name),
            login: self.cipher.encrypt(&req.login),
            password: self.cipher.encrypt(&req.password),
        };
        let record = CredentialRecord::new(organization_id, req.category, fields);
        self.store.insert_record(&record).await?;

        tracing::info!(record = %record.id, organization = %organization_id, "record created");
        audit_log!(self.events, "record.created", Some(actor.id), Some(record.id),
            "entrepriseId" => organization_id);
        Ok(record)
    }

    /// Отсутствующие поля (и пустой пароль) остаются прежними
    pub async fn update_record(
        &self,
        session: Option<&Session>,
        id: Uuid,
        req: RecordUpdate,
    ) -> Result<CredentialRecord, VaultError> {
        require(&[("a2fCode", req.code.as_str())])?;
        require_if_present(&[
            ("nom", req.last_name.as_ref()),
            ("prenom", req.first_name.as_ref()),
            ("typeInfo", req.category.as_ref()),
            ("identifiant", req.login.as_ref()),
        ])?;

        let actor = self.authorize(session, &req.code).await?;

        let mut record = self
            .store
            .get_record(id)
            .await?
            .ok_or_else(|| VaultError::not_found("Record not found"))?;

        req.apply_to(&mut record, &self.cipher);
        self.store.update_record(&record).await?;

        tracing::info!(record = %id, "record updated");
        audit_log!(self.events, "record.updated", Some(actor.id), Some(id),
            "password_changed" => req.new_password().is_some());
        Ok(record)
    }

    pub async fn delete_record(&self, session: Option<&Session>, id: Uuid, code: &str) -> Result<(), VaultError> {
        require(&[("a2fCode", code)])?;

        let actor = self.authorize(session, code).await?;

        if self.store.get_record(id).await?.is_none() {
            return Err(VaultError::not_found("Record not found"));
        }

        self.store.delete_record(id).await?;

        tracing::info!(record = %id, "record deleted");
        audit_log!(self.events, "record.deleted", Some(actor.id), Some(id));
        Ok(())
    }
}
