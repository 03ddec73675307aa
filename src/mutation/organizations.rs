// src/mutation/organizations.rs

use uuid::Uuid;

use super::MutationPipeline;
use crate::audit_log;
use crate::auth::Session;
use crate::error::{require, require_if_present, VaultError};
use crate::models::{NewOrganization, Organization, OrganizationUpdate};

impl MutationPipeline {
    pub async fn create_organization(
        &self,
        session: Option<&Session>,
        req: NewOrganization,
    ) -> Result<Organization, VaultError> {
        require(&[
            ("nom", req.name.as_str()),
            ("adresse", req.address.as_str()),
            ("telephone", req.phone.as_str()),
            ("a2fCode", req.code.as_str()),
        ])?;

        let actor = self.authorize(session, &req.code).await?;

        if self.store.find_organization_by_name(&req.name).await?.is_some() {
            return Err(VaultError::conflict("An organization with this name already exists"));
        }

        let org = Organization::new(req.name, req.address, req.phone, req.color);
        self.store.insert_organization(&org).await?;

        tracing::info!(organization = %org.id, "organization created");
        audit_log!(self.events, "organization.created", Some(actor.id), Some(org.id), "nom" => &org.name);
        Ok(org)
    }

    pub async fn update_organization(
        &self,
        session: Option<&Session>,
        id: Uuid,
        req: OrganizationUpdate,
    ) -> Result<Organization, VaultError> {
        require(&[("a2fCode", req.code.as_str())])?;
        require_if_present(&[
            ("nom", req.name.as_ref()),
            ("adresse", req.address.as_ref()),
            ("telephone", req.phone.as_ref()),
        ])?;

        let actor = self.authorize(session, &req.code).await?;

        let mut org = self
            .store
            .get_organization(id)
            .await?
            .ok_or_else(|| VaultError::not_found("Organization not found"))?;

        // Уникальность проверяется, только если имя меняется
        if let Some(name) = req.name.as_ref().filter(|n| **n != org.name) {
            if let Some(other) = self.store.find_organization_by_name(name).await? {
                if other.id != id {
                    return Err(VaultError::conflict("An organization with this name already exists"));
                }
            }
        }

        req.apply_to(&mut org);
        self.store.update_organization(&org).await?;

        tracing::info!(organization = %org.id, "organization updated");
        audit_log!(self.events, "organization.updated", Some(actor.id), Some(org.id));
        Ok(org)
    }

    /// Удаление запрещено, пока у организации есть записи
    pub async fn delete_organization(
        &self,
        session: Option<&Session>,
        id: Uuid,
        code: &str,
    ) -> Result<(), VaultError> {
        require(&[("a2fCode", code)])?;

        let actor = self.authorize(session, code).await?;

        if self.store.get_organization(id).await?.is_none() {
            return Err(VaultError::not_found("Organization not found"));
        }

        if self.store.count_records(id).await? > 0 {
            return Err(VaultError::conflict(
                "Cannot delete the organization because records are linked to it",
            ));
        }

        self.store.delete_organization(id).await?;

        tracing::info!(organization = %id, "organization deleted");
        audit_log!(self.events, "organization.deleted", Some(actor.id), Some(id));
        Ok(())
    }
}
