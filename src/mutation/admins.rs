// src/mutation/admins.rs

use chrono::Utc;
use uuid::Uuid;

use super::MutationPipeline;
use crate::audit_log;
use crate::auth::Session;
use crate::crypto::AdminCredentialStore;
use crate::error::{require, require_if_present, VaultError};
use crate::models::{AdminAccount, AdminRole, AdminUpdate, NewAdmin};
use crate::store::VaultStore;

const SUPERADMIN_LOGIN_LOCKED: &str = "The superadmin login identifier cannot be changed";

/// Найти администратора по открытому логину: логины хранятся как хеши,
/// поэтому сверяем с каждым.
pub async fn find_admin_by_login(
    store: &VaultStore,
    hasher: &AdminCredentialStore,
    login: &str,
) -> Result<Option<AdminAccount>, VaultError> {
    let admins = store.list_admins().await?;
    Ok(admins.into_iter().find(|a| hasher.verify(login, &a.login)))
}

impl MutationPipeline {
    /// Первичное создание суперадмина оператором (из CLI).
    /// Сессии ещё нет, поэтому этапы 2 и 3 не выполняются.
    pub async fn provision_superadmin(
        &self,
        last_name: &str,
        first_name: &str,
        login: &str,
        password: &str,
    ) -> Result<AdminAccount, VaultError> {
        require(&[
            ("nom", last_name),
            ("prenom", first_name),
            ("identifiant", login),
            ("motDePasse", password),
        ])?;

        if self.store.find_superadmin().await?.is_some() {
            return Err(VaultError::conflict("A superadmin account already exists"));
        }

        let admin = AdminAccount::new(
            last_name.to_string(),
            first_name.to_string(),
            self.hasher.hash(login)?,
            self.hasher.hash(password)?,
            AdminRole::Superadmin,
        );
        self.store.insert_admin(&admin).await?;

        tracing::info!(admin = %admin.id, "superadmin provisioned");
        audit_log!(self.events, "admin.superadmin_provisioned", None, Some(admin.id));
        Ok(admin)
    }

    pub async fn create_admin(&self, session: Option<&Session>, req: NewAdmin) -> Result<AdminAccount, VaultError> {
        require(&[
            ("nom", req.last_name.as_str()),
            ("prenom", req.first_name.as_str()),
            ("identifiant", req.login.as_str()),
            ("motDePasse", req.password.as_str()),
            ("a2fCode", req.code.as_str()),
        ])?;
        let role = req.role.ok_or_else(|| VaultError::validation("Missing required fields: role"))?;

        let actor = self.authorize(session, &req.code).await?;

        if role == AdminRole::Superadmin && self.store.find_superadmin().await?.is_some() {
            return Err(VaultError::conflict("A superadmin account already exists"));
        }
        if find_admin_by_login(&self.store, &self.hasher, &req.login).await?.is_some() {
            return Err(VaultError::conflict("This identifier already exists"));
        }

        let admin = AdminAccount::new(
            req.last_name,
            req.first_name,
            self.hasher.hash(&req.login)?,
            self.hasher.hash(&req.password)?,
            role,
        );
        self.store.insert_admin(&admin).await?;

        tracing::info!(admin = %admin.id, role = %role, "administrator created");
        audit_log!(self.events, "admin.created", Some(actor.id), Some(admin.id), "role" => role);
        Ok(admin)
    }

    /// Суперадмин: можно менять имя и пароль, но не логин и не роль
    pub async fn update_admin(
        &self,
        session: Option<&Session>,
        id: Uuid,
        req: AdminUpdate,
    ) -> Result<AdminAccount, VaultError> {
        require(&[("a2fCode", req.code.as_str())])?;
        require_if_present(&[("nom", req.last_name.as_ref()), ("prenom", req.first_name.as_ref())])?;
        if req.role == Some(AdminRole::Superadmin) && req.new_login().is_some() {
            return Err(VaultError::validation(SUPERADMIN_LOGIN_LOCKED));
        }

        let actor = self.authorize(session, &req.code).await?;

        let mut admin = self
            .store
            .get_admin(id)
            .await?
            .ok_or_else(|| VaultError::not_found("Administrator not found"))?;

        if admin.is_superadmin() {
            if req.new_login().is_some() {
                return Err(VaultError::validation(SUPERADMIN_LOGIN_LOCKED));
            }
            if req.role == Some(AdminRole::SubAdmin) {
                return Err(VaultError::conflict("The superadmin account cannot be demoted"));
            }
        } else if req.role == Some(AdminRole::Superadmin) {
            return Err(VaultError::conflict("A superadmin account already exists"));
        }

        // Уникальность логина, только если он действительно меняется
        if let Some(login) = req.new_login() {
            if !self.hasher.verify(login, &admin.login) {
                if let Some(other) = find_admin_by_login(&self.store, &self.hasher, login).await? {
                    if other.id != id {
                        return Err(VaultError::conflict("This identifier already exists"));
                    }
                }
            }
        }

        if let Some(login) = req.new_login() {
            admin.login = self.hasher.hash(login)?;
        }
        if let Some(password) = req.new_password() {
            admin.password = self.hasher.hash(password)?;
        }
        if let Some(last_name) = &req.last_name {
            admin.last_name = last_name.clone();
        }
        if let Some(first_name) = &req.first_name {
            admin.first_name = first_name.clone();
        }
        if let Some(role) = req.role {
            admin.role = role;
        }
        admin.updated_at = Utc::now();

        self.store.update_admin(&admin).await?;

        tracing::info!(admin = %id, "administrator updated");
        audit_log!(self.events, "admin.updated", Some(actor.id), Some(id),
            "login_changed" => req.new_login().is_some(),
            "password_changed" => req.new_password().is_some());
        Ok(admin)
    }

    pub async fn delete_admin(&self, session: Option<&Session>, id: Uuid, code: &str) -> Result<(), VaultError> {
        require(&[("a2fCode", code)])?;

        let actor = self.authorize(session, code).await?;

        let admin = self
            .store
            .get_admin(id)
            .await?
            .ok_or_else(|| VaultError::not_found("Administrator not found"))?;

        if admin.is_superadmin() {
            return Err(VaultError::conflict("The superadmin account cannot be deleted"));
        }

        self.store.delete_admin(id).await?;

        tracing::info!(admin = %id, "administrator deleted");
        audit_log!(self.events, "admin.deleted", Some(actor.id), Some(id));
        Ok(())
    }
}
