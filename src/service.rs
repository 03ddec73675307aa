// src/service.rs

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::auth::{Session, SessionKeys};
use crate::config::{AppConfig, ConfigError};
use crate::crypto::{AdminCredentialStore, CredentialCipher};
use crate::error::VaultError;
use crate::events::EventHub;
use crate::models::{AdminAccount, AdminView, ClearRecord, Organization};
use crate::mutation::{authenticate, find_admin_by_login, MutationPipeline};
use crate::store::{StoreError, VaultStore};
use crate::transfer::ExportMode;
use crate::two_factor::{CodeVerifier, TwoFactorGate};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open the vault: {0}")]
    Store(#[from] StoreError),
}

/// Всё состояние приложения: хранилище, шифр, сессии и конвейер изменений
pub struct VaultService {
    store: Arc<VaultStore>,
    cipher: CredentialCipher,
    hasher: AdminCredentialStore,
    pipeline: MutationPipeline,
    sessions: SessionKeys,
    events: Arc<EventHub>,
}

impl VaultService {
    pub fn new(
        store: Arc<VaultStore>,
        cipher: CredentialCipher,
        hasher: AdminCredentialStore,
        verifier: Arc<dyn CodeVerifier>,
        sessions: SessionKeys,
    ) -> Self {
        let events = Arc::new(EventHub::new());
        let pipeline = MutationPipeline::new(
            store.clone(),
            cipher.clone(),
            hasher,
            TwoFactorGate::new(verifier),
            events.clone(),
        );
        Self {
            store,
            cipher,
            hasher,
            pipeline,
            sessions,
            events,
        }
    }

    /// Открыть хранилище и собрать сервис по конфигурации (TOTP-верификатор из `security.two_factor`)
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let verifier: Arc<dyn CodeVerifier> = Arc::new(config.totp_verifier()?);
        Self::from_config_with_verifier(config, verifier)
    }

    pub fn from_config_with_verifier(
        config: &AppConfig,
        verifier: Arc<dyn CodeVerifier>,
    ) -> Result<Self, StartupError> {
        let store = Arc::new(VaultStore::open(&config.db_path, &config.master_key()?)?);
        let cipher = CredentialCipher::new(config.cipher_config()?);
        let hasher = config.credential_store()?;
        let sessions = SessionKeys::from_config(&config.security.jwt)?;

        tracing::info!(db = %config.db_path, "vault opened");
        Ok(Self::new(store, cipher, hasher, verifier, sessions))
    }

    pub fn store(&self) -> &Arc<VaultStore> {
        &self.store
    }

    pub fn pipeline(&self) -> &MutationPipeline {
        &self.pipeline
    }

    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }

    pub fn events(&self) -> &Arc<EventHub> {
        &self.events
    }

    // === LOGIN ===

    /// Проверить логин и пароль, выдать токен
    pub async fn login(&self, login: &str, password: &str) -> Result<(String, AdminAccount), VaultError> {
        let invalid = || VaultError::Auth("Invalid identifier or password".to_string());

        let admin = find_admin_by_login(&self.store, &self.hasher, login)
            .await?
            .ok_or_else(invalid)?;
        if !self.hasher.verify(password, &admin.password) {
            tracing::warn!(admin = %admin.id, "login refused: wrong password");
            return Err(invalid());
        }

        let token = self
            .sessions
            .issue(&admin)
            .map_err(|e| VaultError::Persistence(format!("failed to issue token: {}", e)))?;

        tracing::info!(admin = %admin.id, "administrator logged in");
        Ok((token, admin))
    }

    // === READ ===

    pub async fn list_organizations(&self, session: Option<&Session>) -> Result<Vec<Organization>, VaultError> {
        authenticate(&self.store, session).await?;
        Ok(self.store.list_organizations().await?)
    }

    pub async fn get_organization(&self, session: Option<&Session>, id: Uuid) -> Result<Organization, VaultError> {
        authenticate(&self.store, session).await?;
        self.store
            .get_organization(id)
            .await?
            .ok_or_else(|| VaultError::not_found("Organization not found"))
    }

    /// Записи организации в открытом виде, по фамилии
    pub async fn list_records(
        &self,
        session: Option<&Session>,
        organization_id: Uuid,
    ) -> Result<Vec<ClearRecord>, VaultError> {
        authenticate(&self.store, session).await?;
        if self.store.get_organization(organization_id).await?.is_none() {
            return Err(VaultError::not_found("Organization not found"));
        }

        let mut records = self
            .store
            .list_records(organization_id)
            .await?
            .iter()
            .map(|r| r.reveal(&self.cipher))
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by(|a, b| a.last_name.to_lowercase().cmp(&b.last_name.to_lowercase()));
        Ok(records)
    }

    pub async fn list_admins(&self, session: Option<&Session>) -> Result<Vec<AdminView>, VaultError> {
        authenticate(&self.store, session).await?;
        let admins = self.store.list_admins().await?;
        Ok(admins.into_iter().map(AdminView::from).collect())
    }

    pub async fn get_admin(&self, session: Option<&Session>, id: Uuid) -> Result<AdminView, VaultError> {
        authenticate(&self.store, session).await?;
        self.store
            .get_admin(id)
            .await?
            .map(AdminView::from)
            .ok_or_else(|| VaultError::not_found("Administrator not found"))
    }

    // === EXPORT ===

    /// Экспорт доступен только суперадмину
    pub async fn export_records(
        &self,
        session: Option<&Session>,
        organization_id: Uuid,
        mode: ExportMode,
        superadmin_password: Option<&str>,
    ) -> Result<String, VaultError> {
        self.require_superadmin(session).await?;
        self.pipeline
            .codec()
            .export_records(organization_id, mode, superadmin_password)
            .await
    }

    pub async fn export_organizations(&self, session: Option<&Session>) -> Result<String, VaultError> {
        self.require_superadmin(session).await?;
        self.pipeline.codec().export_organizations().await
    }

    async fn require_superadmin(&self, session: Option<&Session>) -> Result<AdminAccount, VaultError> {
        let admin = authenticate(&self.store, session).await?;
        if !admin.is_superadmin() {
            return Err(VaultError::Forbidden("Only the superadmin can export data".to_string()));
        }
        Ok(admin)
    }
}
