// src/mutation/mod.rs

//! Конвейер изменений. Порядок этапов для каждого вызова строго один:
//!
//! 1. проверка полей → `Validation`
//! 2. сессия → `Auth`
//! 3. одноразовый код → `TwoFactor`
//! 4. поиск цели → `NotFound`
//! 5. уникальность и защита суперадмина → `Conflict`
//! 6. шифрование / хеширование
//! 7. одна запись в хранилище
//!
//! Ошибка на любом этапе завершает вызов без побочных эффектов.

mod admins;
mod organizations;
mod records;
mod transfers;

pub use admins::find_admin_by_login;
pub use transfers::ImportRequest;

use std::sync::Arc;

use crate::auth::Session;
use crate::crypto::{AdminCredentialStore, CredentialCipher};
use crate::error::VaultError;
use crate::events::EventHub;
use crate::models::AdminAccount;
use crate::store::VaultStore;
use crate::transfer::BulkTransferCodec;
use crate::two_factor::TwoFactorGate;

pub struct MutationPipeline {
    store: Arc<VaultStore>,
    cipher: CredentialCipher,
    hasher: AdminCredentialStore,
    gate: TwoFactorGate,
    codec: BulkTransferCodec,
    events: Arc<EventHub>,
}

impl MutationPipeline {
    pub fn new(
        store: Arc<VaultStore>,
        cipher: CredentialCipher,
        hasher: AdminCredentialStore,
        gate: TwoFactorGate,
        events: Arc<EventHub>,
    ) -> Self {
        let codec = BulkTransferCodec::new(store.clone(), cipher.clone(), hasher);
        Self {
            store,
            cipher,
            hasher,
            gate,
            codec,
            events,
        }
    }

    pub fn codec(&self) -> &BulkTransferCodec {
        &self.codec
    }

    /// Этапы 2 и 3: сессия, затем одноразовый код
    async fn authorize(&self, session: Option<&Session>, code: &str) -> Result<AdminAccount, VaultError> {
        let actor = authenticate(&self.store, session).await?;

        if !self.gate.check(code).await {
            tracing::warn!(admin = %actor.id, "verification code rejected");
            return Err(VaultError::TwoFactor);
        }

        tracing::debug!(admin = %actor.id, "mutation authorized");
        Ok(actor)
    }
}

/// Сессия есть и указывает на существующего администратора
pub async fn authenticate(store: &VaultStore, session: Option<&Session>) -> Result<AdminAccount, VaultError> {
    let session = session.ok_or_else(VaultError::unauthorized)?;
    store
        .get_admin(session.admin_id)
        .await?
        .ok_or_else(VaultError::unauthorized)
}
