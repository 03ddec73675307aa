// tests/integration/common.rs

use std::sync::Arc;

use axum::async_trait;
use chrono::Duration;

use accstorage::auth::{Session, SessionKeys};
use accstorage::crypto::{AdminCredentialStore, CipherConfig, CredentialCipher};
use accstorage::models::{AdminAccount, AdminRole, NewAdmin, NewOrganization, NewRecord, Organization};
use accstorage::store::VaultStore;
use accstorage::two_factor::{CodeVerifier, VerifierError};
use accstorage::VaultService;

/// Единственный код, который принимает тестовый аутентификатор
pub const CODE: &str = "123456";
pub const ROOT_LOGIN: &str = "root";
pub const ROOT_PASSWORD: &str = "root-pass";

pub struct FixedCodeVerifier;

#[async_trait]
impl CodeVerifier for FixedCodeVerifier {
    async fn verify(&self, code: &str) -> Result<bool, VerifierError> {
        Ok(code == CODE)
    }
}

pub struct Fixture {
    pub service: Arc<VaultService>,
    pub store: Arc<VaultStore>,
    pub cipher: CredentialCipher,
    pub root: AdminAccount,
    pub session: Session,
}

pub fn cipher() -> CredentialCipher {
    CredentialCipher::new(CipherConfig::new([0x11; 32], [0x22; 16]))
}

pub async fn fixture() -> Fixture {
    let store = Arc::new(VaultStore::in_memory(&[0x42; 32]));
    let hasher = AdminCredentialStore::new(4).unwrap();
    let sessions = SessionKeys::new(b"integration-secret", Duration::hours(1));
    let service = Arc::new(VaultService::new(
        store.clone(),
        cipher(),
        hasher,
        Arc::new(FixedCodeVerifier),
        sessions,
    ));

    let root = service
        .pipeline()
        .provision_superadmin("Root", "Admin", ROOT_LOGIN, ROOT_PASSWORD)
        .await
        .unwrap();
    let session = Session {
        admin_id: root.id,
        role: AdminRole::Superadmin,
    };

    Fixture {
        service,
        store,
        cipher: cipher(),
        root,
        session,
    }
}

impl Fixture {
    pub async fn organization(&self, name: &str) -> Organization {
        self.service
            .pipeline()
            .create_organization(
                Some(&self.session),
                NewOrganization {
                    name: name.into(),
                    address: "1 rue de la Paix".into(),
                    phone: "0102030405".into(),
                    color: None,
                    code: CODE.into(),
                },
            )
            .await
            .unwrap()
    }

    pub async fn record(&self, org: &Organization, last_name: &str, password: &str) {
        self.service
            .pipeline()
            .create_record(
                Some(&self.session),
                org.id,
                NewRecord {
                    last_name: last_name.into(),
                    first_name: "Jean".into(),
                    category: "wifi".into(),
                    login: format!("{}-login", last_name.to_lowercase()),
                    password: password.into(),
                    code: CODE.into(),
                },
            )
            .await
            .unwrap();
    }

    pub async fn sub_admin(&self, login: &str) -> (AdminAccount, Session) {
        let admin = self
            .service
            .pipeline()
            .create_admin(
                Some(&self.session),
                NewAdmin {
                    last_name: "Sub".into(),
                    first_name: "Admin".into(),
                    login: login.into(),
                    password: "sub-pass".into(),
                    role: Some(AdminRole::SubAdmin),
                    code: CODE.into(),
                },
            )
            .await
            .unwrap();
        let session = Session {
            admin_id: admin.id,
            role: AdminRole::SubAdmin,
        };
        (admin, session)
    }
}
