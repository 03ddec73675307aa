// src/store.rs

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{AdminAccount, CredentialRecord, Organization};
use crate::vault_db::{MasterKey, VaultDb, VaultDbError, WriteOp};

/// Ошибки хранилища
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("DB error: {0}")]
    Db(#[from] VaultDbError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    Referenced(String),
}

fn org_key(id: Uuid) -> String {
    format!("org:{}", id)
}

fn org_name_key(name: &str) -> String {
    format!("org_name:{}", name)
}

fn org_records_key(org_id: Uuid) -> String {
    format!("org_records:{}", org_id)
}

fn record_key(id: Uuid) -> String {
    format!("record:{}", id)
}

fn admin_key(id: Uuid) -> String {
    format!("admin:{}", id)
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn load<T: DeserializeOwned>(db: &VaultDb, key: &str) -> Result<Option<T>, StoreError> {
    match db.get(key)? {
        Some(data) => {
            let obj = bincode::deserialize(&data).map_err(|e| StoreError::Serialization(e.to_string()))?;
            Ok(Some(obj))
        }
        None => Ok(None),
    }
}

fn load_all<T: DeserializeOwned>(db: &VaultDb, prefix: &str) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::new();
    for key in db.keys_with_prefix(prefix)? {
        if let Some(obj) = load(db, &key)? {
            out.push(obj);
        }
    }
    Ok(out)
}

/// Итог пакетной вставки: по одному результату на элемент, в том же порядке
pub type BatchOutcome = Vec<Result<(), StoreError>>;

fn name_taken(name: &str) -> StoreError {
    StoreError::AlreadyExists(format!("An organization named {} already exists", name))
}

/// Подготовить вставку организации. Имена, занятые в базе или выше
/// в том же пакете, отклоняются.
fn stage_organization<'a>(
    db: &VaultDb,
    org: &'a Organization,
    taken: &mut HashSet<&'a str>,
    ops: &mut Vec<WriteOp>,
) -> Result<(), StoreError> {
    if taken.contains(org.name.as_str()) || db.get(&org_name_key(&org.name))?.is_some() {
        return Err(name_taken(&org.name));
    }
    let value = encode(org)?;
    let id = encode(&org.id)?;
    ops.push(WriteOp::Put(org_key(org.id), value));
    ops.push(WriteOp::Put(org_name_key(&org.name), id));
    taken.insert(&org.name);
    Ok(())
}

/// Подготовить вставку записи. Индексы организаций копятся в `indexes`
/// и пишутся один раз на пакет.
fn stage_record(
    db: &VaultDb,
    record: &CredentialRecord,
    indexes: &mut HashMap<Uuid, Vec<Uuid>>,
    ops: &mut Vec<WriteOp>,
) -> Result<(), StoreError> {
    if db.get(&org_key(record.organization_id))?.is_none() {
        return Err(StoreError::NotFound("Organization not found".to_string()));
    }
    let value = encode(record)?;
    let ids = match indexes.entry(record.organization_id) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => entry.insert(load(db, &org_records_key(record.organization_id))?.unwrap_or_default()),
    };
    ids.push(record.id);
    ops.push(WriteOp::Put(record_key(record.id), value));
    Ok(())
}

/// Хранилище организаций, записей и администраторов.
///
/// Каждое изменяющее действие, в том числе пакетная вставка: ровно один
/// `VaultDb::apply`. Проверка уникальности имени организации и запись
/// выполняются под одной блокировкой на запись.
pub struct VaultStore {
    db: Arc<RwLock<VaultDb>>,
}

impl VaultStore {
    /// Открыть хранилище с путём к базе и ключом хранения
    pub fn open<P: AsRef<Path>>(path: P, key: &MasterKey) -> Result<Self, StoreError> {
        let db = VaultDb::open(path, key)?;
        Ok(Self::from_db(db))
    }

    pub fn in_memory(key: &MasterKey) -> Self {
        Self::from_db(VaultDb::in_memory(key))
    }

    fn from_db(db: VaultDb) -> Self {
        Self {
            db: Arc::new(RwLock::new(db)),
        }
    }

    // === ORGANIZATION ===

    pub async fn get_organization(&self, id: Uuid) -> Result<Option<Organization>, StoreError> {
        let db = self.db.read().await;
        load(&db, &org_key(id))
    }

    pub async fn find_organization_by_name(&self, name: &str) -> Result<Option<Organization>, StoreError> {
        let db = self.db.read().await;
        let id: Option<Uuid> = load(&db, &org_name_key(name))?;
        match id {
            Some(id) => load(&db, &org_key(id)),
            None => Ok(None),
        }
    }

    /// Все организации, по имени
    pub async fn list_organizations(&self) -> Result<Vec<Organization>, StoreError> {
        let db = self.db.read().await;
        let mut orgs: Vec<Organization> = load_all(&db, "org:")?;
        orgs.sort_by_key(|o| o.name.to_lowercase());
        Ok(orgs)
    }

    pub async fn insert_organization(&self, org: &Organization) -> Result<(), StoreError> {
        let db = self.db.write().await;
        let mut ops = Vec::with_capacity(2);
        stage_organization(&db, org, &mut HashSet::new(), &mut ops)?;
        db.apply(ops)?;
        Ok(())
    }

    /// Вставить пакет организаций одной записью на диск. Отклонённые
    /// элементы не мешают остальным; ошибка сохранения отменяет весь пакет.
    pub async fn insert_organizations(&self, orgs: &[Organization]) -> Result<BatchOutcome, StoreError> {
        let db = self.db.write().await;
        let mut taken = HashSet::new();
        let mut ops = Vec::with_capacity(orgs.len() * 2);
        let outcomes: BatchOutcome = orgs
            .iter()
            .map(|org| stage_organization(&db, org, &mut taken, &mut ops))
            .collect();

        if !ops.is_empty() {
            db.apply(ops)?;
        }
        Ok(outcomes)
    }

    pub async fn update_organization(&self, org: &Organization) -> Result<(), StoreError> {
        let db = self.db.write().await;
        let current: Organization = load(&db, &org_key(org.id))?
            .ok_or_else(|| StoreError::NotFound("Organization not found".to_string()))?;

        let mut ops = vec![WriteOp::Put(org_key(org.id), encode(org)?)];

        if current.name != org.name {
            let owner: Option<Uuid> = load(&db, &org_name_key(&org.name))?;
            if owner.is_some_and(|id| id != org.id) {
                return Err(name_taken(&org.name));
            }
            ops.push(WriteOp::Delete(org_name_key(&current.name)));
            ops.push(WriteOp::Put(org_name_key(&org.name), encode(&org.id)?));
        }

        db.apply(ops)?;
        Ok(())
    }

    /// Удалить организацию. Отказ, пока у неё есть записи (без каскада).
    pub async fn delete_organization(&self, id: Uuid) -> Result<(), StoreError> {
        let db = self.db.write().await;
        let org: Organization = load(&db, &org_key(id))?
            .ok_or_else(|| StoreError::NotFound("Organization not found".to_string()))?;

        let owned: Vec<Uuid> = load(&db, &org_records_key(id))?.unwrap_or_default();
        if !owned.is_empty() {
            return Err(StoreError::Referenced(
                "Cannot delete an organization that still owns records".to_string(),
            ));
        }

        db.apply(vec![
            WriteOp::Delete(org_key(id)),
            WriteOp::Delete(org_name_key(&org.name)),
            WriteOp::Delete(org_records_key(id)),
        ])?;
        Ok(())
    }

    pub async fn count_records(&self, org_id: Uuid) -> Result<usize, StoreError> {
        let db = self.db.read().await;
        let ids: Vec<Uuid> = load(&db, &org_records_key(org_id))?.unwrap_or_default();
        Ok(ids.len())
    }

    // === RECORD ===

    pub async fn get_record(&self, id: Uuid) -> Result<Option<CredentialRecord>, StoreError> {
        let db = self.db.read().await;
        load(&db, &record_key(id))
    }

    /// Записи организации в порядке добавления
    pub async fn list_records(&self, org_id: Uuid) -> Result<Vec<CredentialRecord>, StoreError> {
        let db = self.db.read().await;
        let ids: Vec<Uuid> = load(&db, &org_records_key(org_id))?.unwrap_or_default();
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = load(&db, &record_key(id))? {
                records.push(record);
            }
        }
        Ok(records)
    }

    pub async fn insert_record(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let mut outcomes = self.insert_records(std::slice::from_ref(record)).await?;
        outcomes.pop().unwrap_or(Ok(()))
    }

    /// Вставить пакет записей одной записью на диск, как `insert_organizations`
    pub async fn insert_records(&self, records: &[CredentialRecord]) -> Result<BatchOutcome, StoreError> {
        let db = self.db.write().await;
        let mut indexes = HashMap::new();
        let mut ops = Vec::with_capacity(records.len() + 1);
        let outcomes: BatchOutcome = records
            .iter()
            .map(|record| stage_record(&db, record, &mut indexes, &mut ops))
            .collect();

        for (org_id, ids) in &indexes {
            ops.push(WriteOp::Put(org_records_key(*org_id), encode(ids)?));
        }
        if !ops.is_empty() {
            db.apply(ops)?;
        }
        Ok(outcomes)
    }

    pub async fn update_record(&self, record: &CredentialRecord) -> Result<(), StoreError> {
        let db = self.db.write().await;
        if db.get(&record_key(record.id))?.is_none() {
            return Err(StoreError::NotFound("Record not found".to_string()));
        }
        db.apply(vec![WriteOp::Put(record_key(record.id), encode(record)?)])?;
        Ok(())
    }

    pub async fn delete_record(&self, id: Uuid) -> Result<(), StoreError> {
        let db = self.db.write().await;
        let record: CredentialRecord = load(&db, &record_key(id))?
            .ok_or_else(|| StoreError::NotFound("Record not found".to_string()))?;

        let mut ids: Vec<Uuid> = load(&db, &org_records_key(record.organization_id))?.unwrap_or_default();
        ids.retain(|r| *r != id);

        db.apply(vec![
            WriteOp::Delete(record_key(id)),
            WriteOp::Put(org_records_key(record.organization_id), encode(&ids)?),
        ])?;
        Ok(())
    }

    // === ADMIN ===

    pub async fn get_admin(&self, id: Uuid) -> Result<Option<AdminAccount>, StoreError> {
        let db = self.db.read().await;
        load(&db, &admin_key(id))
    }

    /// Все администраторы, по дате создания
    pub async fn list_admins(&self) -> Result<Vec<AdminAccount>, StoreError> {
        let db = self.db.read().await;
        let mut admins: Vec<AdminAccount> = load_all(&db, "admin:")?;
        admins.sort_by_key(|a| a.created_at);
        Ok(admins)
    }

    pub async fn find_superadmin(&self) -> Result<Option<AdminAccount>, StoreError> {
        Ok(self.list_admins().await?.into_iter().find(|a| a.is_superadmin()))
    }

    pub async fn insert_admin(&self, admin: &AdminAccount) -> Result<(), StoreError> {
        let db = self.db.write().await;
        if admin.is_superadmin() {
            let admins: Vec<AdminAccount> = load_all(&db, "admin:")?;
            if admins.iter().any(|a| a.is_superadmin()) {
                return Err(StoreError::AlreadyExists("A superadmin account already exists".to_string()));
            }
        }
        db.apply(vec![WriteOp::Put(admin_key(admin.id), encode(admin)?)])?;
        Ok(())
    }

    pub async fn update_admin(&self, admin: &AdminAccount) -> Result<(), StoreError> {
        let db = self.db.write().await;
        if db.get(&admin_key(admin.id))?.is_none() {
            return Err(StoreError::NotFound("Administrator not found".to_string()));
        }
        db.apply(vec![WriteOp::Put(admin_key(admin.id), encode(admin)?)])?;
        Ok(())
    }

    /// Удалить администратора. Суперадмин не удаляется никогда.
    pub async fn delete_admin(&self, id: Uuid) -> Result<(), StoreError> {
        let db = self.db.write().await;
        let admin: AdminAccount = load(&db, &admin_key(id))?
            .ok_or_else(|| StoreError::NotFound("Administrator not found".to_string()))?;
        if admin.is_superadmin() {
            return Err(StoreError::Referenced("The superadmin account cannot be deleted".to_string()));
        }
        db.apply(vec![WriteOp::Delete(admin_key(id))])?;
        Ok(())
    }
}
