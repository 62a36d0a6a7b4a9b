// src/store.rs

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::MfaRecord;

/// Ошибки хранилища MFA
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Хранилище записей MFA по идентификатору пользователя.
///
/// Реестр работает только через этот трейт, поэтому in-memory вариант
/// можно заменить на постоянное хранилище без изменения обработчиков.
#[async_trait]
pub trait MfaStore: Send + Sync {
    async fn get(&self, identity: &str) -> Result<Option<MfaRecord>, StoreError>;

    /// Создать или перезаписать запись (ключ — `record.identity`)
    async fn set(&self, record: MfaRecord) -> Result<(), StoreError>;

    /// Возвращает `true`, если запись существовала
    async fn delete(&self, identity: &str) -> Result<bool, StoreError>;
}

/// Хранилище в памяти процесса
#[derive(Default)]
pub struct InMemoryMfaStore {
    records: RwLock<HashMap<String, MfaRecord>>,
}

impl InMemoryMfaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl MfaStore for InMemoryMfaStore {
    async fn get(&self, identity: &str) -> Result<Option<MfaRecord>, StoreError> {
        Ok(self.records.read().await.get(identity).cloned())
    }

    async fn set(&self, record: MfaRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.identity.clone(), record);
        Ok(())
    }

    async fn delete(&self, identity: &str) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(identity).is_some())
    }
}
