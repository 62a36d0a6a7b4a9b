// src/mfa_service.rs

use data_encoding::BASE32_NOPAD;
use rand::RngCore;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{TokenError, TokenIssuer};
use crate::config::MfaConfig;
use crate::models::{is_acceptable_code, MfaRecord, MfaState};
use crate::store::{InMemoryMfaStore, MfaStore, StoreError};

/// Прозрачный PNG 1x1 вместо настоящего QR-кода
pub const PLACEHOLDER_QR_CODE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

const SECRET_BYTES: usize = 20;

/// Ошибки реестра MFA
#[derive(Debug, Error)]
pub enum MfaError {
    #[error("Email is required")]
    MissingIdentity,
    #[error("Invalid verification code")]
    InvalidCode,
    #[error("MFA setup not found")]
    SetupNotFound,
    #[error("MFA not enabled for this user")]
    NotEnabled,
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MfaStatus {
    pub is_enabled: bool,
    pub is_required: bool,
    pub is_verified: bool,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MfaSetup {
    pub qr_code: String,
    pub secret: String,
    pub backup_codes: Vec<String>,
}

/// Демо-реестр MFA поверх подключаемого хранилища
pub struct MfaService {
    store: Arc<dyn MfaStore>,
    tokens: TokenIssuer,
}

impl MfaService {
    pub fn new(store: Arc<dyn MfaStore>, tokens: TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Реестр с хранилищем в памяти и токенами из конфигурации
    pub fn from_config(config: &MfaConfig) -> Result<Self, TokenError> {
        let tokens = TokenIssuer::new(&config.token_secret, &config.issuer, config.token_ttl_secs)?;
        Ok(Self::new(Arc::new(InMemoryMfaStore::new()), tokens))
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn state(&self, identity: &str) -> Result<MfaState, MfaError> {
        let record = self.store.get(identity).await?;
        Ok(MfaState::of(record.as_ref()))
    }

    /// Статус без побочных эффектов
    pub async fn status(&self, identity: &str) -> Result<MfaStatus, MfaError> {
        let enabled = self.state(identity).await? == MfaState::Enabled;
        Ok(MfaStatus {
            is_enabled: enabled,
            is_required: enabled,
            is_verified: false,
        })
    }

    /// Создать (или сбросить) запись в `PendingSetup` с новым секретом
    pub async fn setup(&self, identity: &str) -> Result<MfaSetup, MfaError> {
        let secret = generate_secret();
        self.store
            .set(MfaRecord::pending(identity, secret.clone()))
            .await?;

        info!(identity = %identity, "MFA setup started");

        Ok(MfaSetup {
            qr_code: PLACEHOLDER_QR_CODE.to_string(),
            secret,
            backup_codes: vec![],
        })
    }

    /// `PendingSetup → Enabled`. На уже включённой записи тоже успешно.
    ///
    /// Формат кода проверяется раньше наличия записи.
    pub async fn confirm_setup(&self, identity: &str, code: &str) -> Result<(), MfaError> {
        accept_code(identity, code)?;

        let mut record = self
            .store
            .get(identity)
            .await?
            .ok_or(MfaError::SetupNotFound)?;
        record.enable();
        self.store.set(record).await?;

        info!(identity = %identity, "MFA setup completed");
        Ok(())
    }

    /// Проверка второго фактора; возвращает токен сессии.
    ///
    /// Отсутствующая или не включённая запись — `NotEnabled` при любом коде.
    pub async fn verify(&self, identity: &str, code: &str) -> Result<String, MfaError> {
        self.require_enabled(identity).await?;
        accept_code(identity, code)?;

        let token = self.tokens.issue(identity)?;
        info!(identity = %identity, "MFA verification succeeded");
        Ok(token)
    }

    /// Отключить MFA: запись удаляется
    pub async fn disable(&self, identity: &str, code: &str) -> Result<(), MfaError> {
        self.require_enabled(identity).await?;
        accept_code(identity, code)?;

        self.store.delete(identity).await?;
        info!(identity = %identity, "MFA disabled");
        Ok(())
    }

    async fn require_enabled(&self, identity: &str) -> Result<MfaRecord, MfaError> {
        match self.store.get(identity).await? {
            Some(record) if record.enabled => Ok(record),
            _ => Err(MfaError::NotEnabled),
        }
    }
}

fn accept_code(identity: &str, code: &str) -> Result<(), MfaError> {
    if is_acceptable_code(code) {
        return Ok(());
    }
    warn!(identity = %identity, "rejected MFA code with invalid format");
    Err(MfaError::InvalidCode)
}

/// Base32 без паддинга, 160 бит
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE32_NOPAD.encode(&bytes)
}
